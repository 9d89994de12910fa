use std::collections::HashSet;
use std::f64::consts::TAU;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use crate::model::node::{Node, UNTITLED, clamp_priority, make_id, timestamp};
use crate::model::tree::Tree;

/// Placement radius range for a new child, around its parent
pub const CHILD_RADIUS: (f64, f64) = (110.0, 190.0);

/// Error type for node operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("the root node cannot be changed that way")]
    RootProtected,
    #[error("only goals can be completed, not the root or a category: {0}")]
    NotCompletable(String),
    #[error("invalid parent for {id}: {reason}")]
    InvalidParent { id: String, reason: String },
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// Add a child under `parent_id` and return its ID.
///
/// Under the root the child is a category (locked title, priority 1);
/// anywhere else it is a plain star (priority 3). It lands at a random angle
/// and radius from the parent.
pub fn add_child<R: Rng + ?Sized>(
    tree: &mut Tree,
    parent_id: &str,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<String, NodeError> {
    let parent = tree
        .find_node(parent_id)
        .ok_or_else(|| NodeError::NotFound(parent_id.to_string()))?;

    let angle = rng.gen_range(0.0..TAU);
    let radius = rng.gen_range(CHILD_RADIUS.0..CHILD_RADIUS.1);
    let x = parent.x + angle.cos() * radius;
    let y = parent.y + angle.sin() * radius;
    let id = make_id(rng, now);

    let child = if parent.is_me {
        Node::category(id.clone(), "New category", &parent.id, x, y, now)
    } else {
        Node::star(id.clone(), "New star", &parent.id, x, y, now)
    };
    debug!(id = %id, parent = %parent_id, category = child.is_category, "add child");
    tree.insert(child);
    Ok(id)
}

/// [`add_child`] with a first title. Naming happens as part of creation,
/// so a new category gets its title before the lock applies. A blank title
/// keeps the placeholder.
pub fn add_named_child<R: Rng + ?Sized>(
    tree: &mut Tree,
    parent_id: &str,
    title: &str,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<String, NodeError> {
    let id = add_child(tree, parent_id, rng, now)?;
    let trimmed = title.trim();
    if !trimmed.is_empty()
        && let Some(node) = tree.find_node_mut(&id)
    {
        node.title = trimmed.to_string();
    }
    Ok(id)
}

/// Delete a node and its whole subtree. Returns the removed IDs.
///
/// The closure is computed before anything is removed. The root is refused.
pub fn delete_subtree(tree: &mut Tree, id: &str) -> Result<HashSet<String>, NodeError> {
    let node = tree
        .find_node(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    if node.is_me {
        return Err(NodeError::RootProtected);
    }
    let doomed = tree.descendant_closure(id);
    tree.remove_all(&doomed);
    debug!(id = %id, removed = doomed.len(), "delete subtree");
    Ok(doomed)
}

// ---------------------------------------------------------------------------
// Save (the edit form)
// ---------------------------------------------------------------------------

/// Field changes submitted together. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct NodeEdit {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
    pub parent_id: Option<String>,
    pub priority: Option<i64>,
}

/// What a save actually did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// A title was submitted but the node's title is locked
    pub title_rejected: bool,
    /// A completed flag was submitted for the root or a category
    pub completed_ignored: bool,
}

/// Apply an edit and refresh `updatedAt`.
///
/// A locked title keeps its stored value. Otherwise the trimmed title
/// replaces it, falling back to "Untitled" when blank. Notes are trimmed.
/// A parent change is validated before anything is written.
pub fn save_node(
    tree: &mut Tree,
    id: &str,
    edit: NodeEdit,
    now: DateTime<Utc>,
) -> Result<SaveOutcome, NodeError> {
    if let Some(new_parent) = edit.parent_id.as_deref() {
        check_reparent(tree, id, new_parent)?;
    }

    let node = tree
        .find_node_mut(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    let mut outcome = SaveOutcome::default();

    if let Some(title) = edit.title {
        if node.locked_title {
            outcome.title_rejected = title.trim() != node.title;
        } else {
            let trimmed = title.trim();
            node.title = if trimmed.is_empty() {
                UNTITLED.to_string()
            } else {
                trimmed.to_string()
            };
        }
    }
    if let Some(notes) = edit.notes {
        node.notes = notes.trim().to_string();
    }
    if let Some(completed) = edit.completed {
        if node.is_completable() {
            node.completed = completed;
        } else {
            outcome.completed_ignored = completed;
        }
    }
    if let Some(parent) = edit.parent_id {
        node.parent_id = Some(parent);
    }
    if let Some(p) = edit.priority {
        node.priority = clamp_priority(p);
    }
    node.updated_at = timestamp(now);
    debug!(id = %id, ?outcome, "save node");
    Ok(outcome)
}

/// A new parent must exist, must not be the node or below it, and the root
/// never gets a parent.
fn check_reparent(tree: &Tree, id: &str, new_parent: &str) -> Result<(), NodeError> {
    let node = tree
        .find_node(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    if node.is_me {
        return Err(NodeError::RootProtected);
    }
    if tree.find_node(new_parent).is_none() {
        return Err(NodeError::InvalidParent {
            id: id.to_string(),
            reason: format!("no node {}", new_parent),
        });
    }
    if tree.descendant_closure(id).contains(new_parent) {
        return Err(NodeError::InvalidParent {
            id: id.to_string(),
            reason: "a node cannot move under itself or its own subtree".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

/// Set priority, clamped to 1..=5. Returns the stored value.
pub fn set_priority(tree: &mut Tree, id: &str, priority: i64) -> Result<i64, NodeError> {
    let node = tree
        .find_node_mut(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    node.priority = clamp_priority(priority);
    Ok(node.priority)
}

/// Lock or unlock a title. The root's title stays locked.
pub fn set_locked(tree: &mut Tree, id: &str, locked: bool) -> Result<(), NodeError> {
    let node = tree
        .find_node_mut(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    if node.is_me && !locked {
        return Err(NodeError::RootProtected);
    }
    node.locked_title = locked;
    Ok(())
}

/// Mark a goal completed or not. The root and categories refuse.
pub fn set_completed(tree: &mut Tree, id: &str, completed: bool) -> Result<(), NodeError> {
    let node = tree
        .find_node_mut(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    if !node.is_completable() {
        return Err(NodeError::NotCompletable(id.to_string()));
    }
    node.completed = completed;
    Ok(())
}

/// Place a node at a world position
pub fn move_node(tree: &mut Tree, id: &str, x: f64, y: f64) -> Result<(), NodeError> {
    let node = tree
        .find_node_mut(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;
    node.x = x;
    node.y = y;
    Ok(())
}
