use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::node::Node;

/// All nodes of the map, keyed by ID in storage order.
///
/// Serializes as a plain array of nodes. Parent/child links are ID lookups;
/// nothing in here owns another node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Node>", into = "Vec<Node>")]
pub struct Tree {
    nodes: IndexMap<String, Node>,
}

impl From<Vec<Node>> for Tree {
    fn from(nodes: Vec<Node>) -> Self {
        let mut tree = Tree::default();
        for node in nodes {
            tree.insert(node);
        }
        tree
    }
}

impl From<Tree> for Vec<Node> {
    fn from(tree: Tree) -> Self {
        tree.nodes.into_values().collect()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, appending it in storage order.
    /// A node with an existing ID replaces the old record in place.
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in storage order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|k| k.as_str())
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Position of a node in storage order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, n)| n)
    }

    /// The root ("Me") node, if present
    pub fn root(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.is_me)
    }

    /// All nodes whose parent is `parent_id`, in storage order
    pub fn children_of(&self, parent_id: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_category)
    }

    /// Targets a node may be re-parented under: the root, then every category
    pub fn parent_choices(&self) -> Vec<&Node> {
        self.root().into_iter().chain(self.categories()).collect()
    }

    /// The node's parent, when its parent reference resolves
    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        node.parent_id.as_deref().and_then(|p| self.find_node(p))
    }

    /// A non-root node whose parent reference points nowhere
    pub fn is_orphan(&self, node: &Node) -> bool {
        match node.parent_id.as_deref() {
            Some(p) => !self.nodes.contains_key(p),
            None => !node.is_me,
        }
    }

    /// Title of the category that owns this node.
    ///
    /// Walks parents until a category is found. A category answers with its
    /// own title; a node with no category above it answers "". The walk stops
    /// on a repeated node, so cyclic parent links terminate.
    pub fn root_category_of(&self, node: &Node) -> String {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut cur = node;
        while let Some(parent_id) = cur.parent_id.as_deref() {
            if !visited.insert(cur.id.as_str()) {
                break;
            }
            let Some(parent) = self.find_node(parent_id) else {
                break;
            };
            if parent.is_category {
                return parent.title.clone();
            }
            cur = parent;
        }
        if node.is_category {
            return node.title.clone();
        }
        String::new()
    }

    /// `id` plus every node below it.
    ///
    /// Fixed-point expansion: keep adding nodes whose parent is already in
    /// the set until a pass adds nothing. Terminates on cyclic links.
    pub fn descendant_closure(&self, id: &str) -> HashSet<String> {
        let mut set = HashSet::new();
        if !self.nodes.contains_key(id) {
            return set;
        }
        set.insert(id.to_string());
        let mut changed = true;
        while changed {
            changed = false;
            for node in self.nodes.values() {
                if let Some(parent) = node.parent_id.as_deref()
                    && set.contains(parent)
                    && !set.contains(&node.id)
                {
                    set.insert(node.id.clone());
                    changed = true;
                }
            }
        }
        set
    }

    /// Remove every node whose ID is in `ids`, keeping the order of the rest
    pub fn remove_all(&mut self, ids: &HashSet<String>) {
        self.nodes.retain(|id, _| !ids.contains(id));
    }

    /// Parent chain from the node's parent up to the root (cycle-guarded)
    pub fn ancestors_of(&self, node: &Node) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(node.id.as_str());
        let mut cur = node;
        while let Some(parent) = self.parent_of(cur) {
            if !visited.insert(parent.id.as_str()) {
                break;
            }
            out.push(parent);
            cur = parent;
        }
        out
    }
}
