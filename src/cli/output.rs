use serde::Serialize;

use crate::model::node::Node;
use crate::model::tree::Tree;
use crate::ops::list::ListView;
use crate::util::unicode::display_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

/// A node as stored, plus the derived fields a reader usually wants
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeJson<'a> {
    #[serde(flatten)]
    pub node: &'a Node,
    pub kind: &'static str,
    pub category: String,
    pub orphan: bool,
}

#[derive(Serialize)]
pub struct TreeNodeJson {
    pub id: String,
    pub title: String,
    pub kind: &'static str,
    pub priority: i64,
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeJson>,
}

#[derive(Serialize)]
pub struct TreeJson {
    pub root: Option<TreeNodeJson>,
    /// Nodes whose parent is missing; they are not reachable from the root
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<TreeNodeJson>,
}

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub items: Vec<NodeJson<'a>>,
    pub total: usize,
    pub done: usize,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn node_to_json<'a>(tree: &Tree, node: &'a Node) -> NodeJson<'a> {
    NodeJson {
        node,
        kind: node.kind(),
        category: tree.root_category_of(node),
        orphan: tree.is_orphan(node),
    }
}

/// Nested tree from `node` down. The id path guards against cyclic links.
fn subtree_json(tree: &Tree, node: &Node, path: &mut Vec<String>) -> TreeNodeJson {
    path.push(node.id.clone());
    let mut children = Vec::new();
    for child in tree.children_of(&node.id) {
        if !path.contains(&child.id) {
            children.push(subtree_json(tree, child, path));
        }
    }
    path.pop();
    TreeNodeJson {
        id: node.id.clone(),
        title: node.title.clone(),
        kind: node.kind(),
        priority: node.priority_clamped(),
        completed: node.completed,
        children,
    }
}

pub fn tree_to_json(tree: &Tree) -> TreeJson {
    let mut path = Vec::new();
    TreeJson {
        root: tree.root().map(|r| subtree_json(tree, r, &mut path)),
        orphans: tree
            .iter()
            .filter(|n| tree.is_orphan(n))
            .map(|n| subtree_json(tree, n, &mut path))
            .collect(),
    }
}

pub fn list_to_json<'a>(tree: &Tree, view: &ListView<'a>) -> ListJson<'a> {
    ListJson {
        items: view.rows.iter().map(|r| node_to_json(tree, r.node)).collect(),
        total: view.rows.len(),
        done: view.done,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One-line summary: glyph, id, title, priority
pub fn format_node_line(node: &Node) -> String {
    format!(
        "{} {} {}  p{}",
        node.glyph(),
        node.id,
        node.title,
        node.priority_clamped()
    )
}

/// The whole map, children indented under their parents in storage order.
/// Orphaned subtrees follow under a heading.
pub fn format_tree(tree: &Tree) -> Vec<String> {
    let mut lines = Vec::new();
    let mut path = Vec::new();
    if let Some(root) = tree.root() {
        push_tree_lines(tree, root, 0, &mut path, &mut lines);
    }
    let orphans: Vec<&Node> = tree.iter().filter(|n| tree.is_orphan(n)).collect();
    if !orphans.is_empty() {
        lines.push(String::new());
        lines.push("Orphaned (parent missing):".to_string());
        for node in orphans {
            push_tree_lines(tree, node, 1, &mut path, &mut lines);
        }
    }
    lines
}

fn push_tree_lines(
    tree: &Tree,
    node: &Node,
    indent: usize,
    path: &mut Vec<String>,
    lines: &mut Vec<String>,
) {
    lines.push(format!("{}{}", "  ".repeat(indent), format_node_line(node)));
    path.push(node.id.clone());
    for child in tree.children_of(&node.id) {
        if !path.contains(&child.id) {
            push_tree_lines(tree, child, indent + 1, path, lines);
        }
    }
    path.pop();
}

/// Detailed node view
pub fn format_node_detail(tree: &Tree, node: &Node) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", node.glyph(), node.title));
    lines.push(format!("  id:        {}", node.id));
    lines.push(format!("  kind:      {}", node.kind()));
    lines.push(format!(
        "  title:     {}",
        if node.locked_title { "locked" } else { "editable" }
    ));
    lines.push(format!("  priority:  {}", node.priority_clamped()));
    if node.is_completable() {
        lines.push(format!(
            "  status:    {}",
            if node.completed { "completed" } else { "open" }
        ));
    }
    match (node.parent_id.as_deref(), tree.parent_of(node)) {
        (Some(_), Some(parent)) => {
            lines.push(format!("  parent:    {} ({})", parent.title, parent.id))
        }
        (Some(missing), None) => lines.push(format!("  parent:    {} (missing)", missing)),
        (None, _) => {}
    }
    let ancestors = tree.ancestors_of(node);
    if ancestors.len() > 1 {
        let path: Vec<&str> = ancestors.iter().rev().map(|a| a.title.as_str()).collect();
        lines.push(format!("  path:      {}", path.join(" \u{203A} ")));
    }
    if !node.is_me {
        let category = tree.root_category_of(node);
        if !category.is_empty() {
            lines.push(format!("  category:  {}", category));
        }
    }
    lines.push(format!("  position:  {}, {}", node.x, node.y));
    lines.push(format!("  created:   {}", node.created_at));
    lines.push(format!("  updated:   {}", node.updated_at));
    if !node.notes.is_empty() {
        lines.push("  notes:".to_string());
        for note_line in node.notes.lines() {
            lines.push(format!("    {}", note_line));
        }
    }
    lines
}

/// Goal table: status, id, priority, category, title. Ends with the
/// summary line.
pub fn format_list(view: &ListView<'_>) -> Vec<String> {
    if view.rows.is_empty() {
        return vec!["No goals match".to_string()];
    }
    let id_w = view.rows.iter().map(|r| r.node.id.len()).max().unwrap_or(0);
    let cat_w = view
        .rows
        .iter()
        .map(|r| display_width(&r.category))
        .max()
        .unwrap_or(0);
    let mut lines: Vec<String> = view
        .rows
        .iter()
        .map(|r| {
            let mark = if r.node.completed { "x" } else { " " };
            let cat_pad = cat_w - display_width(&r.category);
            format!(
                "[{}] {:<id_w$}  p{}  {}{}  {}",
                mark,
                r.node.id,
                r.node.priority_clamped(),
                r.category,
                " ".repeat(cat_pad),
                r.node.title,
            )
        })
        .collect();
    lines.push(view.summary());
    lines
}
