use serde::{Deserialize, Serialize};

use super::tree::Tree;
use super::view::ViewState;

/// Everything that persists: the node tree plus the view it was left in.
///
/// This is the snapshot written to disk as one JSON object
/// (`{"nodes": [...], "view": {...}, "updatedAt": "..."}`).
/// `nodes` and `view` are required; a document without either is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub nodes: Tree,
    pub view: ViewState,
    #[serde(default)]
    pub updated_at: String,
}

impl MindMap {
    pub fn new(nodes: Tree, view: ViewState) -> Self {
        MindMap {
            nodes,
            view,
            updated_at: String::new(),
        }
    }
}
