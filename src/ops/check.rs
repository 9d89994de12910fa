use std::collections::HashSet;

use serde::Serialize;

use crate::model::node::{PRIORITY_MAX, PRIORITY_MIN, parse_timestamp};
use crate::model::tree::Tree;

/// Structured result from `stars check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// Something that breaks a map invariant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    #[serde(rename = "missing_root")]
    MissingRoot,
    #[serde(rename = "multiple_roots")]
    MultipleRoots { ids: Vec<String> },
    #[serde(rename = "root_has_parent")]
    RootHasParent { id: String, parent_id: String },
    /// Following parents from this node comes back around
    #[serde(rename = "parent_cycle")]
    ParentCycle { ids: Vec<String> },
}

/// Tolerated, but worth knowing about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Parent reference points nowhere; the node is hidden from the map
    #[serde(rename = "orphan")]
    Orphan { id: String, parent_id: String },
    #[serde(rename = "priority_out_of_range")]
    PriorityOutOfRange { id: String, priority: i64 },
    #[serde(rename = "category_not_under_root")]
    CategoryNotUnderRoot { id: String },
    #[serde(rename = "bad_timestamp")]
    BadTimestamp {
        id: String,
        field: String,
        value: String,
    },
}

/// Validate a map. Read-only.
pub fn check_map(tree: &Tree) -> CheckResult {
    let mut result = CheckResult::default();

    let roots: Vec<String> = tree.iter().filter(|n| n.is_me).map(|n| n.id.clone()).collect();
    match roots.len() {
        0 => result.errors.push(CheckError::MissingRoot),
        1 => {}
        _ => result.errors.push(CheckError::MultipleRoots { ids: roots.clone() }),
    }

    for node in tree.iter() {
        if node.is_me
            && let Some(parent) = &node.parent_id
        {
            result.errors.push(CheckError::RootHasParent {
                id: node.id.clone(),
                parent_id: parent.clone(),
            });
        }
        if !node.is_me
            && let Some(parent) = &node.parent_id
            && tree.find_node(parent).is_none()
        {
            result.warnings.push(CheckWarning::Orphan {
                id: node.id.clone(),
                parent_id: parent.clone(),
            });
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&node.priority) {
            result.warnings.push(CheckWarning::PriorityOutOfRange {
                id: node.id.clone(),
                priority: node.priority,
            });
        }
        if node.is_category && !tree.parent_of(node).is_some_and(|p| p.is_me) {
            result
                .warnings
                .push(CheckWarning::CategoryNotUnderRoot { id: node.id.clone() });
        }
        for (field, value) in [("createdAt", &node.created_at), ("updatedAt", &node.updated_at)] {
            if parse_timestamp(value).is_none() {
                result.warnings.push(CheckWarning::BadTimestamp {
                    id: node.id.clone(),
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }
    }

    for cycle in find_cycles(tree) {
        result.errors.push(CheckError::ParentCycle { ids: cycle });
    }

    result.valid = result.errors.is_empty();
    result
}

/// Each distinct parent cycle, reported once, members in walk order
fn find_cycles(tree: &Tree) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    let mut settled: HashSet<String> = HashSet::new();

    for start in tree.iter() {
        if settled.contains(&start.id) {
            continue;
        }
        let mut path: Vec<String> = Vec::new();
        let mut cur = Some(start);
        while let Some(node) = cur {
            if settled.contains(&node.id) {
                break;
            }
            if let Some(pos) = path.iter().position(|id| *id == node.id) {
                cycles.push(path[pos..].to_vec());
                break;
            }
            path.push(node.id.clone());
            cur = tree.parent_of(node);
        }
        settled.extend(path);
    }
    cycles
}
