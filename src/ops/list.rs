use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::node::Node;
use crate::model::tree::Tree;

/// Orderings offered by the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriorityDesc,
    PriorityAsc,
    CreatedDesc,
    CreatedAsc,
    TitleAsc,
    TitleDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::PriorityDesc,
        SortOrder::PriorityAsc,
        SortOrder::CreatedDesc,
        SortOrder::CreatedAsc,
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortOrder::PriorityDesc => "priority_desc",
            SortOrder::PriorityAsc => "priority_asc",
            SortOrder::CreatedDesc => "created_desc",
            SortOrder::CreatedAsc => "created_asc",
            SortOrder::TitleAsc => "title_asc",
            SortOrder::TitleDesc => "title_desc",
        }
    }

    /// Human label for the status row
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::PriorityDesc => "priority ↓",
            SortOrder::PriorityAsc => "priority ↑",
            SortOrder::CreatedDesc => "newest",
            SortOrder::CreatedAsc => "oldest",
            SortOrder::TitleAsc => "title A-Z",
            SortOrder::TitleDesc => "title Z-A",
        }
    }

    /// The next order in [`SortOrder::ALL`], wrapping
    pub fn next(self) -> SortOrder {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .iter()
            .copied()
            .find(|o| o.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = SortOrder::ALL.iter().map(|o| o.name()).collect();
                format!("unknown sort '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// One table row: the goal plus the category that owns it
#[derive(Debug, Clone)]
pub struct ListRow<'a> {
    pub node: &'a Node,
    pub category: String,
}

/// The filtered, sorted table
#[derive(Debug, Clone)]
pub struct ListView<'a> {
    pub rows: Vec<ListRow<'a>>,
    pub done: usize,
}

impl ListView<'_> {
    /// `N items  (M done)`
    pub fn summary(&self) -> String {
        format!("{} items  ({} done)", self.rows.len(), self.done)
    }
}

/// Every goal: all nodes except the root and categories, storage order
pub fn list_items(tree: &Tree) -> Vec<&Node> {
    tree.iter().filter(|n| !n.is_me && !n.is_category).collect()
}

/// Case-insensitive substring match on `title + " " + notes`.
/// A blank query keeps everything.
pub fn filter_items<'a>(items: Vec<&'a Node>, query: &str) -> Vec<&'a Node> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|n| format!("{} {}", n.title, n.notes).to_lowercase().contains(&q))
        .collect()
}

/// Stable sort. Missing or unparsable creation times sort as earliest.
pub fn sort_items(items: &mut [&Node], order: SortOrder) {
    match order {
        SortOrder::PriorityDesc => {
            items.sort_by(|a, b| b.priority_clamped().cmp(&a.priority_clamped()))
        }
        SortOrder::PriorityAsc => {
            items.sort_by(|a, b| a.priority_clamped().cmp(&b.priority_clamped()))
        }
        SortOrder::CreatedDesc => items.sort_by(|a, b| b.created_time().cmp(&a.created_time())),
        SortOrder::CreatedAsc => items.sort_by(|a, b| a.created_time().cmp(&b.created_time())),
        SortOrder::TitleAsc => items.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOrder::TitleDesc => items.sort_by(|a, b| compare_titles(&b.title, &a.title)),
    }
}

/// Approximate locale collation: case-folded first, then code point order
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Filter, sort and attach categories in one go
pub fn project<'a>(tree: &'a Tree, query: &str, order: Option<SortOrder>) -> ListView<'a> {
    let mut items = filter_items(list_items(tree), query);
    if let Some(order) = order {
        sort_items(&mut items, order);
    }
    let done = items.iter().filter(|n| n.completed).count();
    let rows = items
        .into_iter()
        .map(|node| ListRow {
            node,
            category: tree.root_category_of(node),
        })
        .collect();
    ListView { rows, done }
}
