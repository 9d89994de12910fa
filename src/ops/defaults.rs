use std::f64::consts::TAU;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::model::mind_map::MindMap;
use crate::model::node::{Node, make_id, timestamp};
use crate::model::tree::Tree;
use crate::model::view::ViewState;

/// Distance range of seeded categories from the root
pub const CATEGORY_RADIUS: (f64, f64) = (180.0, 320.0);
/// Bound of the extra scatter added to each seeded category
pub const CATEGORY_JITTER: f64 = 70.0;

/// Build the map a first run starts with: "Me" at the origin and one
/// category per name scattered around it (deliberately not evenly spaced).
pub fn default_mind_map<R: Rng + ?Sized>(
    categories: &[String],
    rng: &mut R,
    now: DateTime<Utc>,
) -> MindMap {
    let mut tree = Tree::new();
    let me_id = make_id(rng, now);
    tree.insert(Node::root(me_id.clone(), now));

    for name in categories {
        let id = make_id(rng, now);
        let angle = rng.gen_range(0.0..TAU);
        let radius = rng.gen_range(CATEGORY_RADIUS.0..=CATEGORY_RADIUS.1);
        let jitter = rng.gen_range(-CATEGORY_JITTER..=CATEGORY_JITTER).abs();
        let x = angle.cos() * radius + rng.gen_range(-jitter..=jitter);
        let y = angle.sin() * radius + rng.gen_range(-jitter..=jitter);
        tree.insert(Node::category(id, name, &me_id, x, y, now));
    }

    let mut map = MindMap::new(tree, ViewState::default());
    map.updated_at = timestamp(now);
    map
}
