use crate::model::mind_map::MindMap;
use crate::ops::node_ops;

/// Identifies the pointer that owns a gesture
pub type PointerId = u32;

/// The terminal has a single mouse
pub const MOUSE: PointerId = 0;

/// Pointer travel (screen pixels) before a press on a node becomes a drag
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// The one gesture in flight, if any
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    /// Pressed on a node. Until `active`, releasing is a click.
    Node {
        pointer: PointerId,
        id: String,
        start_screen: (f64, f64),
        start_world: (f64, f64),
        node_start: (f64, f64),
        active: bool,
    },
    /// Pressed on empty canvas
    Pan {
        pointer: PointerId,
        start_screen: (f64, f64),
        origin: (f64, f64),
    },
}

/// How a gesture finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEnd {
    /// Nothing was in progress for this pointer
    None,
    /// Press and release without travel: select, don't save
    Select(String),
    /// A node was dragged: save
    Moved(String),
    /// The view was panned: save
    Panned,
}

#[derive(Debug, Clone)]
pub struct GestureState {
    pub current: Gesture,
    pub threshold: f64,
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState {
            current: Gesture::Idle,
            threshold: DRAG_THRESHOLD_PX,
        }
    }
}

impl GestureState {
    pub fn new(threshold: f64) -> Self {
        GestureState {
            current: Gesture::Idle,
            threshold,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current == Gesture::Idle
    }

    /// Start a drag candidate on a node. Ignored if the node is gone or
    /// another gesture is already running.
    pub fn press_node(&mut self, pointer: PointerId, id: &str, screen: (f64, f64), map: &MindMap) {
        if !self.is_idle() {
            return;
        }
        let Some(node) = map.nodes.find_node(id) else {
            return;
        };
        self.current = Gesture::Node {
            pointer,
            id: id.to_string(),
            start_screen: screen,
            start_world: map.view.screen_to_world(screen.0, screen.1),
            node_start: (node.x, node.y),
            active: false,
        };
    }

    /// Start panning from a press on empty canvas
    pub fn press_background(&mut self, pointer: PointerId, screen: (f64, f64), map: &MindMap) {
        if !self.is_idle() {
            return;
        }
        self.current = Gesture::Pan {
            pointer,
            start_screen: screen,
            origin: (map.view.ox, map.view.oy),
        };
    }

    /// Pointer moved. Returns true when the map changed.
    pub fn motion(&mut self, pointer: PointerId, screen: (f64, f64), map: &mut MindMap) -> bool {
        let threshold = self.threshold;
        match &mut self.current {
            Gesture::Idle => false,
            Gesture::Node {
                pointer: owner,
                id,
                start_screen,
                start_world,
                node_start,
                active,
            } => {
                if *owner != pointer {
                    return false;
                }
                if !*active {
                    let dx = screen.0 - start_screen.0;
                    let dy = screen.1 - start_screen.1;
                    if dx.hypot(dy) < threshold {
                        return false;
                    }
                    *active = true;
                }
                let (wx, wy) = map.view.screen_to_world(screen.0, screen.1);
                let x = node_start.0 + (wx - start_world.0);
                let y = node_start.1 + (wy - start_world.1);
                node_ops::move_node(&mut map.nodes, id, x, y).is_ok()
            }
            Gesture::Pan {
                pointer: owner,
                start_screen,
                origin,
            } => {
                if *owner != pointer {
                    return false;
                }
                map.view.pan_from(
                    *origin,
                    (screen.0 - start_screen.0, screen.1 - start_screen.1),
                );
                true
            }
        }
    }

    /// Pointer released (or cancelled). Ends the gesture it owns.
    pub fn release(&mut self, pointer: PointerId) -> GestureEnd {
        let owner = match &self.current {
            Gesture::Idle => return GestureEnd::None,
            Gesture::Node { pointer, .. } | Gesture::Pan { pointer, .. } => *pointer,
        };
        if owner != pointer {
            return GestureEnd::None;
        }
        match std::mem::replace(&mut self.current, Gesture::Idle) {
            Gesture::Node { id, active: false, .. } => GestureEnd::Select(id),
            Gesture::Node { id, active: true, .. } => GestureEnd::Moved(id),
            Gesture::Pan { .. } => GestureEnd::Panned,
            Gesture::Idle => GestureEnd::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::Node;
    use crate::model::tree::Tree;
    use crate::model::view::ViewState;
    use chrono::Utc;

    fn map() -> MindMap {
        let now = Utc::now();
        let mut tree = Tree::new();
        tree.insert(Node::root("me".into(), now));
        tree.insert(Node::category("work".into(), "Work", "me", 100.0, 50.0, now));
        MindMap::new(
            tree,
            ViewState {
                scale: 2.0,
                ox: 400.0,
                oy: 300.0,
            },
        )
    }

    #[test]
    fn click_without_travel_selects() {
        let mut map = map();
        let before = map.clone();
        let mut g = GestureState::default();
        g.press_node(MOUSE, "work", (600.0, 400.0), &map);
        assert!(!g.motion(MOUSE, (601.0, 401.0), &mut map));
        assert_eq!(g.release(MOUSE), GestureEnd::Select("work".into()));
        assert_eq!(map, before);
        assert!(g.is_idle());
    }

    #[test]
    fn drag_past_threshold_moves_in_world_units() {
        let mut map = map();
        let mut g = GestureState::default();
        g.press_node(MOUSE, "work", (600.0, 400.0), &map);
        assert!(g.motion(MOUSE, (620.0, 390.0), &mut map));
        let work = map.nodes.find_node("work").unwrap();
        // 20px right, 10px up at scale 2
        assert_eq!((work.x, work.y), (110.0, 45.0));
        // Once active, small moves still apply
        assert!(g.motion(MOUSE, (621.0, 390.0), &mut map));
        assert_eq!(map.nodes.find_node("work").unwrap().x, 110.5);
        assert_eq!(g.release(MOUSE), GestureEnd::Moved("work".into()));
    }

    #[test]
    fn pan_applies_raw_delta() {
        let mut map = map();
        let mut g = GestureState::default();
        g.press_background(MOUSE, (10.0, 10.0), &map);
        assert!(g.motion(MOUSE, (-90.0, 60.0), &mut map));
        assert_eq!((map.view.ox, map.view.oy), (300.0, 350.0));
        assert!(g.motion(MOUSE, (10.0, 10.0), &mut map));
        assert_eq!((map.view.ox, map.view.oy), (400.0, 300.0));
        assert_eq!(g.release(MOUSE), GestureEnd::Panned);
    }

    #[test]
    fn other_pointers_are_ignored() {
        let mut map = map();
        let mut g = GestureState::default();
        g.press_node(MOUSE, "work", (600.0, 400.0), &map);
        assert!(!g.motion(7, (700.0, 500.0), &mut map));
        assert_eq!(g.release(7), GestureEnd::None);
        // A second press while busy doesn't steal the gesture
        g.press_background(MOUSE, (0.0, 0.0), &map);
        assert!(matches!(g.current, Gesture::Node { .. }));
        assert_eq!(g.release(MOUSE), GestureEnd::Select("work".into()));
    }

    #[test]
    fn press_on_missing_node_is_noop() {
        let map = map();
        let mut g = GestureState::default();
        g.press_node(MOUSE, "ghost", (0.0, 0.0), &map);
        assert!(g.is_idle());
        assert_eq!(g.release(MOUSE), GestureEnd::None);
    }

    #[test]
    fn node_deleted_mid_drag_is_harmless() {
        let mut map = map();
        let mut g = GestureState::default();
        g.press_node(MOUSE, "work", (600.0, 400.0), &map);
        node_ops::delete_subtree(&mut map.nodes, "work").unwrap();
        assert!(!g.motion(MOUSE, (700.0, 400.0), &mut map));
        assert_eq!(g.release(MOUSE), GestureEnd::Moved("work".into()));
    }
}
