use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::Store;
use crate::model::node::Node;
use crate::model::tree::Tree;
use crate::model::view::ViewState;
use crate::model::{Config, MindMap};
use crate::ops::defaults::default_mind_map;
use crate::tui::app::App;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole app at a given terminal size
pub fn render_app(app: &mut App, w: u16, h: u16) -> String {
    render_to_string(w, h, |frame, _| crate::tui::render::render(frame, app))
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

/// Root at the origin, one category, two goals (one completed).
/// View: scale 1, origin at screen (200, 100).
pub fn sample_map() -> MindMap {
    let now = fixed_time();
    let mut tree = Tree::new();
    tree.insert(Node::root("me".into(), now));
    tree.insert(Node::category("work".into(), "Work", "me", 160.0, 0.0, now));

    let mut run = Node::star("run".into(), "Run 5k", "work", 160.0, 32.0, now);
    run.priority = 4;
    run.notes = "Before breakfast".into();
    tree.insert(run);

    let mut read = Node::star("read".into(), "Read Dune", "work", -160.0, 64.0, now);
    read.priority = 2;
    read.completed = true;
    tree.insert(read);

    MindMap::new(
        tree,
        ViewState {
            scale: 1.0,
            ox: 200.0,
            oy: 100.0,
        },
    )
}

/// An App over `map` backed by a fresh temp data directory
pub fn app_with_map(map: MindMap) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let store = Store::open(tmp.path()).unwrap();
    let mut app = App::new(store, Config::default(), map);
    app.rng = StdRng::seed_from_u64(7);
    (tmp, app)
}

/// An App over a generated default map
pub fn app_with_defaults() -> (TempDir, App) {
    let mut rng = StdRng::seed_from_u64(1);
    let map = default_mind_map(&Config::default().map.categories, &mut rng, fixed_time());
    app_with_map(map)
}
