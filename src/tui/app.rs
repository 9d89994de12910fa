use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::io::config_io::read_config;
use crate::io::lock::{LockError, StoreLock};
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::{Store, StoreError, atomic_write};
use crate::io::watcher::SnapshotWatcher;
use crate::model::node::Node;
use crate::model::view::DEFAULT_SCALE;
use crate::model::{Config, MindMap};
use crate::ops::defaults::default_mind_map;
use crate::ops::export::{EXPORT_FILE_NAME, export_csv};
use crate::ops::list::{self, SortOrder};
use crate::ops::node_ops::{self, NodeEdit, NodeError};

use super::gesture::GestureState;
use super::input;
use super::render;
use super::theme::Theme;

/// Width of one terminal cell in map pixels
pub const CELL_W: f64 = 8.0;
/// Height of one terminal cell in map pixels
pub const CELL_H: f64 = 16.0;

/// How long a toast stays on the status row
pub const TOAST_DURATION: Duration = Duration::from_millis(1600);

/// Keyboard pan step in pixels
pub const PAN_STEP: (f64, f64) = (5.0 * CELL_W, 2.0 * CELL_H);

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Map,
    List,
}

impl View {
    fn name(self) -> &'static str {
        match self {
            View::Map => "map",
            View::List => "list",
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Editing the selected node's title or notes
    Edit,
    /// Typing a list view search query
    Search,
    Confirm,
    ParentPicker,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Notes,
}

/// In-progress text edit. `cursor` is a byte offset into `buffer`.
#[derive(Debug, Clone)]
pub struct EditState {
    pub node_id: String,
    pub field: EditField,
    pub buffer: String,
    pub cursor: usize,
}

/// A destructive action waiting for y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete a node; `count` includes its descendants
    Delete { id: String, title: String, count: usize },
    /// Throw away the map and regenerate defaults
    Reset,
}

/// Why a change from the UI didn't land
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Refused(#[from] NodeError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub expires: Instant,
}

/// Main application state
pub struct App {
    pub store: Store,
    pub config: Config,
    pub map: MindMap,
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub selected: Option<String>,
    pub gesture: GestureState,
    pub edit: Option<EditState>,
    pub confirm: Option<ConfirmAction>,
    /// Cursor into the parent picker's choices
    pub picker_cursor: usize,
    /// List view search text (applied live)
    pub search: String,
    pub sort: Option<SortOrder>,
    /// Cursor into the filtered, sorted list rows
    pub list_cursor: usize,
    pub list_scroll: usize,
    pub toast: Option<Toast>,
    /// Canvas area from the last draw, for mouse hit testing and centring
    pub map_area: Rect,
    pub rng: StdRng,
}

impl App {
    pub fn new(store: Store, config: Config, map: MindMap) -> Self {
        let theme = Theme::from_config(&config.ui);
        let gesture = GestureState::new(config.map.drag_threshold);
        let selected = map.nodes.root().map(|n| n.id.clone());
        App {
            store,
            config,
            map,
            view: View::Map,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            selected,
            gesture,
            edit: None,
            confirm: None,
            picker_cursor: 0,
            search: String::new(),
            sort: None,
            list_cursor: 0,
            list_scroll: 0,
            toast: None,
            map_area: Rect::default(),
            rng: StdRng::from_entropy(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected
            .as_deref()
            .and_then(|id| self.map.nodes.find_node(id))
    }

    /// Toast text, if one is showing and hasn't expired
    pub fn active_toast(&self) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| Instant::now() < t.expires)
            .map(|t| t.text.as_str())
    }

    /// IDs of the rows the list view shows, in display order
    pub fn list_row_ids(&self) -> Vec<String> {
        list::project(&self.map.nodes, &self.search, self.sort)
            .rows
            .iter()
            .map(|r| r.node.id.clone())
            .collect()
    }

    /// Size of the map canvas in pixels
    pub fn viewport_px(&self) -> (f64, f64) {
        (
            self.map_area.width as f64 * CELL_W,
            self.map_area.height as f64 * CELL_H,
        )
    }

    /// Map pixel at the centre of a terminal cell, relative to the canvas
    pub fn cell_to_px(&self, col: u16, row: u16) -> (f64, f64) {
        let x = col.saturating_sub(self.map_area.x) as f64 * CELL_W + CELL_W / 2.0;
        let y = row.saturating_sub(self.map_area.y) as f64 * CELL_H + CELL_H / 2.0;
        (x, y)
    }

    // -----------------------------------------------------------------------
    // Feedback and persistence
    // -----------------------------------------------------------------------

    pub fn show_toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            expires: Instant::now() + TOAST_DURATION,
        });
    }

    /// Apply a change to the newest snapshot and save it, under the store
    /// lock. A snapshot another process saved since our last load or save is
    /// adopted first so its nodes survive. Lock and save failures become a
    /// toast; refused changes are returned for the caller to report.
    pub fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut MindMap, &mut StdRng) -> Result<T, NodeError>,
    ) -> Result<T, ActionError> {
        let result = self.mutate_locked(change);
        if let Err(e @ (ActionError::Lock(_) | ActionError::Store(_))) = &result {
            warn!(error = %e, "save failed");
            self.show_toast(format!("save failed: {}", e));
        }
        result
    }

    fn mutate_locked<T>(
        &mut self,
        change: impl FnOnce(&mut MindMap, &mut StdRng) -> Result<T, NodeError>,
    ) -> Result<T, ActionError> {
        let _lock = StoreLock::acquire_default(self.store.dir())?;
        self.catch_up();
        let value = change(&mut self.map, &mut self.rng)?;
        self.store.save(&mut self.map, Utc::now())?;
        Ok(value)
    }

    /// Adopt the snapshot on disk when it differs from ours. Returns true
    /// when the map was replaced.
    fn catch_up(&mut self) -> bool {
        let Some(map) = self.store.load() else {
            return false;
        };
        if map == self.map {
            return false;
        }
        info!("snapshot changed on disk, reloading");
        self.map = map;
        if self.selected_node().is_none() {
            self.selected = self.map.nodes.root().map(|n| n.id.clone());
        }
        if let Some(edit) = &self.edit
            && self.map.nodes.find_node(&edit.node_id).is_none()
        {
            self.edit = None;
            self.mode = Mode::Navigate;
            self.show_toast("The node being edited was deleted");
        }
        self.clamp_list_cursor();
        true
    }

    /// Pick up a snapshot written by another process. An edit in progress
    /// keeps its buffer; a gesture in progress defers the reload to its
    /// release.
    pub fn reload_from_disk(&mut self) {
        if !self.gesture.is_idle() {
            return;
        }
        let editing = self.edit.is_some();
        if self.catch_up() && editing == self.edit.is_some() {
            self.show_toast("Reloaded");
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
    }

    /// Step through nodes in storage order, wrapping
    pub fn select_step(&mut self, forward: bool) {
        let len = self.map.nodes.len();
        if len == 0 {
            return;
        }
        let current = self
            .selected
            .as_deref()
            .and_then(|id| self.map.nodes.index_of(id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.selected = self.map.nodes.get_index(next).map(|n| n.id.clone());
    }

    pub fn select_parent(&mut self) {
        let parent = self
            .selected_node()
            .and_then(|n| self.map.nodes.parent_of(n))
            .map(|p| p.id.clone());
        if parent.is_some() {
            self.selected = parent;
        }
    }

    pub fn clamp_list_cursor(&mut self) {
        let count = self.list_row_ids().len();
        self.list_cursor = if count == 0 {
            0
        } else {
            self.list_cursor.min(count - 1)
        };
    }

    // -----------------------------------------------------------------------
    // Node actions
    // -----------------------------------------------------------------------

    /// Add a child under the selection
    pub fn add_child(&mut self) {
        let Some(parent_id) = self.selected.clone() else {
            return;
        };
        let now = Utc::now();
        let Ok(id) =
            self.mutate(|map, rng| node_ops::add_child(&mut map.nodes, &parent_id, rng, now))
        else {
            return;
        };
        let is_category = self
            .map
            .nodes
            .find_node(&id)
            .is_some_and(|n| n.is_category);
        self.selected = Some(id);
        self.show_toast(if is_category {
            "Added category \u{2726}"
        } else {
            "Added \u{2726}"
        });
    }

    /// Ask before deleting the selection. The root is never offered.
    pub fn request_delete(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if node.is_me {
            self.show_toast("The root can't be deleted");
            return;
        }
        let (id, title) = (node.id.clone(), node.title.clone());
        let count = self.map.nodes.descendant_closure(&id).len();
        self.confirm = Some(ConfirmAction::Delete { id, title, count });
        self.mode = Mode::Confirm;
    }

    pub fn request_reset(&mut self) {
        self.confirm = Some(ConfirmAction::Reset);
        self.mode = Mode::Confirm;
    }

    pub fn confirm_pending(&mut self) {
        self.mode = Mode::Navigate;
        match self.confirm.take() {
            Some(ConfirmAction::Delete { id, .. }) => {
                if self
                    .mutate(|map, _| node_ops::delete_subtree(&mut map.nodes, &id))
                    .is_err()
                {
                    return;
                }
                self.selected = self.map.nodes.root().map(|n| n.id.clone());
                self.clamp_list_cursor();
                self.show_toast("Deleted");
            }
            Some(ConfirmAction::Reset) => self.reset_all(),
            None => {}
        }
    }

    pub fn cancel_pending(&mut self) {
        self.confirm = None;
        self.mode = Mode::Navigate;
    }

    /// Replace the map with fresh defaults
    fn reset_all(&mut self) {
        let categories = self.config.map.categories.clone();
        let (w, h) = self.viewport_px();
        let now = Utc::now();
        let reset = self.mutate(|map, rng| {
            *map = default_mind_map(&categories, rng, now);
            map.view.center_on(w, h);
            Ok(())
        });
        if reset.is_err() {
            return;
        }
        self.selected = self.map.nodes.root().map(|n| n.id.clone());
        self.list_cursor = 0;
        self.list_scroll = 0;
        self.show_toast("Reset");
    }

    pub fn set_priority(&mut self, priority: i64) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let _ = self.mutate(|map, _| node_ops::set_priority(&mut map.nodes, &id, priority));
    }

    pub fn toggle_completed(&mut self) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let toggled = self.mutate(|map, _| {
            let completed = !current(map, &id)?.completed;
            node_ops::set_completed(&mut map.nodes, &id, completed)
        });
        if let Err(ActionError::Refused(NodeError::NotCompletable(_))) = toggled {
            self.show_toast("Only goals can be completed");
        }
    }

    pub fn toggle_locked(&mut self) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let toggled = self.mutate(|map, _| {
            let locked = !current(map, &id)?.locked_title;
            node_ops::set_locked(&mut map.nodes, &id, locked).map(|()| locked)
        });
        match toggled {
            Ok(locked) => self.show_toast(if locked { "Title locked" } else { "Title unlocked" }),
            Err(ActionError::Refused(NodeError::RootProtected)) => {
                self.show_toast("The root's title stays locked")
            }
            Err(_) => {}
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self, field: EditField) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if field == EditField::Title && node.locked_title {
            self.show_toast("Title is locked (L to unlock)");
            return;
        }
        let node_id = node.id.clone();
        let buffer = match field {
            EditField::Title => node.title.clone(),
            EditField::Notes => node.notes.clone(),
        };
        self.edit = Some(EditState {
            node_id,
            field,
            cursor: buffer.len(),
            buffer,
        });
        self.mode = Mode::Edit;
    }

    pub fn commit_edit(&mut self) {
        self.mode = Mode::Navigate;
        let Some(edit) = self.edit.take() else {
            return;
        };
        let changes = match edit.field {
            EditField::Title => NodeEdit {
                title: Some(edit.buffer),
                ..Default::default()
            },
            EditField::Notes => NodeEdit {
                notes: Some(edit.buffer),
                ..Default::default()
            },
        };
        let now = Utc::now();
        let saved =
            self.mutate(|map, _| node_ops::save_node(&mut map.nodes, &edit.node_id, changes, now));
        match saved {
            Ok(outcome) if outcome.title_rejected => self.show_toast("Title is locked"),
            Ok(_) => self.show_toast("Saved \u{2713}"),
            Err(ActionError::Refused(e)) => debug!(error = %e, "edit dropped"),
            Err(_) => {}
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
        self.mode = Mode::Navigate;
    }

    // -----------------------------------------------------------------------
    // Re-parenting
    // -----------------------------------------------------------------------

    /// Parents the selected node may move under: the root and categories,
    /// minus the node itself and anything below it
    pub fn parent_picker_choices(&self) -> Vec<&Node> {
        let Some(node) = self.selected_node() else {
            return Vec::new();
        };
        let below = self.map.nodes.descendant_closure(&node.id);
        self.map
            .nodes
            .parent_choices()
            .into_iter()
            .filter(|c| !below.contains(&c.id))
            .collect()
    }

    pub fn open_parent_picker(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if node.is_me {
            self.show_toast("The root has no parent");
            return;
        }
        let current = node.parent_id.clone();
        self.picker_cursor = self
            .parent_picker_choices()
            .iter()
            .position(|c| Some(&c.id) == current.as_ref())
            .unwrap_or(0);
        self.mode = Mode::ParentPicker;
    }

    pub fn commit_reparent(&mut self) {
        self.mode = Mode::Navigate;
        let Some(id) = self.selected.clone() else {
            return;
        };
        let Some(parent) = self
            .parent_picker_choices()
            .get(self.picker_cursor)
            .map(|p| p.id.clone())
        else {
            return;
        };
        let changes = NodeEdit {
            parent_id: Some(parent),
            ..Default::default()
        };
        let now = Utc::now();
        match self.mutate(|map, _| node_ops::save_node(&mut map.nodes, &id, changes, now)) {
            Ok(_) => self.show_toast("Saved \u{2713}"),
            Err(ActionError::Refused(e)) => self.show_toast(e.to_string()),
            Err(_) => {}
        }
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    pub fn zoom_by(&mut self, delta: f64) {
        let _ = self.mutate(|map, _| {
            map.view.zoom_by(delta);
            Ok(())
        });
    }

    pub fn reset_zoom(&mut self) {
        let _ = self.mutate(|map, _| {
            map.view.set_zoom(DEFAULT_SCALE);
            Ok(())
        });
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let _ = self.mutate(|map, _| {
            map.view.pan_by(dx, dy);
            Ok(())
        });
    }

    /// Put the world origin in the middle of the canvas
    pub fn center_view(&mut self) {
        let (w, h) = self.viewport_px();
        let _ = self.mutate(|map, _| {
            map.view.center_on(w, h);
            Ok(())
        });
    }

    /// Save where a drag left a node. The drag only moved our copy, so the
    /// final position is re-applied to the newest snapshot.
    pub fn commit_drag(&mut self, id: &str) {
        let Some((x, y)) = self.map.nodes.find_node(id).map(|n| (n.x, n.y)) else {
            return;
        };
        let _ = self.mutate(|map, _| node_ops::move_node(&mut map.nodes, id, x, y));
    }

    /// Save where a pan left the view
    pub fn commit_pan(&mut self) {
        let (ox, oy) = (self.map.view.ox, self.map.view.oy);
        let _ = self.mutate(|map, _| {
            map.view.ox = ox;
            map.view.oy = oy;
            Ok(())
        });
    }

    // -----------------------------------------------------------------------
    // List view
    // -----------------------------------------------------------------------

    pub fn cycle_sort(&mut self) {
        self.sort = Some(match self.sort {
            None => SortOrder::ALL[0],
            Some(order) => order.next(),
        });
        self.list_cursor = 0;
        self.list_scroll = 0;
    }

    /// Write the unfiltered goal list as CSV next to the snapshot
    pub fn export(&mut self) {
        let path = self.store.dir().join(EXPORT_FILE_NAME);
        let result = export_csv(&self.map.nodes)
            .map_err(|e| e.to_string())
            .and_then(|csv| atomic_write(&path, csv.as_bytes()).map_err(|e| e.to_string()));
        match result {
            Ok(()) => {
                info!(path = %path.display(), "exported csv");
                self.show_toast(format!("Exported {}", path.display()));
            }
            Err(e) => self.show_toast(format!("export failed: {}", e)),
        }
    }
}

fn current<'a>(map: &'a MindMap, id: &str) -> Result<&'a Node, NodeError> {
    map.nodes
        .find_node(id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))
}

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    let Some(ui_state) = read_ui_state(app.store.dir()) else {
        return;
    };
    if ui_state.view == View::List.name() {
        app.view = View::List;
    }
    if let Some(id) = ui_state.selected
        && app.map.nodes.find_node(&id).is_some()
    {
        app.selected = Some(id);
    }
    app.sort = ui_state.sort.and_then(|s| s.parse().ok());
    app.search = ui_state.search;
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    let ui_state = UiState {
        view: app.view.name().to_string(),
        selected: app.selected.clone(),
        sort: app.sort.map(|s| s.name().to_string()),
        search: app.search.clone(),
    };
    if let Err(e) = write_ui_state(app.store.dir(), &ui_state) {
        warn!(error = %e, "could not write ui state");
    }
}

/// Run the TUI application against a data directory
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = read_config(data_dir)?;
    let store = Store::open(data_dir)?;
    let loaded = {
        let _lock = StoreLock::acquire_default(store.dir())?;
        let mut rng = StdRng::from_entropy();
        store.load_or_init(&config, &mut rng, Utc::now())?
    };

    let mut app = App::new(store, config, loaded.map);
    restore_ui_state(&mut app);

    let watcher = match SnapshotWatcher::start(&app.store.snapshot_path()) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watching unavailable");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // A freshly generated map starts centred on the canvas
    if loaded.fresh {
        let size = terminal.size()?;
        app.map_area = render::map_canvas_area(Rect::new(0, 0, size.width, size.height));
        app.center_view();
    }

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&SnapshotWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        if watcher.is_some_and(|w| w.poll()) {
            app.reload_from_disk();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
