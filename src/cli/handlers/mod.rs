mod init;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::Rect;
use tracing::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::read_config;
use crate::io::lock::StoreLock;
use crate::io::store::{Store, atomic_write};
use crate::model::config::Config;
use crate::model::mind_map::MindMap;
use crate::model::tree::Tree;
use crate::ops::check::{self, CheckError, CheckWarning};
use crate::ops::defaults::default_mind_map;
use crate::ops::export::{EXPORT_FILE_NAME, export_csv};
use crate::ops::list::{SortOrder, list_items, project};
use crate::ops::node_ops::{self, NodeEdit, NodeError};
use crate::tui::app::{CELL_H, CELL_W};
use crate::tui::render::map_canvas_area;

use init::cmd_init;

/// Alias accepted wherever a node ID is expected
pub const ROOT_ALIAS: &str = "me";

/// Terminal size a map generated outside the TUI is centred for
const NOMINAL_TERMINAL: (u16, u16) = (80, 24);

type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn dispatch(cli: Cli, data_dir: &Path) -> CmdResult {
    let json = cli.json;
    match cli.command {
        Some(Commands::Init(args)) => cmd_init(args, data_dir, json),
        Some(Commands::Tree) => cmd_tree(data_dir, json),
        Some(Commands::Show(args)) => cmd_show(args, data_dir, json),
        Some(Commands::List(args)) => cmd_list(args, data_dir, json),
        Some(Commands::Export(args)) => cmd_export(args, data_dir, json),
        Some(Commands::Check) => cmd_check(data_dir, json),
        Some(Commands::Add(args)) => cmd_add(args, data_dir, json),
        Some(Commands::Edit(args)) => cmd_edit(args, data_dir, json),
        Some(Commands::Priority(args)) => cmd_priority(args, data_dir, json),
        Some(Commands::Lock(args)) => cmd_lock(args, data_dir, json),
        Some(Commands::Done(args)) => cmd_set_completed(args, true, data_dir, json),
        Some(Commands::Undone(args)) => cmd_set_completed(args, false, data_dir, json),
        Some(Commands::Move(args)) => cmd_move(args, data_dir, json),
        Some(Commands::Rm(args)) => cmd_rm(args, data_dir, json),
        Some(Commands::Zoom(args)) => cmd_zoom(args, data_dir, json),
        Some(Commands::Pan(args)) => cmd_pan(args, data_dir, json),
        Some(Commands::Reset(args)) => cmd_reset(args, data_dir, json),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An open store with its map, held under the store lock. Dropping it
/// releases the lock.
struct Session {
    store: Store,
    map: MindMap,
    _lock: StoreLock,
}

impl Session {
    /// Lock the store and load the map, generating defaults on first use
    fn open(data_dir: &Path) -> Result<Session, Box<dyn std::error::Error>> {
        let config = read_config(data_dir)?;
        let store = Store::open(data_dir)?;
        let lock = StoreLock::acquire_default(store.dir())?;
        let map = match store.load() {
            Some(map) => map,
            None => {
                let now = Utc::now();
                let mut map = fresh_map(&config, &mut StdRng::from_entropy(), now);
                store.save(&mut map, now)?;
                map
            }
        };
        Ok(Session {
            store,
            map,
            _lock: lock,
        })
    }

    fn save(&mut self) -> CmdResult {
        self.store.save(&mut self.map, Utc::now())?;
        Ok(())
    }

    fn tree(&self) -> &Tree {
        &self.map.nodes
    }
}

/// The default map, centred for a typical terminal
pub(crate) fn fresh_map<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
    now: DateTime<Utc>,
) -> MindMap {
    let mut map = default_mind_map(&config.map.categories, rng, now);
    let (cols, rows) = NOMINAL_TERMINAL;
    let area = map_canvas_area(Rect::new(0, 0, cols, rows));
    map.view
        .center_on(area.width as f64 * CELL_W, area.height as f64 * CELL_H);
    map
}

/// Resolve a user-supplied ID. `me` names the root unless a node really
/// has that ID.
fn resolve_id(tree: &Tree, raw: &str) -> Result<String, NodeError> {
    if tree.find_node(raw).is_some() {
        return Ok(raw.to_string());
    }
    if raw == ROOT_ALIAS
        && let Some(root) = tree.root()
    {
        return Ok(root.id.clone());
    }
    Err(NodeError::NotFound(raw.to_string()))
}

/// Ask on stderr, read the answer from stdin
pub(crate) fn confirm(prompt: &str) -> std::io::Result<bool> {
    eprint!("{} [y/n] ", prompt);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Print a node as JSON (for --json on write commands)
fn print_node_json(tree: &Tree, id: &str) -> CmdResult {
    if let Some(node) = tree.find_node(id) {
        println!("{}", serde_json::to_string_pretty(&node_to_json(tree, node))?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_tree(data_dir: &Path, json: bool) -> CmdResult {
    let session = Session::open(data_dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tree_to_json(session.tree()))?);
    } else {
        for line in format_tree(session.tree()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, data_dir: &Path, json: bool) -> CmdResult {
    let session = Session::open(data_dir)?;
    let tree = session.tree();
    let id = resolve_id(tree, &args.id)?;
    let node = tree
        .find_node(&id)
        .ok_or_else(|| NodeError::NotFound(id.clone()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&node_to_json(tree, node))?);
    } else {
        for line in format_node_detail(tree, node) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_list(args: ListArgs, data_dir: &Path, json: bool) -> CmdResult {
    let sort = args
        .sort
        .as_deref()
        .map(SortOrder::from_str)
        .transpose()?;
    let session = Session::open(data_dir)?;
    let view = project(session.tree(), args.search.as_deref().unwrap_or(""), sort);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&list_to_json(session.tree(), &view))?
        );
    } else {
        for line in format_list(&view) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_export(args: ExportArgs, data_dir: &Path, json: bool) -> CmdResult {
    let session = Session::open(data_dir)?;
    let csv = export_csv(session.tree())?;
    let count = list_items(session.tree()).len();

    if args.output.as_deref() == Some("-") {
        print!("{}", csv);
        return Ok(());
    }
    let path = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| session.store.dir().join(EXPORT_FILE_NAME));
    atomic_write(&path, csv.as_bytes())?;
    info!(path = %path.display(), count, "exported csv");

    if json {
        let out = serde_json::json!({ "path": path.display().to_string(), "count": count });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Exported {} goals to {}", count, path.display());
    }
    Ok(())
}

fn cmd_check(data_dir: &Path, json: bool) -> CmdResult {
    let store = Store::open(data_dir)?;
    let map = store
        .load()
        .ok_or_else(|| format!("no readable map in {}", store.dir().display()))?;
    let result = check::check_map(&map.nodes);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if !result.errors.is_empty() {
        println!("Errors:");
        for err in &result.errors {
            match err {
                CheckError::MissingRoot => println!("  no root node"),
                CheckError::MultipleRoots { ids } => {
                    println!("  more than one root: {}", ids.join(", "))
                }
                CheckError::RootHasParent { id, parent_id } => {
                    println!("  root {} has a parent: {}", id, parent_id)
                }
                CheckError::ParentCycle { ids } => {
                    println!("  parent cycle: {}", ids.join(" → "))
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            println!();
        }
        println!("Warnings:");
        for warn in &result.warnings {
            match warn {
                CheckWarning::Orphan { id, parent_id } => {
                    println!("  {} has a missing parent: {} (hidden on the map)", id, parent_id)
                }
                CheckWarning::PriorityOutOfRange { id, priority } => {
                    println!("  {} has priority {} (shown clamped to 1-5)", id, priority)
                }
                CheckWarning::CategoryNotUnderRoot { id } => {
                    println!("  category {} is not directly under the root", id)
                }
                CheckWarning::BadTimestamp { id, field, value } => {
                    println!("  {} has an unreadable {}: \"{}\"", id, field, value)
                }
            }
        }
    }
    if result.valid {
        println!("✓ map is valid");
    } else {
        println!("✗ map has errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let parent = resolve_id(session.tree(), &args.parent)?;
    let now = Utc::now();
    let mut rng = StdRng::from_entropy();

    let tree = &mut session.map.nodes;
    let id = node_ops::add_named_child(
        tree,
        &parent,
        args.title.as_deref().unwrap_or(""),
        &mut rng,
        now,
    )?;
    if args.notes.is_some() || args.priority.is_some() {
        let edit = NodeEdit {
            notes: args.notes,
            priority: args.priority,
            ..Default::default()
        };
        node_ops::save_node(tree, &id, edit, now)?;
    }
    session.save()?;

    if json {
        print_node_json(session.tree(), &id)
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn cmd_edit(args: EditArgs, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let id = resolve_id(session.tree(), &args.id)?;
    let parent_id = args
        .parent
        .as_deref()
        .map(|p| resolve_id(session.tree(), p))
        .transpose()?;

    let edit = NodeEdit {
        title: args.title,
        notes: args.notes,
        completed: args.completed,
        parent_id,
        priority: None,
    };
    let outcome = node_ops::save_node(&mut session.map.nodes, &id, edit, Utc::now())?;
    session.save()?;

    if outcome.title_rejected {
        eprintln!("warning: the title of {} is locked; it was not changed", id);
    }
    if outcome.completed_ignored {
        eprintln!("warning: only goals can be completed; {} was left as is", id);
    }
    if json {
        print_node_json(session.tree(), &id)?;
    }
    Ok(())
}

fn cmd_priority(args: PriorityArgs, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let id = resolve_id(session.tree(), &args.id)?;
    let stored = node_ops::set_priority(&mut session.map.nodes, &id, args.priority)?;
    session.save()?;
    if stored != args.priority {
        eprintln!("note: priority clamped to {}", stored);
    }
    if json {
        print_node_json(session.tree(), &id)?;
    }
    Ok(())
}

fn cmd_lock(args: LockArgs, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let id = resolve_id(session.tree(), &args.id)?;
    node_ops::set_locked(&mut session.map.nodes, &id, args.state == "on")?;
    session.save()?;
    if json {
        print_node_json(session.tree(), &id)?;
    }
    Ok(())
}

fn cmd_set_completed(args: IdArg, completed: bool, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let id = resolve_id(session.tree(), &args.id)?;
    node_ops::set_completed(&mut session.map.nodes, &id, completed)?;
    session.save()?;
    if json {
        print_node_json(session.tree(), &id)?;
    }
    Ok(())
}

fn cmd_move(args: MoveArgs, data_dir: &Path, json: bool) -> CmdResult {
    if !args.x.is_finite() || !args.y.is_finite() {
        return Err("coordinates must be finite numbers".into());
    }
    let mut session = Session::open(data_dir)?;
    let id = resolve_id(session.tree(), &args.id)?;
    node_ops::move_node(&mut session.map.nodes, &id, args.x, args.y)?;
    session.save()?;
    if json {
        print_node_json(session.tree(), &id)?;
    }
    Ok(())
}

fn cmd_rm(args: RmArgs, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let id = resolve_id(session.tree(), &args.id)?;
    let node = session
        .tree()
        .find_node(&id)
        .ok_or_else(|| NodeError::NotFound(id.clone()))?;
    if node.is_me {
        return Err(NodeError::RootProtected.into());
    }

    if !args.yes {
        let below = session.tree().descendant_closure(&id).len() - 1;
        let prompt = if below > 0 {
            format!("Delete \u{201C}{}\u{201D} and {} nodes below it?", node.title, below)
        } else {
            format!("Delete \u{201C}{}\u{201D}?", node.title)
        };
        if !confirm(&prompt)? {
            println!("cancelled");
            return Ok(());
        }
    }

    let removed = node_ops::delete_subtree(&mut session.map.nodes, &id)?;
    session.save()?;

    if json {
        let mut ids: Vec<&String> = removed.iter().collect();
        ids.sort();
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "removed": ids }))?);
    } else {
        println!("Deleted {} node{}", removed.len(), if removed.len() == 1 { "" } else { "s" });
    }
    Ok(())
}

fn cmd_zoom(args: ZoomArgs, data_dir: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    if let Some(scale) = args.scale {
        if !scale.is_finite() {
            return Err("zoom must be a finite number".into());
        }
        session.map.view.set_zoom(scale);
        session.save()?;
    }
    print_view(&session.map, json)
}

fn cmd_pan(args: PanArgs, data_dir: &Path, json: bool) -> CmdResult {
    if !args.dx.is_finite() || !args.dy.is_finite() {
        return Err("pan offsets must be finite numbers".into());
    }
    let mut session = Session::open(data_dir)?;
    session.map.view.pan_by(args.dx, args.dy);
    session.save()?;
    print_view(&session.map, json)
}

fn print_view(map: &MindMap, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&map.view)?);
    } else {
        println!(
            "zoom {:.0}%  offset {}, {}",
            map.view.scale * 100.0,
            map.view.ox,
            map.view.oy
        );
    }
    Ok(())
}

fn cmd_reset(args: ResetArgs, data_dir: &Path, json: bool) -> CmdResult {
    let config = read_config(data_dir)?;
    let store = Store::open(data_dir)?;
    let _lock = StoreLock::acquire_default(store.dir())?;

    if !args.yes && !confirm("Reset everything to the starting map? This can't be undone.")? {
        println!("cancelled");
        return Ok(());
    }

    store.clear()?;
    let now = Utc::now();
    let mut map = fresh_map(&config, &mut StdRng::from_entropy(), now);
    store.save(&mut map, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree_to_json(&map.nodes))?);
    } else {
        println!("Reset to {} categories", map.nodes.categories().count());
    }
    Ok(())
}
