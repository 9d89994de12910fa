use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stars", about = concat!("✦ stars v", env!("CARGO_PKG_VERSION"), " - a map of the things you want to do"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "dir", global = true, env = "STARS_DIR")]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, a config file and the starting map
    Init(InitArgs),
    /// Print the map as an indented tree
    Tree,
    /// Show one node
    Show(ShowArgs),
    /// List goals (everything except the root and categories)
    List(ListArgs),
    /// Write every goal to a CSV file
    Export(ExportArgs),
    /// Validate the stored map
    Check,
    /// Add a child under a node
    Add(AddArgs),
    /// Change a node's title, notes, parent or completion
    Edit(EditArgs),
    /// Set priority (1-5)
    Priority(PriorityArgs),
    /// Lock or unlock a node's title
    Lock(LockArgs),
    /// Mark a goal completed
    Done(IdArg),
    /// Mark a goal not completed
    Undone(IdArg),
    /// Place a node at a world position
    Move(MoveArgs),
    /// Delete a node and everything below it
    Rm(RmArgs),
    /// Show or set the zoom level
    Zoom(ZoomArgs),
    /// Shift the view offset
    Pan(PanArgs),
    /// Throw the map away and start over from the defaults
    Reset(ResetArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Category to create under the root (repeatable; default: the
    /// configured list)
    #[arg(long = "category", action = clap::ArgAction::Append)]
    pub categories: Vec<String>,
    /// Replace an existing map
    #[arg(long)]
    pub force: bool,
    /// Don't ask before replacing
    #[arg(long, short = 'y')]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// Node ID ("me" for the root)
    pub id: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Keep goals whose title or notes contain this text
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// Sort order: priority_desc, priority_asc, created_desc, created_asc,
    /// title_asc, title_desc
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output path (default: 100stars_list.csv in the data directory;
    /// "-" for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Node ID ("me" for the root)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Parent node ID ("me" adds a category)
    pub parent: String,
    /// Title for the new node
    #[arg(long)]
    pub title: Option<String>,
    /// Notes for the new node
    #[arg(long)]
    pub notes: Option<String>,
    /// Priority (1-5)
    #[arg(long)]
    pub priority: Option<i64>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Node ID
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// New parent node ID
    #[arg(long)]
    pub parent: Option<String>,
    /// true or false
    #[arg(long)]
    pub completed: Option<bool>,
}

#[derive(Args)]
pub struct PriorityArgs {
    /// Node ID
    pub id: String,
    /// 1 (lowest) to 5 (highest); out-of-range values are clamped
    #[arg(allow_negative_numbers = true)]
    pub priority: i64,
}

#[derive(Args)]
pub struct LockArgs {
    /// Node ID
    pub id: String,
    /// on or off
    #[arg(value_parser = ["on", "off"])]
    pub state: String,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Node ID
    pub id: String,
    /// World x
    #[arg(allow_negative_numbers = true)]
    pub x: f64,
    /// World y
    #[arg(allow_negative_numbers = true)]
    pub y: f64,
}

#[derive(Args)]
pub struct RmArgs {
    /// Node ID
    pub id: String,
    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args)]
pub struct ZoomArgs {
    /// New scale (clamped to 0.2-2.5); omit to print the current one
    pub scale: Option<f64>,
}

#[derive(Args)]
pub struct PanArgs {
    /// Horizontal shift in screen pixels
    #[arg(allow_negative_numbers = true)]
    pub dx: f64,
    /// Vertical shift in screen pixels
    #[arg(allow_negative_numbers = true)]
    pub dy: f64,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}
