use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stars::cli::commands::Cli;
use stars::cli::handlers;
use stars::io::store::resolve_data_dir;

/// Log filter comes from `$STARS_LOG`, e.g. `STARS_LOG=stars=debug`
const LOG_ENV: &str = "STARS_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// CLI commands log to stderr
fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// The TUI owns the terminal, so it logs to `<data dir>/stars.log`
fn init_tui_logging(data_dir: &Path) {
    if fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("stars.log"))
    else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn main() {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.dir.as_deref());

    let result = if cli.command.is_none() {
        // No subcommand → launch TUI
        init_tui_logging(&data_dir);
        stars::tui::run(&data_dir)
    } else {
        init_cli_logging();
        handlers::dispatch(cli, &data_dir)
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
