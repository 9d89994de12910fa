use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{CONFIG_FILE, read_config};
use crate::io::lock::StoreLock;
use crate::io::store::Store;
use crate::model::mind_map::MindMap;
use crate::model::node::Node;

use super::{confirm, fresh_map};

const CONFIG_TOML_TEMPLATE: &str = r##"# stars configuration

[map]
# Categories placed around "Me" when a map is generated (init / reset)
categories = [{categories}]

# Zoom change per +/- key, and per mouse wheel notch
# zoom_step = 0.10
# wheel_step = 0.06

# Pixels a press on a node may travel before it becomes a drag
# drag_threshold = 3.0

# --- UI Customization ---
# Uncomment and edit to override defaults.
#
# [ui.colors]
# background = "#070B1E"
# text = "#B8C0E0"
# text_bright = "#FFFFFF"
# highlight = "#FFE066"
# dim = "#6A729A"
# red = "#FF5C6C"
# green = "#7CF2A6"
# selection_bg = "#1F274F"
# edge = "#3A4470"
# category = "#8FB8FF"
# root = "#FFF4C2"
# priority1 = "#FFFFFF"
# priority2 = "#F5F3DC"
# priority3 = "#FFE066"
# priority4 = "#FFCC33"
# priority5 = "#FF9FA3"
"##;

#[derive(Serialize)]
struct InitJson<'a> {
    dir: String,
    root: &'a str,
    categories: Vec<&'a str>,
}

/// Trim names, drop blanks, refuse duplicates (case-insensitive).
fn validate_categories(names: &[String]) -> Result<Vec<String>, String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(format!("duplicate category \"{}\"", name));
        }
        out.push(name.to_string());
    }
    Ok(out)
}

/// Render config.toml with the given categories filled in.
fn render_config_toml(categories: &[String]) -> String {
    let list = categories
        .iter()
        .map(|c| format!("\"{}\"", c.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(", ");
    CONFIG_TOML_TEMPLATE.replace("{categories}", &list)
}

pub fn cmd_init(args: InitArgs, data_dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(data_dir)?;
    let _lock = StoreLock::acquire_default(store.dir())?;

    if store.snapshot_path().exists() {
        if !args.force {
            return Err(format!(
                "a map already exists in {} (use --force to replace it)",
                store.dir().display()
            )
            .into());
        }
        if !args.yes && !confirm("Replace the existing map? This can't be undone.")? {
            println!("cancelled");
            return Ok(());
        }
    }

    let requested = validate_categories(&args.categories)?;

    // Leave a hand-edited config alone
    let config_path = store.dir().join(CONFIG_FILE);
    if !config_path.exists() {
        let mut config = read_config(store.dir())?;
        if !requested.is_empty() {
            config.map.categories = requested.clone();
        }
        fs::write(&config_path, render_config_toml(&config.map.categories))?;
    }

    let mut config = read_config(store.dir())?;
    if !requested.is_empty() {
        config.map.categories = requested;
    }

    let now = Utc::now();
    let mut rng = StdRng::from_entropy();
    let mut map = fresh_map(&config, &mut rng, now);
    store.save(&mut map, now)?;

    print_summary(&map, store.dir(), json)
}

fn print_summary(map: &MindMap, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = map.nodes.root().map(|n| n.id.as_str()).unwrap_or_default();
    let categories: Vec<&Node> = map.nodes.categories().collect();
    if json {
        let out = InitJson {
            dir: dir.display().to_string(),
            root,
            categories: categories.iter().map(|c| c.title.as_str()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("Initialized stars in {}", dir.display());
    for category in categories {
        println!("  category: {} ({})", category.title, category.id);
    }
    Ok(())
}
