//! Integration tests for the `stars` CLI.
//!
//! Each test creates a temp data directory, runs `stars -C <dir>` as a
//! subprocess, and verifies stdout and/or file contents.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use pretty_assertions::assert_eq;

const SNAPSHOT: &str = "100stars_v2.json";

/// A small map: root, two categories, four goals (one nested, one done)
fn create_test_map(dir: &Path) {
    fs::write(
        dir.join(SNAPSHOT),
        r#"{
  "nodes": [
    {"id": "s_root", "title": "Me", "notes": "", "priority": 3, "parentId": null,
     "x": 0, "y": 0, "lockedTitle": true, "completed": false, "isMe": true, "isCategory": false,
     "createdAt": "2025-01-01T00:00:00.000Z", "updatedAt": "2025-01-01T00:00:00.000Z"},
    {"id": "health", "title": "Health", "notes": "", "priority": 1, "parentId": "s_root",
     "x": 200, "y": 0, "lockedTitle": true, "completed": false, "isMe": false, "isCategory": true,
     "createdAt": "2025-01-01T00:00:00.000Z", "updatedAt": "2025-01-01T00:00:00.000Z"},
    {"id": "work", "title": "Work", "notes": "", "priority": 1, "parentId": "s_root",
     "x": -200, "y": 0, "lockedTitle": true, "completed": false, "isMe": false, "isCategory": true,
     "createdAt": "2025-01-01T00:00:00.000Z", "updatedAt": "2025-01-01T00:00:00.000Z"},
    {"id": "run", "title": "Run a marathon", "notes": "Spring, ideally", "priority": 5,
     "parentId": "health", "x": 320, "y": 40, "lockedTitle": false, "completed": false,
     "isMe": false, "isCategory": false,
     "createdAt": "2025-02-01T00:00:00.000Z", "updatedAt": "2025-02-01T00:00:00.000Z"},
    {"id": "swim", "title": "Learn to swim", "notes": "", "priority": 2,
     "parentId": "health", "x": 320, "y": -40, "lockedTitle": false, "completed": true,
     "isMe": false, "isCategory": false,
     "createdAt": "2025-03-01T00:00:00.000Z", "updatedAt": "2025-03-01T00:00:00.000Z"},
    {"id": "promo", "title": "Get promoted", "notes": "", "priority": 4,
     "parentId": "work", "x": -320, "y": 0, "lockedTitle": false, "completed": false,
     "isMe": false, "isCategory": false,
     "createdAt": "2025-01-15T00:00:00.000Z", "updatedAt": "2025-01-15T00:00:00.000Z"},
    {"id": "talk", "title": "Give a talk", "notes": "", "priority": 3,
     "parentId": "promo", "x": -440, "y": 60, "lockedTitle": false, "completed": false,
     "isMe": false, "isCategory": false,
     "createdAt": "2025-04-01T00:00:00.000Z", "updatedAt": "2025-04-01T00:00:00.000Z"}
  ],
  "view": {"scale": 1.0, "ox": 100, "oy": 50},
  "updatedAt": "2025-04-01T00:00:00.000Z"
}"#,
    )
    .unwrap();
}

/// Run `stars -C <dir>` with the given args, returning (stdout, stderr, success).
fn run_stars(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_stars"))
        .arg("-C")
        .arg(dir)
        .args(args)
        .env_remove("STARS_DIR")
        .env_remove("STARS_LOG")
        .output()
        .expect("failed to run stars");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `stars` expecting success, return stdout.
fn run_stars_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_stars(dir, args);
    if !success {
        panic!(
            "stars {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `stars` feeding `input` on stdin
fn run_stars_with_input(dir: &Path, args: &[&str], input: &str) -> (String, bool) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_stars"))
        .arg("-C")
        .arg(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run stars");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.success(),
    )
}

fn show_json(dir: &Path, id: &str) -> serde_json::Value {
    serde_json::from_str(&run_stars_ok(dir, &["show", id, "--json"])).unwrap()
}

fn lines(out: &str) -> Vec<&str> {
    out.lines().collect()
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_tree_indents_by_depth() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["tree"]);
    assert_eq!(
        lines(&out),
        vec![
            "★ s_root Me  p3",
            "  ◆ health Health  p1",
            "    ● run Run a marathon  p5",
            "    ✓ swim Learn to swim  p2",
            "  ◆ work Work  p1",
            "    ● promo Get promoted  p4",
            "      ● talk Give a talk  p3",
        ]
    );
}

#[test]
fn test_list_storage_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["list"]);
    assert_eq!(
        lines(&out),
        vec![
            "[ ] run    p5  Health  Run a marathon",
            "[x] swim   p2  Health  Learn to swim",
            "[ ] promo  p4  Work    Get promoted",
            "[ ] talk   p3  Work    Give a talk",
            "4 items  (1 done)",
        ]
    );
}

#[test]
fn test_list_sorted_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["list", "--sort", "priority_desc", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let ids: Vec<&str> = parsed["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["run", "promo", "talk", "swim"]);
    assert_eq!(parsed["total"], 4);
    assert_eq!(parsed["done"], 1);
    assert_eq!(parsed["items"][2]["category"], "Work");
}

#[test]
fn test_list_search_matches_notes_case_insensitively() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["list", "--search", "SPRING"]);
    assert!(out.contains("Run a marathon"));
    assert!(out.contains("1 items  (0 done)"));

    let out = run_stars_ok(tmp.path(), &["list", "--search", "nothing like this"]);
    assert_eq!(out.trim(), "No goals match");
}

#[test]
fn test_list_unknown_sort_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, stderr, success) = run_stars(tmp.path(), &["list", "--sort", "shuffle"]);
    assert!(!success);
    assert!(stderr.contains("unknown sort 'shuffle'"));
}

#[test]
fn test_show_accepts_me_alias() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["show", "me"]);
    assert!(out.starts_with("★ Me\n"));
    assert!(out.contains("  id:        s_root"));
    assert!(out.contains("  kind:      root"));
}

#[test]
fn test_stars_dir_env_selects_data_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_stars"))
        .args(["show", "me"])
        .env("STARS_DIR", tmp.path())
        .env_remove("STARS_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(out.contains("  id:        s_root"));
}

#[test]
fn test_show_unknown_id_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, stderr, success) = run_stars(tmp.path(), &["show", "ghost"]);
    assert!(!success);
    assert!(stderr.contains("node not found: ghost"));
}

#[test]
fn test_first_use_generates_defaults() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_stars_ok(tmp.path(), &["tree", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let categories = parsed["root"]["children"].as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(categories[0]["title"], "Health");
    assert_eq!(categories[7]["title"], "Creativity");
    assert!(tmp.path().join(SNAPSHOT).exists());
}

#[test]
fn test_unreadable_snapshot_falls_back_to_defaults() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join(SNAPSHOT), "{ not json").unwrap();

    let out = run_stars_ok(tmp.path(), &["list"]);
    assert_eq!(out.trim(), "No goals match");
    let saved = fs::read_to_string(tmp.path().join(SNAPSHOT)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(parsed["nodes"].as_array().unwrap().len(), 9);
}

#[test]
fn test_check_valid_map() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["check"]);
    assert_eq!(out.trim(), "✓ map is valid");
}

#[test]
fn test_check_reports_orphan_as_warning() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());
    let path = tmp.path().join(SNAPSHOT);
    let text = fs::read_to_string(&path)
        .unwrap()
        .replace(r#""parentId": "promo""#, r#""parentId": "gone""#);
    fs::write(&path, text).unwrap();

    let out = run_stars_ok(tmp.path(), &["check", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["valid"], true);
    assert_eq!(parsed["warnings"][0]["type"], "orphan");
    assert_eq!(parsed["warnings"][0]["id"], "talk");
}

#[test]
fn test_check_without_map_fails() {
    let tmp = tempfile::TempDir::new().unwrap();

    let (_, stderr, success) = run_stars(tmp.path(), &["check"]);
    assert!(!success);
    assert!(stderr.contains("no readable map"));
}

// ---------------------------------------------------------------------------
// Write command tests
// ---------------------------------------------------------------------------

#[test]
fn test_add_goal_under_category() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(
        tmp.path(),
        &["add", "health", "--title", " Climb ", "--priority", "4", "--notes", "Alps"],
    );
    let id = out.trim();
    assert!(id.starts_with("s_"));

    let node = show_json(tmp.path(), id);
    assert_eq!(node["title"], "Climb");
    assert_eq!(node["priority"], 4);
    assert_eq!(node["notes"], "Alps");
    assert_eq!(node["parentId"], "health");
    assert_eq!(node["category"], "Health");
    assert_eq!(node["isCategory"], false);
    assert_eq!(node["lockedTitle"], false);
}

#[test]
fn test_add_under_root_makes_locked_category() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let id = run_stars_ok(tmp.path(), &["add", "me", "--title", "Travel"]);
    let node = show_json(tmp.path(), id.trim());
    assert_eq!(node["title"], "Travel");
    assert_eq!(node["isCategory"], true);
    assert_eq!(node["lockedTitle"], true);
    assert_eq!(node["priority"], 1);
    assert_eq!(node["kind"], "category");
}

#[test]
fn test_add_to_missing_parent_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, _, success) = run_stars(tmp.path(), &["add", "ghost"]);
    assert!(!success);
}

#[test]
fn test_edit_locked_title_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, stderr, success) = run_stars(
        tmp.path(),
        &["edit", "health", "--title", "Fitness", "--notes", "  body stuff  "],
    );
    assert!(success);
    assert!(stderr.contains("locked"));
    let node = show_json(tmp.path(), "health");
    assert_eq!(node["title"], "Health");
    assert_eq!(node["notes"], "body stuff");
}

#[test]
fn test_edit_blank_title_becomes_untitled() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    run_stars_ok(tmp.path(), &["edit", "run", "--title", "   "]);
    let node = show_json(tmp.path(), "run");
    assert_eq!(node["title"], "Untitled");
    assert_ne!(node["updatedAt"], "2025-02-01T00:00:00.000Z");
}

#[test]
fn test_edit_reparent_rejects_own_subtree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, _, success) = run_stars(tmp.path(), &["edit", "promo", "--parent", "talk"]);
    assert!(!success);
    assert_eq!(show_json(tmp.path(), "promo")["parentId"], "work");

    run_stars_ok(tmp.path(), &["edit", "talk", "--parent", "health"]);
    let node = show_json(tmp.path(), "talk");
    assert_eq!(node["parentId"], "health");
    assert_eq!(node["category"], "Health");
}

#[test]
fn test_priority_is_clamped() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, stderr, success) = run_stars(tmp.path(), &["priority", "talk", "9"]);
    assert!(success);
    assert!(stderr.contains("clamped to 5"));
    assert_eq!(show_json(tmp.path(), "talk")["priority"], 5);

    run_stars_ok(tmp.path(), &["priority", "talk", "-3"]);
    assert_eq!(show_json(tmp.path(), "talk")["priority"], 1);
}

#[test]
fn test_done_and_undone() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    run_stars_ok(tmp.path(), &["done", "run"]);
    assert_eq!(show_json(tmp.path(), "run")["completed"], true);
    run_stars_ok(tmp.path(), &["undone", "run"]);
    assert_eq!(show_json(tmp.path(), "run")["completed"], false);

    let (_, stderr, success) = run_stars(tmp.path(), &["done", "health"]);
    assert!(!success);
    assert!(stderr.contains("only goals can be completed"));
    let (_, _, success) = run_stars(tmp.path(), &["done", "me"]);
    assert!(!success);
}

#[test]
fn test_lock_toggles_but_root_stays_locked() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    run_stars_ok(tmp.path(), &["lock", "run", "on"]);
    assert_eq!(show_json(tmp.path(), "run")["lockedTitle"], true);
    run_stars_ok(tmp.path(), &["lock", "health", "off"]);
    run_stars_ok(tmp.path(), &["edit", "health", "--title", "Fitness"]);
    assert_eq!(show_json(tmp.path(), "health")["title"], "Fitness");

    let (_, _, success) = run_stars(tmp.path(), &["lock", "me", "off"]);
    assert!(!success);
    assert_eq!(show_json(tmp.path(), "me")["lockedTitle"], true);
}

#[test]
fn test_move_accepts_negative_coordinates() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    run_stars_ok(tmp.path(), &["move", "run", "-12.5", "40"]);
    let node = show_json(tmp.path(), "run");
    assert_eq!(node["x"], -12.5);
    assert_eq!(node["y"], 40.0);
}

#[test]
fn test_rm_removes_whole_subtree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["rm", "promo", "--yes"]);
    assert_eq!(out.trim(), "Deleted 2 nodes");
    let tree = run_stars_ok(tmp.path(), &["tree"]);
    assert!(!tree.contains("promo"));
    assert!(!tree.contains("talk"));
    assert!(tree.contains("◆ work Work"));
}

#[test]
fn test_rm_asks_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (out, success) = run_stars_with_input(tmp.path(), &["rm", "work"], "n\n");
    assert!(success);
    assert_eq!(out.trim(), "cancelled");
    assert!(run_stars_ok(tmp.path(), &["tree"]).contains("talk"));

    let (out, success) = run_stars_with_input(tmp.path(), &["rm", "work"], "y\n");
    assert!(success);
    assert_eq!(out.trim(), "Deleted 3 nodes");
}

#[test]
fn test_rm_root_is_refused() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, _, success) = run_stars(tmp.path(), &["rm", "me", "--yes"]);
    assert!(!success);
    assert!(run_stars_ok(tmp.path(), &["tree"]).starts_with("★ s_root Me"));
}

#[test]
fn test_zoom_and_pan() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    assert_eq!(run_stars_ok(tmp.path(), &["zoom"]).trim(), "zoom 100%  offset 100, 50");
    assert_eq!(run_stars_ok(tmp.path(), &["zoom", "3"]).trim(), "zoom 250%  offset 100, 50");
    assert_eq!(run_stars_ok(tmp.path(), &["zoom", "0.05"]).trim(), "zoom 20%  offset 100, 50");
    assert_eq!(
        run_stars_ok(tmp.path(), &["pan", "-10", "5"]).trim(),
        "zoom 20%  offset 90, 55"
    );

    let out = run_stars_ok(tmp.path(), &["zoom", "--json"]);
    let view: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(view["ox"], 90.0);
}

// ---------------------------------------------------------------------------
// Export / init / reset
// ---------------------------------------------------------------------------

#[test]
fn test_export_writes_csv_in_data_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["export"]);
    assert!(out.starts_with("Exported 4 goals to "));
    let csv = fs::read_to_string(tmp.path().join("100stars_list.csv")).unwrap();
    let rows = lines(&csv);
    assert_eq!(rows[0], "title,category,priority,completed,notes,createdAt,updatedAt");
    assert_eq!(
        rows[1],
        "Run a marathon,Health,5,FALSE,\"Spring, ideally\",2025-02-01T00:00:00.000Z,2025-02-01T00:00:00.000Z"
    );
    assert_eq!(
        rows[2],
        "Learn to swim,Health,2,TRUE,,2025-03-01T00:00:00.000Z,2025-03-01T00:00:00.000Z"
    );
    assert_eq!(rows.len(), 5);
    assert!(csv.ends_with('\n'));
}

#[test]
fn test_export_to_stdout() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let out = run_stars_ok(tmp.path(), &["export", "-o", "-"]);
    assert!(out.starts_with("title,category,priority"));
    assert!(out.contains("Give a talk,Work,3,FALSE"));
    assert!(!tmp.path().join("100stars_list.csv").exists());
}

#[test]
fn test_init_writes_config_and_map() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_stars_ok(tmp.path(), &["init", "--category", "Body", "--category", "Mind"]);
    assert!(out.starts_with("Initialized stars in "));
    let config = fs::read_to_string(tmp.path().join("config.toml")).unwrap();
    assert!(config.contains(r#"categories = ["Body", "Mind"]"#));

    let tree = run_stars_ok(tmp.path(), &["tree", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&tree).unwrap();
    let titles: Vec<&str> = parsed["root"]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Body", "Mind"]);
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (_, stderr, success) = run_stars(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("--force"));
    assert!(run_stars_ok(tmp.path(), &["tree"]).contains("run"));

    run_stars_ok(tmp.path(), &["init", "--force", "--yes"]);
    let out = run_stars_ok(tmp.path(), &["list"]);
    assert_eq!(out.trim(), "No goals match");
}

#[test]
fn test_reset_uses_configured_categories() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());
    fs::write(
        tmp.path().join("config.toml"),
        "[map]\ncategories = [\"One\", \"Two\", \"Three\"]\n",
    )
    .unwrap();

    let out = run_stars_ok(tmp.path(), &["reset", "--yes"]);
    assert_eq!(out.trim(), "Reset to 3 categories");
    let tree = run_stars_ok(tmp.path(), &["tree"]);
    assert!(!tree.contains("Run a marathon"));
    assert!(tree.contains("◆"));
    assert!(tree.contains("Three"));
}

#[test]
fn test_reset_cancelled_keeps_map() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_map(tmp.path());

    let (out, success) = run_stars_with_input(tmp.path(), &["reset"], "\n");
    assert!(success);
    assert_eq!(out.trim(), "cancelled");
    assert!(run_stars_ok(tmp.path(), &["list"]).contains("Run a marathon"));
}
