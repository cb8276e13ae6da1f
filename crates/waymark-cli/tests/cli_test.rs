//! Integration tests for the `waymark` binary.
//!
//! Each test runs the built binary with its state file and config
//! directory inside a fresh temp dir, offline, with provider keys cleared.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

use waymark_store::{StateStore, View};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

const CLEARED_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "MISTRAL_API_KEY",
    "WAYMARK_SERVER_URL",
    "WAYMARK_TIMEOUT_SECS",
    "PORT",
    "ALLOWED_ORIGINS",
    "WAYMARK_ENV",
    "RUST_LOG",
];

fn waymark(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_waymark"));
    cmd.args(args)
        .env("WAYMARK_STATE_PATH", dir.join("state.json"))
        .env("XDG_CONFIG_HOME", dir.join("config"));
    for var in CLEARED_VARS {
        cmd.env_remove(var);
    }
    cmd.output().expect("failed to run waymark binary")
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = waymark(dir, args);
    assert!(
        output.status.success(),
        "waymark {args:?} failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn store(dir: &Path) -> StateStore {
    StateStore::new(dir.join("state.json"))
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[test]
fn offline_project_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let out = run_ok(
        dir,
        &["project", "new", "learn", "to", "play", "guitar", "--offline"],
    );
    assert!(out.contains("Created Play Journey"), "{out}");
    assert!(out.contains("4 phases, 8 steps"), "{out}");
    assert!(out.contains("Source: fallback"), "{out}");

    let state = store(dir).load().unwrap();
    assert_eq!(state.projects.len(), 1);
    assert_eq!(state.current_view, View::TimelineProject);
    let id = state.projects[0].id.clone();
    assert_eq!(state.selected_project.as_deref(), Some(id.as_str()));

    let out = run_ok(dir, &["project", "list"]);
    assert!(out.contains(&id[..8]), "{out}");
    assert!(out.contains("0/8"), "{out}");

    let out = run_ok(dir, &["project", "toggle", &id[..8], "3"]);
    assert!(out.contains("Completed"), "{out}");
    assert!(out.contains("Progress: 13%"), "{out}");

    let out = run_ok(dir, &["status"]);
    assert!(out.contains("Steps completed: 1/8"), "{out}");

    let out = run_ok(dir, &["project", "show", &id]);
    assert!(out.contains("Phase 1"), "{out}");
    assert!(out.contains("[x]"), "{out}");

    let out = run_ok(dir, &["project", "toggle", &id, "3"]);
    assert!(out.contains("Reopened"), "{out}");
    assert_eq!(store(dir).load().unwrap().projects[0].progress, 0);
}

#[test]
fn offline_instructions_and_checkmarks() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    run_ok(dir, &["project", "new", "get", "fit", "--category", "fitness", "--offline"]);
    let state = store(dir).load().unwrap();
    let project = &state.projects[0];
    let step_id = project.roadmap[0].id.clone();

    let out = run_ok(dir, &["project", "instructions", &project.id, "1", "--offline"]);
    assert!(out.contains("[ ] 1."), "{out}");
    assert!(out.contains("Offline mode"), "{out}");

    run_ok(dir, &["project", "instructions", &project.id, "1", "--check", "2"]);
    let state = store(dir).load().unwrap();
    assert!(state.is_instruction_checked(&step_id, 1));

    let out = run_ok(dir, &["project", "instructions", &project.id, "1", "--offline"]);
    assert!(out.contains("[x] 2."), "{out}");

    let output = waymark(dir, &["project", "instructions", &project.id, "1", "--check", "0"]);
    assert!(!output.status.success());
}

#[test]
fn delete_clears_selection_and_unknown_ids_fail() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    run_ok(dir, &["project", "new", "learn", "rust", "--offline"]);
    let id = store(dir).load().unwrap().projects[0].id.clone();

    let output = waymark(dir, &["project", "show", "zzzz-not-an-id"]);
    assert!(!output.status.success());

    let out = run_ok(dir, &["project", "delete", &id]);
    assert!(out.contains("Deleted"), "{out}");

    let state = store(dir).load().unwrap();
    assert!(state.projects.is_empty());
    assert_eq!(state.selected_project, None);
    assert_eq!(state.current_view, View::Dashboard);
}

#[test]
fn unknown_category_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let output = waymark(
        tmp.path(),
        &["project", "new", "sail", "--category", "sailing", "--offline"],
    );
    assert!(!output.status.success());
    assert!(!tmp.path().join("state.json").exists());
}

#[test]
fn init_then_config_set() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let out = run_ok(dir, &["init"]);
    assert!(out.contains("Config written"), "{out}");

    let output = waymark(dir, &["init"]);
    assert!(!output.status.success(), "second init without --force must fail");
    run_ok(dir, &["init", "--force"]);

    run_ok(dir, &["config", "set", "server.port", "4000"]);
    let contents = std::fs::read_to_string(dir.join("config/waymark/config.toml")).unwrap();
    assert!(contents.contains("port = 4000"), "{contents}");

    let output = waymark(dir, &["config", "set", "server.colour", "blue"]);
    assert!(!output.status.success());

    let out = run_ok(dir, &["config", "path"]);
    assert!(out.trim().ends_with("waymark/config.toml"), "{out}");
}

#[test]
fn instruction_check_is_capped() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    run_ok(dir, &["project", "new", "learn", "rust", "--offline"]);
    let id = store(dir).load().unwrap().projects[0].id.clone();

    run_ok(dir, &["project", "instructions", &id, "1", "--check", "8"]);
    let output = waymark(dir, &["project", "instructions", &id, "1", "--check", "9"]);
    assert!(!output.status.success());

    let state = store(dir).load().unwrap();
    assert_eq!(state.instruction_checks.len(), 1);
}

#[test]
fn quiz_without_completed_steps_uses_default_questions() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    run_ok(dir, &["project", "new", "learn", "piano", "--offline"]);
    let id = store(dir).load().unwrap().projects[0].id.clone();

    let out = run_ok(dir, &["project", "quiz", &id, "--offline", "--answers", "b,b,c,b,b"]);
    assert!(out.contains("(5 questions)"), "{out}");
    assert!(out.contains("Outstanding! You scored 5/5 (100%) on your 0-step quiz!"), "{out}");

    let out = run_ok(dir, &["project", "quiz", &id, "--offline", "--answers", "a,b,c"]);
    assert!(out.contains("Good effort! You scored 2/5 (40%)."), "{out}");

    let output = waymark(dir, &["project", "quiz", &id, "--offline", "--answers", "z"]);
    assert!(!output.status.success());
}

#[test]
fn quiz_covers_each_completed_step() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    run_ok(dir, &["project", "new", "learn", "piano", "--offline"]);
    let id = store(dir).load().unwrap().projects[0].id.clone();
    run_ok(dir, &["project", "toggle", &id, "1"]);
    run_ok(dir, &["project", "toggle", &id, "2"]);

    let answers = vec!["a"; 10].join(",");
    let out = run_ok(dir, &["project", "quiz", &id, "--offline", "--answers", &answers]);
    assert!(out.contains("(10 questions)"), "{out}");
    assert!(out.contains("You scored 10/10 (100%) on your 2-step quiz!"), "{out}");

    let answers = vec!["a,a,a,a,a,a,a", "b,b,b"].join(",");
    let out = run_ok(dir, &["project", "quiz", &id, "--offline", "--answers", &answers]);
    assert!(out.contains("Great job! You scored 7/10 (70%)"), "{out}");
}
