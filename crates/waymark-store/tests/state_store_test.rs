//! File-level tests for the state store: persistence, progress tracking,
//! and migration of legacy state files.

use std::fs;

use serde_json::json;

use waymark_core::{Category, fallback};
use waymark_store::{AppState, CURRENT_SCHEMA_VERSION, Project, StoreError, View};
use waymark_test_utils::temp_store;

fn new_project(goal: &str) -> Project {
    Project::from_roadmap(goal, Category::Learning, &fallback::roadmap(goal, Category::Learning))
}

#[test]
fn save_then_load_preserves_state() {
    let (_dir, store) = temp_store();
    let mut state = AppState::default();
    let id = state.add_project(new_project("learn rust")).id.clone();
    let step = state.projects[0].roadmap[2].id.clone();
    state.toggle_step(&id, &step).unwrap();
    state.toggle_instruction(&step, 1);
    store.save(&state).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.schema_version, CURRENT_SCHEMA_VERSION);
    assert!(loaded.is_instruction_checked(&step, 1));
}

#[test]
fn saved_file_has_versioned_camel_case_layout() {
    let (_dir, store) = temp_store();
    let mut state = AppState::default();
    state.add_project(new_project("learn rust"));
    store.save(&state).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["schemaVersion"], 2);
    assert_eq!(raw["currentView"], "timeline-project");
    assert!(raw["selectedProject"].is_string());
    assert!(raw["projects"][0]["projectName"].is_string());
    assert!(raw["projects"][0]["roadmap"][0]["completedAt"].is_null());
}

#[test]
fn double_toggle_restores_progress() {
    let mut state = AppState::default();
    let id = state.add_project(new_project("learn rust")).id.clone();
    let steps: Vec<String> = state.projects[0].roadmap.iter().map(|s| s.id.clone()).collect();

    state.toggle_step(&id, &steps[0]).unwrap();
    state.toggle_step(&id, &steps[1]).unwrap();
    state.toggle_step(&id, &steps[2]).unwrap();
    let before = state.project(&id).unwrap().progress;
    assert_eq!(before, 38);

    assert!(state.toggle_step(&id, &steps[5]).unwrap());
    let stamped = state.project(&id).unwrap().roadmap[5].completed_at;
    assert!(stamped.is_some());
    assert!(!state.toggle_step(&id, &steps[5]).unwrap());

    let project = state.project(&id).unwrap();
    assert_eq!(project.progress, before);
    assert!(project.roadmap[5].completed_at.is_none());
}

#[test]
fn update_saves_only_on_success() {
    let (_dir, store) = temp_store();
    store
        .update(|state| {
            state.add_project(new_project("learn rust"));
            Ok::<_, StoreError>(())
        })
        .unwrap();
    assert_eq!(store.load().unwrap().projects.len(), 1);

    let result = store.update(|state| {
        state.projects.clear();
        state.select_project("missing")
    });
    assert!(matches!(result, Err(StoreError::ProjectNotFound(_))));
    assert_eq!(store.load().unwrap().projects.len(), 1);
}

#[test]
fn legacy_v1_file_is_migrated() {
    let (_dir, store) = temp_store();
    let legacy_project = json!({
        "id": "1718000000000",
        "projectName": "Learn guitar chords",
        "prompt": "guitar chords",
        "roadmap": [
            { "id": "step-1718000000000-0", "title": "Open chords", "description": "Learn open chords",
              "completed": true, "completedAt": "2024-06-10T12:00:00.000Z" },
            { "id": "step-1718000000000-1", "title": "Barre chords", "description": "Learn barre chords",
              "completed": false, "completedAt": null },
            { "id": "step-1718000000000-2", "title": "Songs", "description": "Play songs",
              "completed": false, "completedAt": null }
        ],
        "createdAt": "2024-06-10T10:00:00.000Z",
        "progress": 50
    });
    let legacy = json!({
        "projects": [legacy_project.clone()],
        "currentView": "timeline-project",
        "selectedProject": legacy_project,
        "instructionProgress": {
            "step-1718000000000-0-0": true,
            "step-1718000000000-0-1": false
        }
    });
    fs::write(store.path(), legacy.to_string()).unwrap();

    let state = store.load().unwrap();
    assert_eq!(state.schema_version, 2);
    assert_eq!(state.selected_project.as_deref(), Some("1718000000000"));
    assert_eq!(state.current_view, View::TimelineProject);
    assert!(state.is_instruction_checked("step-1718000000000-0", 0));
    assert!(!state.is_instruction_checked("step-1718000000000-0", 1));

    let project = &state.projects[0];
    assert_eq!(project.category, Category::Learning);
    assert_eq!(project.roadmap[0].phase_number, None);
    // Stored progress is recomputed from the steps.
    assert_eq!(project.progress, 33);

    store.save(&state).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["schemaVersion"], 2);
    assert!(raw.get("instructionProgress").is_none());
}

#[test]
fn future_schema_file_is_rejected() {
    let (_dir, store) = temp_store();
    fs::write(store.path(), r#"{"schemaVersion": 9, "projects": []}"#).unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedVersion { found: 9, .. }));
    assert!(err.to_string().contains("newer"));
}
