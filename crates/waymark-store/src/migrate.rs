//! Schema migration for the state file.
//!
//! Every load goes through [`migrate`]. Version history:
//!
//! - **v1**: no `schemaVersion` key. `selectedProject` holds a full project
//!   object, and instruction checkmarks live in an `instructionProgress`
//!   map of `key -> bool`.
//! - **v2**: `selectedProject` is an id, checkmarks are an
//!   `instructionChecks` set, projects carry a category and steps carry a
//!   phase number.

use serde_json::{Map, Value, json};

use crate::models::{AppState, View};
use crate::state::StoreError;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Upgrade a raw state document to the current schema and decode it.
pub fn migrate(raw: Value) -> Result<AppState, StoreError> {
    let version = match raw.get("schemaVersion") {
        None | Some(Value::Null) => 1,
        Some(v) => v.as_u64().ok_or_else(|| {
            StoreError::Malformed(format!("schemaVersion must be a non-negative integer, got {v}"))
        })?,
    };

    if version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    let raw = if version < 2 {
        tracing::info!(from = version, to = CURRENT_SCHEMA_VERSION, "migrating state file");
        v1_to_v2(raw)?
    } else {
        raw
    };

    let mut state: AppState =
        serde_json::from_value(raw).map_err(|e| StoreError::Malformed(e.to_string()))?;
    state.schema_version = CURRENT_SCHEMA_VERSION;

    for project in &mut state.projects {
        project.recompute_progress();
    }
    if state.selected_project.is_some() && state.selected().is_none() {
        state.selected_project = None;
    }
    Ok(state)
}

fn v1_to_v2(mut raw: Value) -> Result<Value, StoreError> {
    let obj = raw
        .as_object_mut()
        .ok_or_else(|| StoreError::Malformed("state must be a JSON object".to_owned()))?;

    let selected = match obj.remove("selectedProject") {
        Some(Value::Object(project)) => project.get("id").cloned().unwrap_or(Value::Null),
        Some(id @ Value::String(_)) => id,
        _ => Value::Null,
    };
    obj.insert("selectedProject".to_owned(), selected);

    let checks: Vec<Value> = match obj.remove("instructionProgress") {
        Some(Value::Object(progress)) => checked_keys(progress),
        _ => Vec::new(),
    };
    obj.insert("instructionChecks".to_owned(), Value::Array(checks));

    let view_known = obj
        .get("currentView")
        .and_then(Value::as_str)
        .is_some_and(|v| v.parse::<View>().is_ok());
    if !view_known {
        obj.insert("currentView".to_owned(), json!(View::Dashboard));
    }

    obj.insert("schemaVersion".to_owned(), json!(2));
    Ok(raw)
}

fn checked_keys(progress: Map<String, Value>) -> Vec<Value> {
    progress
        .into_iter()
        .filter(|(_, checked)| checked.as_bool() == Some(true))
        .map(|(key, _)| Value::String(key))
        .collect()
}
