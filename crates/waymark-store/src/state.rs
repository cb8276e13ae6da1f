//! JSON file store for [`AppState`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::StoreConfig;
use crate::migrate::migrate;
use crate::models::AppState;

/// Failures of the state store and of state operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid state file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("state schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("malformed state: {0}")]
    Malformed(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project prefix {prefix:?} is ambiguous: {}", matches.join(", "))]
    AmbiguousProject { prefix: String, matches: Vec<String> },

    #[error("step {step:?} not found in project {project}")]
    StepNotFound { project: String, step: String },
}

/// Reads and writes one [`AppState`] JSON file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.state_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and migrate the state file. A missing file is the default state.
    pub fn load(&self) -> Result<AppState, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no state file, starting empty");
                return Ok(AppState::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let raw: serde_json::Value =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        migrate(raw)
    }

    /// Write the state atomically: a temp file in the same directory is
    /// synced and then renamed over the target.
    pub fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let contents = serde_json::to_string_pretty(state).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("state.json");
        let tmp_path = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        let write_result = (|| {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            drop(file);
            fs::rename(&tmp_path, &self.path)
        })();

        if let Err(source) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!(path = %self.path.display(), projects = state.projects.len(), "state saved");
        Ok(())
    }

    /// Load, apply `f`, and save only if `f` succeeds.
    pub fn update<T, E>(&self, f: impl FnOnce(&mut AppState) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut state = self.load()?;
        let out = f(&mut state)?;
        self.save(&state)?;
        Ok(out)
    }
}
