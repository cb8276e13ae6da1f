//! Client-side persisted state for waymark: projects, step completion,
//! instruction checkmarks, and the versioned JSON file they live in.

pub mod config;
pub mod migrate;
pub mod models;
pub mod state;

pub use config::StoreConfig;
pub use migrate::{CURRENT_SCHEMA_VERSION, migrate};
pub use models::{AppState, DashboardStats, Project, ProjectStep, View, progress_percent};
pub use state::{StateStore, StoreError};
