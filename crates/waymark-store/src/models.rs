use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use waymark_core::{Category, Roadmap};

use crate::migrate::CURRENT_SCHEMA_VERSION;
use crate::state::StoreError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which screen the client was last showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Dashboard,
    Project,
    TimelineProject,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dashboard => "dashboard",
            Self::Project => "project",
            Self::TimelineProject => "timeline-project",
        };
        f.write_str(s)
    }
}

impl FromStr for View {
    type Err = ViewParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(Self::Dashboard),
            "project" => Ok(Self::Project),
            "timeline-project" => Ok(Self::TimelineProject),
            other => Err(ViewParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`View`] string.
#[derive(Debug, Clone)]
pub struct ViewParseError(pub String);

impl fmt::Display for ViewParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid view: {:?}", self.0)
    }
}

impl std::error::Error for ViewParseError {}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// `round(100 * completed / total)`, or 0 for an empty roadmap.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed.min(total) as f64 * 100.0 / total as f64).round();
    pct as u8
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// One step of a saved project, with completion tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStep {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_number: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProjectStep {
    /// Flip completion. Returns the new state.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> bool {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
        self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub project_name: String,
    pub prompt: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub roadmap: Vec<ProjectStep>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: u8,
}

impl Project {
    /// Create a project from a generated roadmap, flattening its phases.
    pub fn from_roadmap(prompt: &str, category: Category, roadmap: &Roadmap) -> Self {
        let id = Uuid::new_v4().to_string();
        let short = &id[..8];
        let steps = roadmap
            .flatten()
            .enumerate()
            .map(|(index, (phase, step))| ProjectStep {
                id: format!("step-{short}-{index}"),
                title: step.title.clone(),
                description: step.description.clone(),
                phase_number: Some(phase),
                completed: false,
                completed_at: None,
            })
            .collect();

        Self {
            id,
            project_name: roadmap.project_name.clone(),
            prompt: prompt.to_owned(),
            category,
            roadmap: steps,
            created_at: Utc::now(),
            progress: 0,
        }
    }

    pub fn completed_steps(&self) -> usize {
        self.roadmap.iter().filter(|s| s.completed).count()
    }

    pub fn recompute_progress(&mut self) {
        self.progress = progress_percent(self.completed_steps(), self.roadmap.len());
    }

    pub fn step(&self, step_id: &str) -> Option<&ProjectStep> {
        self.roadmap.iter().find(|s| s.id == step_id)
    }

    /// Toggle a step and recompute progress. Returns the step's new state,
    /// or `None` if no step has that id.
    pub fn toggle_step(&mut self, step_id: &str) -> Option<bool> {
        self.toggle_step_at(step_id, Utc::now())
    }

    pub fn toggle_step_at(&mut self, step_id: &str, now: DateTime<Utc>) -> Option<bool> {
        let completed = self
            .roadmap
            .iter_mut()
            .find(|s| s.id == step_id)?
            .toggle(now);
        self.recompute_progress();
        Some(completed)
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub avg_progress: u8,
}

/// Everything the client persists, stored as one JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub schema_version: u32,
    /// Newest first.
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub current_view: View,
    #[serde(default)]
    pub selected_project: Option<String>,
    /// Checked instruction keys, `"<stepId>-<index>"`.
    #[serde(default)]
    pub instruction_checks: BTreeSet<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            projects: Vec::new(),
            current_view: View::Dashboard,
            selected_project: None,
            instruction_checks: BTreeSet::new(),
        }
    }
}

impl AppState {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected_project.as_deref().and_then(|id| self.project(id))
    }

    /// Prepend a project, select it, and switch to its timeline.
    pub fn add_project(&mut self, project: Project) -> &Project {
        self.selected_project = Some(project.id.clone());
        self.current_view = View::TimelineProject;
        self.projects.insert(0, project);
        &self.projects[0]
    }

    /// Remove a project and its instruction checkmarks. Clears the selection
    /// if it pointed at the removed project.
    pub fn delete_project(&mut self, id: &str) -> Result<Project, StoreError> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_owned()))?;
        let removed = self.projects.remove(index);

        let step_ids: Vec<&str> = removed.roadmap.iter().map(|s| s.id.as_str()).collect();
        self.instruction_checks
            .retain(|key| !step_ids.iter().any(|step| is_check_for(key, step)));

        if self.selected_project.as_deref() == Some(id) {
            self.selected_project = None;
            self.current_view = View::Dashboard;
        }
        Ok(removed)
    }

    pub fn select_project(&mut self, id: &str) -> Result<(), StoreError> {
        if self.project(id).is_none() {
            return Err(StoreError::ProjectNotFound(id.to_owned()));
        }
        self.selected_project = Some(id.to_owned());
        self.current_view = View::Project;
        Ok(())
    }

    /// Toggle a step's completion. Returns the new state.
    pub fn toggle_step(&mut self, project_id: &str, step_id: &str) -> Result<bool, StoreError> {
        let project = self
            .project_mut(project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_owned()))?;
        project
            .toggle_step(step_id)
            .ok_or_else(|| StoreError::StepNotFound {
                project: project_id.to_owned(),
                step: step_id.to_owned(),
            })
    }

    /// Flip an instruction checkmark. Returns the new state.
    pub fn toggle_instruction(&mut self, step_id: &str, index: usize) -> bool {
        let key = instruction_key(step_id, index);
        if self.instruction_checks.remove(&key) {
            false
        } else {
            self.instruction_checks.insert(key);
            true
        }
    }

    pub fn is_instruction_checked(&self, step_id: &str, index: usize) -> bool {
        self.instruction_checks
            .contains(&instruction_key(step_id, index))
    }

    pub fn stats(&self) -> DashboardStats {
        let total_projects = self.projects.len();
        let total_steps = self.projects.iter().map(|p| p.roadmap.len()).sum();
        let completed_steps = self.projects.iter().map(Project::completed_steps).sum();
        let avg_progress = if total_projects == 0 {
            0
        } else {
            let sum: usize = self.projects.iter().map(|p| usize::from(p.progress)).sum();
            (sum as f64 / total_projects as f64).round() as u8
        };
        DashboardStats {
            total_projects,
            total_steps,
            completed_steps,
            avg_progress,
        }
    }

    /// Find a project by exact id or unique id prefix.
    pub fn resolve_project(&self, query: &str) -> Result<&Project, StoreError> {
        if let Some(project) = self.project(query) {
            return Ok(project);
        }
        let matches: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| !query.is_empty() && p.id.starts_with(query))
            .collect();
        match matches.as_slice() {
            [project] => Ok(*project),
            [] => Err(StoreError::ProjectNotFound(query.to_owned())),
            many => Err(StoreError::AmbiguousProject {
                prefix: query.to_owned(),
                matches: many.iter().map(|p| p.id.clone()).collect(),
            }),
        }
    }
}

fn instruction_key(step_id: &str, index: usize) -> String {
    format!("{step_id}-{index}")
}

fn is_check_for(key: &str, step_id: &str) -> bool {
    key.strip_prefix(step_id)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}
