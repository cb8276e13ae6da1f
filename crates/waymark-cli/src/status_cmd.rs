//! `waymark status` command: dashboard stats and the project list.

use anyhow::Result;

use waymark_store::{AppState, Project, StateStore};

/// Run the status command.
pub fn run_status(store: &StateStore) -> Result<()> {
    let state = store.load()?;
    let stats = state.stats();

    println!("Projects:        {}", stats.total_projects);
    println!(
        "Steps completed: {}/{}",
        stats.completed_steps, stats.total_steps
    );
    println!("Average progress: {}%", stats.avg_progress);
    if let Some(project) = state.selected() {
        println!("Selected:        {} ({})", project.project_name, short_id(&project.id));
    }
    println!();

    print_project_table(&state);
    Ok(())
}

/// First 8 characters of an id, enough to address it by prefix.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(end, _)| &id[..end])
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) / 10;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}

fn display_name(project: &Project) -> String {
    if project.project_name.chars().count() > 30 {
        let head: String = project.project_name.chars().take(27).collect();
        format!("{head}...")
    } else {
        project.project_name.clone()
    }
}

/// Print every project, newest first, marking the selected one.
pub fn print_project_table(state: &AppState) {
    if state.projects.is_empty() {
        println!("No projects yet. Create one with `waymark project new <goal>`.");
        return;
    }

    println!(
        "  {:<10} {:<32} {:<15} {:>7} {:>5}",
        "ID", "NAME", "CATEGORY", "STEPS", "DONE"
    );
    println!("{}", "-".repeat(76));

    for project in &state.projects {
        let marker = if state.selected_project.as_deref() == Some(project.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<10} {:<32} {:<15} {:>7} {:>4}% {}",
            short_id(&project.id),
            display_name(project),
            project.category.as_str(),
            format!("{}/{}", project.completed_steps(), project.roadmap.len()),
            project.progress,
            progress_bar(project.progress),
        );
    }
}
