//! `waymark project` subcommands.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use waymark_core::parse::MAX_INSTRUCTIONS;
use waymark_core::quiz::{self, QuizQuestion};
use waymark_core::source::{RemoteSource, RoadmapSource, SampleSource};
use waymark_core::{
    Category, GenerationSettings, Generated, InstructionRequest, Orchestrator,
    ProviderPreference, ProviderRegistry, Roadmap, RoadmapRequest,
};
use waymark_store::{Project, StateStore};

use crate::ProjectCommands;
use crate::config::WaymarkConfig;
use crate::resolve::resolve_step;
use crate::status_cmd::{print_project_table, short_id};

/// Run a project subcommand.
pub async fn run_project_command(command: ProjectCommands, config: &WaymarkConfig) -> Result<()> {
    let store = StateStore::from_config(&config.store);
    match command {
        ProjectCommands::New {
            goal,
            category,
            offline,
        } => {
            let source = choose_source(config, offline)?;
            run_new(&store, source.as_ref(), &goal.join(" "), &category).await
        }
        ProjectCommands::List => {
            print_project_table(&store.load()?);
            Ok(())
        }
        ProjectCommands::Show { project } => run_show(&store, &project),
        ProjectCommands::Toggle { project, step } => run_toggle(&store, &project, &step),
        ProjectCommands::Delete { project } => run_delete(&store, &project),
        ProjectCommands::Select { project } => run_select(&store, &project),
        ProjectCommands::Instructions {
            project,
            step,
            check,
            use_ai,
            offline,
        } => match check {
            Some(index) => run_check(&store, &project, &step, index),
            None => {
                let source = choose_source(config, offline)?;
                run_instructions(&store, source.as_ref(), &project, &step, use_ai.as_deref()).await
            }
        },
        ProjectCommands::Quiz {
            project,
            answers,
            offline,
        } => {
            let source = choose_source(config, offline)?;
            run_quiz(&store, source.as_ref(), &project, answers).await
        }
    }
}

// -----------------------------------------------------------------------
// Data source
// -----------------------------------------------------------------------

/// Sample content if offline, the remote server if one is configured,
/// otherwise in-process generation.
fn choose_source(config: &WaymarkConfig, offline: bool) -> Result<Box<dyn RoadmapSource>> {
    if offline {
        return Ok(Box::new(SampleSource));
    }
    if let Some(url) = &config.server_url {
        let remote = RemoteSource::new(url, config.providers.timeout)?;
        tracing::debug!(url = remote.base_url(), "using remote roadmap server");
        return Ok(Box::new(remote));
    }
    let registry = ProviderRegistry::from_config(&config.providers)
        .context("failed to build provider clients")?;
    Ok(Box::new(Orchestrator::new(
        Arc::new(registry),
        GenerationSettings::default(),
    )))
}

async fn roadmap_or_sample(
    source: &dyn RoadmapSource,
    request: &RoadmapRequest,
) -> Result<Generated<Roadmap>> {
    match source.roadmap(request).await {
        Ok(generated) => Ok(generated),
        Err(e) => {
            tracing::warn!(source = source.name(), error = %format!("{e:#}"), "roadmap source failed, using sample content");
            SampleSource.roadmap(request).await
        }
    }
}

async fn instructions_or_sample(
    source: &dyn RoadmapSource,
    request: &InstructionRequest,
) -> Result<Generated<Vec<String>>> {
    match source.instructions(request).await {
        Ok(generated) => Ok(generated),
        Err(e) => {
            tracing::warn!(source = source.name(), error = %format!("{e:#}"), "instruction source failed, using sample content");
            SampleSource.instructions(request).await
        }
    }
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

async fn run_new(
    store: &StateStore,
    source: &dyn RoadmapSource,
    goal: &str,
    category: &str,
) -> Result<()> {
    let category: Category = category.parse()?;
    let request = RoadmapRequest::new(goal, category)?;

    println!("Generating roadmap for {:?} ({category})...", request.goal());
    let generated = roadmap_or_sample(source, &request).await?;
    let project = Project::from_roadmap(request.goal(), category, &generated.value);

    let summary = format!(
        "{} ({}): {} phases, {} steps",
        project.project_name,
        short_id(&project.id),
        generated.value.phases.len(),
        project.roadmap.len()
    );
    store.update(|state| {
        state.add_project(project);
        Ok::<_, anyhow::Error>(())
    })?;

    println!("Created {summary}");
    println!("Source: {}", generated.source.ai_used());
    if let Some(note) = generated.source.note() {
        println!("Note: {note}");
    }
    Ok(())
}

fn run_show(store: &StateStore, query: &str) -> Result<()> {
    let state = store.load()?;
    let project = state.resolve_project(query)?;

    println!("{} ({})", project.project_name, project.id);
    println!("Goal: {}", project.prompt);
    println!("Category: {}", project.category);
    println!(
        "Created: {}",
        project.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Progress: {}% ({}/{} steps)",
        project.progress,
        project.completed_steps(),
        project.roadmap.len()
    );

    let mut current_phase = None;
    for (index, step) in project.roadmap.iter().enumerate() {
        if step.phase_number != current_phase {
            current_phase = step.phase_number;
            if let Some(phase) = current_phase {
                println!();
                println!("Phase {phase}");
            }
        }
        let mark = if step.completed { "x" } else { " " };
        println!("  [{mark}] {:>2}. {}", index + 1, step.title);
        if step.description != step.title {
            println!("         {}", step.description);
        }
        if let Some(done) = step.completed_at {
            println!("         completed {}", done.format("%Y-%m-%d"));
        }
    }
    Ok(())
}

fn run_toggle(store: &StateStore, project_query: &str, step_query: &str) -> Result<()> {
    let (title, completed, progress) = store.update(|state| {
        let project = state.resolve_project(project_query)?;
        let project_id = project.id.clone();
        let (_, step) = resolve_step(project, step_query)?;
        let (step_id, title) = (step.id.clone(), step.title.clone());

        let completed = state.toggle_step(&project_id, &step_id)?;
        let progress = state.project(&project_id).map_or(0, |p| p.progress);
        Ok::<_, anyhow::Error>((title, completed, progress))
    })?;

    let verb = if completed { "Completed" } else { "Reopened" };
    println!("{verb}: {title}");
    println!("Progress: {progress}%");
    Ok(())
}

fn run_delete(store: &StateStore, query: &str) -> Result<()> {
    let removed = store.update(|state| {
        let id = state.resolve_project(query)?.id.clone();
        Ok::<_, anyhow::Error>(state.delete_project(&id)?)
    })?;
    println!("Deleted {} ({})", removed.project_name, short_id(&removed.id));
    Ok(())
}

fn run_select(store: &StateStore, query: &str) -> Result<()> {
    let name = store.update(|state| {
        let project = state.resolve_project(query)?;
        let (id, name) = (project.id.clone(), project.project_name.clone());
        state.select_project(&id)?;
        Ok::<_, anyhow::Error>(name)
    })?;
    println!("Selected {name}");
    Ok(())
}

/// Toggle checkmark `number` (1-based) on a step's instructions.
fn run_check(store: &StateStore, project_query: &str, step_query: &str, number: usize) -> Result<()> {
    if number == 0 || number > MAX_INSTRUCTIONS {
        bail!("instruction numbers run from 1 to {MAX_INSTRUCTIONS}");
    }
    let checked = store.update(|state| {
        let project = state.resolve_project(project_query)?;
        let (_, step) = resolve_step(project, step_query)?;
        let step_id = step.id.clone();
        Ok::<_, anyhow::Error>(state.toggle_instruction(&step_id, number - 1))
    })?;
    let verb = if checked { "Checked" } else { "Unchecked" };
    println!("{verb} instruction {number}");
    Ok(())
}

async fn run_instructions(
    store: &StateStore,
    source: &dyn RoadmapSource,
    project_query: &str,
    step_query: &str,
    use_ai: Option<&str>,
) -> Result<()> {
    let state = store.load()?;
    let project = state.resolve_project(project_query)?;
    let (index, step) = resolve_step(project, step_query)?;

    let preference: ProviderPreference = match use_ai {
        Some(raw) => raw.parse()?,
        None => ProviderPreference::Auto,
    };
    let step_number = u32::try_from(index + 1).ok();
    let request = InstructionRequest::new(&step.description, project.category)?
        .with_preference(preference)
        .with_position(step.phase_number, step_number)
        .with_project_name(Some(project.project_name.clone()));

    let generated = instructions_or_sample(source, &request).await?;

    println!("{}", step.title);
    println!();
    for (i, instruction) in generated.value.iter().enumerate() {
        let mark = if state.is_instruction_checked(&step.id, i) { "x" } else { " " };
        println!("  [{mark}] {}. {instruction}", i + 1);
    }
    println!();
    println!("Source: {}", generated.source.ai_used());
    if let Some(note) = generated.source.note() {
        println!("Note: {note}");
    }
    Ok(())
}

/// Questions for every completed step, or the default set when none are
/// completed. A step whose instructions cannot be fetched gets the default
/// set too.
async fn quiz_questions(
    source: &dyn RoadmapSource,
    project: &Project,
) -> Result<Vec<QuizQuestion>> {
    let completed: Vec<_> = project.roadmap.iter().filter(|s| s.completed).collect();
    if completed.is_empty() {
        return Ok(quiz::default_questions());
    }

    let mut questions = Vec::new();
    for step in completed {
        let request = quiz::step_request(&step.title, &step.description, &project.prompt)?;
        match source.instructions(&request).await {
            Ok(generated) => {
                questions.extend(quiz::questions_for_step(&step.title, &generated.value));
            }
            Err(e) => {
                tracing::warn!(source = source.name(), step = %step.id, error = %format!("{e:#}"), "quiz questions unavailable, using defaults");
                questions.extend(quiz::default_questions());
            }
        }
    }
    Ok(questions)
}

fn print_question(number: usize, question: &QuizQuestion) {
    println!("{number}. {}", question.question);
    for (i, option) in question.options.iter().enumerate() {
        println!("   {}) {option}", quiz::option_label(i));
    }
}

/// Prompt on stdin until a valid answer is given. `None` at end of input.
fn ask(stdin: &mut impl BufRead) -> Result<Option<usize>> {
    loop {
        print!("Answer [a-d]: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match quiz::parse_answer(&line) {
            Some(answer) => return Ok(Some(answer)),
            None => println!("Please answer a, b, c or d."),
        }
    }
}

async fn run_quiz(
    store: &StateStore,
    source: &dyn RoadmapSource,
    query: &str,
    answers: Option<Vec<String>>,
) -> Result<()> {
    let state = store.load()?;
    let project = state.resolve_project(query)?;
    let completed = project.completed_steps();
    let questions = quiz_questions(source, project).await?;

    println!("Quiz: {} ({} questions)", project.project_name, questions.len());
    println!();

    let chosen: Vec<Option<usize>> = match answers {
        Some(raw) => {
            let parsed = raw
                .iter()
                .map(|a| {
                    quiz::parse_answer(a).with_context(|| format!("invalid answer {a:?}: use a-d or 1-4"))
                })
                .collect::<Result<Vec<_>>>()?;
            parsed.into_iter().map(Some).collect()
        }
        None => {
            let mut stdin = std::io::stdin().lock();
            let mut chosen = Vec::with_capacity(questions.len());
            for (i, question) in questions.iter().enumerate() {
                print_question(i + 1, question);
                chosen.push(ask(&mut stdin)?);
                println!();
            }
            chosen
        }
    };

    for (i, question) in questions.iter().enumerate() {
        let answer = chosen.get(i).copied().flatten();
        let verdict = if answer == Some(question.correct) { "correct" } else { "wrong" };
        let given = answer.map_or('-', quiz::option_label);
        println!(
            "  {:>2}. {given} ({verdict}, answer {})",
            i + 1,
            quiz::option_label(question.correct)
        );
    }
    println!();
    println!("{}", quiz::score(&questions, &chosen).feedback(completed));
    Ok(())
}
