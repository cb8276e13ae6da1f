mod config;
mod project_cmds;
mod resolve;
mod serve_cmd;
mod status_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use waymark_store::StateStore;

use config::{Overrides, WaymarkConfig};

#[derive(Parser)]
#[command(name = "waymark", about = "Learning roadmaps with AI-generated steps")]
struct Cli {
    /// State file path (overrides WAYMARK_STATE_PATH env var)
    #[arg(long, global = true)]
    state_path: Option<PathBuf>,

    /// Roadmap server URL for project commands (overrides WAYMARK_SERVER_URL)
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a waymark config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Inspect or edit the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Run the roadmap HTTP server
    Serve {
        /// Address to bind (default 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (default 3001)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Show dashboard stats and all projects
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a single `section.key` value
    Set {
        /// Key such as server.port or providers.gemini_api_key
        key: String,
        /// New value (comma-separated for lists)
        value: String,
    },
    /// Print the config file path
    Path,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Generate a roadmap and save it as a new project
    New {
        /// What you want to achieve
        #[arg(required = true, num_args = 1..)]
        goal: Vec<String>,
        /// learning, travel_planner, fitness or career
        #[arg(long, default_value = "learning")]
        category: String,
        /// Use built-in sample content instead of a provider or server
        #[arg(long)]
        offline: bool,
    },
    /// List all projects
    List,
    /// Show a project's steps grouped by phase
    Show {
        /// Project ID or unique prefix
        project: String,
    },
    /// Mark a step done, or undone if it already is
    Toggle {
        /// Project ID or unique prefix
        project: String,
        /// Step number (1-based) or step ID
        step: String,
    },
    /// Delete a project
    Delete {
        /// Project ID or unique prefix
        project: String,
    },
    /// Make a project the selected one
    Select {
        /// Project ID or unique prefix
        project: String,
    },
    /// Show detailed instructions for a step
    Instructions {
        /// Project ID or unique prefix
        project: String,
        /// Step number (1-based) or step ID
        step: String,
        /// Toggle the checkmark on instruction N (1-based) without fetching
        #[arg(long)]
        check: Option<usize>,
        /// Preferred provider: gemini or mistral
        #[arg(long)]
        use_ai: Option<String>,
        /// Use built-in sample content instead of a provider or server
        #[arg(long)]
        offline: bool,
    },
    /// Take a review quiz on the project's completed steps
    Quiz {
        /// Project ID or unique prefix
        project: String,
        /// Answers in order, comma-separated (a-d or 1-4); prompts when omitted
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<String>>,
        /// Use built-in sample content instead of a provider or server
        #[arg(long)]
        offline: bool,
    },
}

/// Execute the `waymark init` command: write a template config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    config::save_config(&config::ConfigFile::template())?;

    println!("Config written to {}", path.display());
    println!();
    println!("Next: set provider keys, e.g.");
    println!("  waymark config set providers.gemini_api_key <key>");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut overrides = Overrides {
        state_path: cli.state_path,
        server_url: cli.server_url,
        ..Overrides::default()
    };

    match cli.command {
        Commands::Init { force } => cmd_init(force)?,
        Commands::Config { command } => match command {
            ConfigCommands::Set { key, value } => {
                resolve::set_config_value(&key, &value)?;
                println!("{key} = {value}");
            }
            ConfigCommands::Path => println!("{}", config::config_path().display()),
        },
        Commands::Serve { bind, port } => {
            overrides.bind = bind;
            overrides.port = port;
            let resolved = WaymarkConfig::resolve(&overrides)?;
            serve_cmd::run_serve(&resolved.server, &resolved.providers).await?;
        }
        Commands::Project { command } => {
            let resolved = WaymarkConfig::resolve(&overrides)?;
            project_cmds::run_project_command(command, &resolved).await?;
        }
        Commands::Status => {
            let resolved = WaymarkConfig::resolve(&overrides)?;
            status_cmd::run_status(&StateStore::from_config(&resolved.store))?;
        }
    }

    Ok(())
}
