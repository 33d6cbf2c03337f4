// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! symposium - broker, bridge, and orchestrator for an AI-assisted
//! developer taskspace.

mod config;
mod daemon_cmd;
mod logging;
mod orchestrator_cmd;
mod project_cmd;
mod tool_server_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "symposium", version, about = "Broker and orchestrator for an AI-assisted developer taskspace")]
struct Cli {
    /// Broker endpoint path (default: $SYMPOSIUM_SOCK, then
    /// $XDG_RUNTIME_DIR/symposium.sock, then /tmp/symposium-<user>/symposium.sock)
    #[arg(long, global = true)]
    endpoint: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the broker loop on this process
    Daemon {
        /// Seconds of no envelope traffic before the broker shuts itself down
        #[arg(long, default_value_t = 300)]
        quiet_interval_secs: u64,
    },
    /// Run the Tool Server on this process's stdin/stdout
    ToolServer,
    /// Open a Project and react to bus traffic for it
    Orchestrator {
        /// Path to the Project directory
        #[arg(long)]
        project: PathBuf,
    },
    /// Project directory management
    Project(ProjectArgs),
}

#[derive(clap::Args)]
struct ProjectArgs {
    #[command(subcommand)]
    command: ProjectCommand,
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Materialize a new, empty Project directory
    Create {
        /// Directory to create the project in
        path: PathBuf,
        /// Human-readable project name
        #[arg(long)]
        name: String,
        /// Source repository this project's taskspaces clone from
        #[arg(long)]
        source_repository: String,
        /// Default branch new taskspaces are spawned from
        #[arg(long, default_value = "main")]
        default_branch: String,
        /// Agent tag preferred for this project's taskspaces
        #[arg(long)]
        preferred_agent_tag: Option<String>,
        /// Lay out taskspaces as stacked branches rather than worktrees
        #[arg(long)]
        stacked_layout: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let endpoint = config::resolve_endpoint(cli.endpoint);

    match cli.command {
        Commands::Daemon { quiet_interval_secs } => {
            daemon_cmd::run(endpoint, quiet_interval_secs).await
        }
        Commands::ToolServer => tool_server_cmd::run(endpoint).await,
        Commands::Orchestrator { project } => orchestrator_cmd::run(project, endpoint).await,
        Commands::Project(args) => match args.command {
            ProjectCommand::Create {
                path,
                name,
                source_repository,
                default_branch,
                preferred_agent_tag,
                stacked_layout,
            } => project_cmd::create(path, name, source_repository, default_branch, preferred_agent_tag, stacked_layout),
        },
    }
}
