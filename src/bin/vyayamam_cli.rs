// ABOUTME: Vyayamam CLI - local chat transport and plan tooling for the strength coach
// ABOUTME: Reads messages from stdin or arguments and prints rendered replies to stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Interactive chat, one message per line
//! vyayamam-cli chat --user alice
//!
//! # Send a single message
//! vyayamam-cli send --user alice "smith incline 120 8 rpe 7"
//!
//! # Show the exercise catalog
//! vyayamam-cli catalog
//!
//! # Print the active plan as YAML, or validate a plan file
//! vyayamam-cli plan show
//! vyayamam-cli plan check ./plan.yaml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use vyayamam::catalog::ExerciseCatalog;
use vyayamam::config::plan::load_yaml;
use vyayamam::config::{PlanStore, ServerConfig};
use vyayamam::formatters::render_reply;
use vyayamam::handler::MessageHandler;
use vyayamam::logging::LoggingConfig;
use vyayamam_core::models::UserId;

#[derive(Parser)]
#[command(
    name = "vyayamam-cli",
    about = "Vyayamam strength coach CLI",
    long_about = "Chat with the strength coach from a terminal and manage the workout plan."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (`memory` for a throwaway store)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Disable the coaching model
    #[arg(long, global = true)]
    no_llm: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Interactive chat over stdin
    Chat {
        /// User identifier, e.g. a phone number
        #[arg(long)]
        user: String,
    },

    /// Send one message and print the reply
    Send {
        /// User identifier, e.g. a phone number
        #[arg(long)]
        user: String,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// List the exercise catalog by muscle group
    Catalog,

    /// Workout plan commands
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum PlanCommand {
    /// Print the active plan as YAML
    Show,

    /// Validate a YAML plan file against the catalog
    Check {
        /// Plan file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::for_cli();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = ServerConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if cli.no_llm {
        config.llm.enabled = false;
    }

    match cli.command {
        Command::Chat { user } => chat(&config, &UserId::new(user)).await,
        Command::Send { user, message } => {
            let handler = MessageHandler::from_config(&config).await?;
            let reply = handler.handle(&UserId::new(user), &message.join(" ")).await;
            println!("{}", render_reply(&reply, &config.render_options()));
            Ok(())
        }
        Command::Catalog => {
            let catalog = ExerciseCatalog::default_catalog();
            for (group, exercises) in catalog.by_muscle_group() {
                println!("{group}");
                for exercise in exercises {
                    println!("  {}", exercise.name);
                }
            }
            Ok(())
        }
        Command::Plan { action } => plan(&config, action),
    }
}

async fn chat(config: &ServerConfig, user: &UserId) -> Result<()> {
    let handler = MessageHandler::from_config(config).await?;
    let options = config.render_options();
    info!(user.id = %user, "Starting interactive chat");

    let mut stdout = io::stdout();
    stdout
        .write_all(b"Vyayamam coach. Type /help for commands, Ctrl-D to quit.\n")
        .await?;
    if handler.coach().check_model().await == Some(false) {
        let notice = format!(
            "Coaching model at {} is unreachable; /ask and summaries will use fallbacks.\n",
            config.llm.provider.base_url
        );
        stdout.write_all(notice.as_bytes()).await?;
    }
    stdout.flush().await?;

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let reply = handler.handle(user, text).await;
        write_reply(&mut stdout, &render_reply(&reply, &options)).await?;
    }
    Ok(())
}

async fn write_reply(stdout: &mut io::Stdout, text: &str) -> Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n\n").await?;
    stdout.flush().await?;
    Ok(())
}

fn plan(config: &ServerConfig, action: PlanCommand) -> Result<()> {
    let catalog = ExerciseCatalog::default_catalog();
    match action {
        PlanCommand::Show => {
            let store = PlanStore::load(config.plan_path.as_deref(), &catalog)?;
            print!("{}", serde_yaml::to_string(store.current().as_ref())?);
        }
        PlanCommand::Check { file } => {
            let plan = load_yaml(&file, &catalog)
                .with_context(|| format!("Plan {} is invalid", file.display()))?;
            let exercises: usize = plan.days.iter().map(|day| day.exercises.len()).sum();
            println!(
                "{} is valid: {} days, {exercises} planned exercises",
                file.display(),
                plan.days.len()
            );
        }
    }
    Ok(())
}
