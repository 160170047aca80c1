// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Mealboard CLI - drag meals around a weekly plan

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mealboard::commands::{self, drag::DragArgs, Context};
use mealboard::config;

#[derive(Parser)]
#[command(name = "mealboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "MEALBOARD_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "MEALBOARD_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the board store
    Init {
        /// Fill the board with sample meals
        #[arg(long)]
        demo: bool,

        /// Overwrite an existing board
        #[arg(long)]
        force: bool,
    },

    /// Show the week's day groups
    Show {
        /// Any date inside the week to show (default: today)
        #[arg(long)]
        week: Option<NaiveDate>,
    },

    /// Preview depth and parent for a drag
    Project {
        /// Flat id being dragged
        active: String,

        /// Flat id or day key being hovered
        hover: String,

        /// Horizontal pointer offset in pixels
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        offset: f64,

        /// Any date inside the week to load
        #[arg(long)]
        week: Option<NaiveDate>,
    },

    /// Drag an entry and drop it, persisting the result
    Drag {
        /// Flat id to pick up
        active: String,

        /// Flat id or day key to drop on (omit to release outside)
        hover: Option<String>,

        /// Horizontal pointer offset in pixels
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        offset: f64,

        /// Any date inside the week to load
        #[arg(long)]
        week: Option<NaiveDate>,

        /// Show the outcome without persisting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Weekly plan table
    Table {
        /// Action: show, reorder, switch
        action: String,

        /// Action arguments (rows, columns)
        args: Vec<String>,

        /// Any date inside the week to use for columns
        #[arg(long)]
        week: Option<NaiveDate>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (omit to print all)
        key: Option<String>,

        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => "error".to_string(),
        0 => settings.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        config: settings,
        config_path: cli.config.unwrap_or_else(config::default_path),
        json: cli.json,
        color: !cli.no_color,
    };

    // Execute command
    match cli.command {
        Commands::Init { demo, force } => commands::init::run(&ctx, demo, force).await,
        Commands::Show { week } => commands::show::run(&ctx, week).await,
        Commands::Project { active, hover, offset, week } => {
            commands::project::run(&ctx, &active, &hover, offset, week).await
        }
        Commands::Drag { active, hover, offset, week, dry_run } => {
            let args = DragArgs { active, hover, offset, week, dry_run };
            commands::drag::run(&ctx, args).await
        }
        Commands::Table { action, args, week } => commands::table::run(&ctx, &action, &args, week).await,
        Commands::Config { key, value } => commands::config::run(&ctx, key.as_deref(), value.as_deref()),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
