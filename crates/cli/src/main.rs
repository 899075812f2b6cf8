//! Thread reader CLI - reader command

use clap::{Parser, Subcommand};
use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

/// Thread reader - browse discussion threads and replay drawing logs
#[derive(Parser)]
#[command(name = "reader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Hacker News page as a thread
    Page {
        /// Route to open, e.g. /news, /newest?p=2 or /item?id=8863
        #[arg(default_value = "/")]
        path: String,
        /// Also resolve loaders that wait for a gesture (replies, next page)
        #[arg(long)]
        expand: bool,
        /// Deepest reply level to print (default: 8)
        #[arg(long, default_value = "8")]
        max_depth: usize,
        /// Indent every reply, even a lone one
        #[arg(long)]
        no_thread: bool,
        /// Loader rounds before printing (default: 3)
        #[arg(long, default_value = "3")]
        rounds: usize,
        /// Print headlines only
        #[arg(long)]
        no_bodies: bool,
    },
    /// Replay an animator project's action log
    Replay {
        /// Project directory containing config.json
        project: PathBuf,
        /// Audio duration in seconds; bounds the playhead
        #[arg(long)]
        duration: Option<f64>,
        /// Undo this many actions after loading
        #[arg(long, default_value = "0")]
        undo: usize,
        /// Move the playhead to this frame
        #[arg(long)]
        frame: Option<u32>,
        /// Write the log back to actions.json
        #[arg(long)]
        save: bool,
        /// Compare the cached state with a replay from scratch
        #[arg(long)]
        verify: bool,
    },
    /// View and edit settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all settings
    List,
    /// Print one setting
    Get {
        /// Dotted key, e.g. hackernews.page_size
        key: String,
    },
    /// Change one setting
    Set {
        key: String,
        value: String,
    },
    /// Show the settings file location
    Path {
        /// Write the example file if it does not exist
        #[arg(long)]
        create: bool,
    },
    /// Print a commented example settings file
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Page { path, expand, max_depth, no_thread, rounds, no_bodies } => {
            let options = cmd::page::PageOptions {
                expand,
                max_depth,
                thread_single_replies: !no_thread,
                rounds,
                bodies: !no_bodies,
            };
            cmd::page::run(&path, options).await
        }
        Commands::Replay { project, duration, undo, frame, save, verify } => {
            let options = cmd::replay::ReplayOptions { duration, undo, frame, save, verify };
            cmd::replay::run(&project, options).await
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
