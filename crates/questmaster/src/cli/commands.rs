//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QuestMaster - planner-checked interactive fiction
#[derive(Parser, Debug)]
#[command(name = "questmaster")]
#[command(about = "Generate interactive fiction whose quests a classical planner can solve", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session name, overriding `store.session`
    #[arg(long, global = true)]
    pub session: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draft a story and its model, then plan and repair until the quest is solvable
    Run {
        /// Lore file to store before starting
        #[arg(long)]
        lore: Option<PathBuf>,

        /// Story file to store and start from, skipping story generation
        #[arg(long, conflicts_with = "lore")]
        story: Option<PathBuf>,

        /// Start from the session's latest story
        #[arg(long)]
        skip_story: bool,
    },

    /// Reflect on the session's last planner failure and repair from there
    Repair,

    /// Parse a story file and print its graph export
    Graph {
        /// Story file in numbered-section format
        story: PathBuf,

        /// Write the export here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Serve the session's story graph over HTTP
    Serve {
        /// Interface to bind, overriding `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Play the solved quest one plan step per turn
    Play {
        /// Play the planned action every turn without offering options
        #[arg(long)]
        auto: bool,
    },
}
