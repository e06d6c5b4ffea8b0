//! QuestMaster CLI binary.
//!
//! - Run the reflection loop from lore or a story
//! - Repair a session from its last planner failure
//! - Export and serve story graphs
//! - Play a solved quest

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, load_config, play, print_graph, repair_quest, run_quest, serve_graph,
    };

    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let outcome = match &cli.command {
        Commands::Graph { story, output } => {
            print_graph(story, output.as_deref()).await?;
            None
        }
        Commands::Run {
            lore,
            story,
            skip_story,
        } => {
            let config = load_config(&cli)?;
            Some(run_quest(&config, lore.as_deref(), story.as_deref(), *skip_story).await?)
        }
        Commands::Repair => {
            let config = load_config(&cli)?;
            Some(repair_quest(&config).await?)
        }
        Commands::Serve { host, port } => {
            let config = load_config(&cli)?;
            serve_graph(&config, host.clone(), *port).await?;
            None
        }
        Commands::Play { auto } => {
            let config = load_config(&cli)?;
            play(&config, *auto).await?;
            None
        }
    };

    if let Some(reason) = outcome.as_ref().and_then(|o| o.failure()) {
        return Err(format!("Quest failed: {}", reason).into());
    }
    Ok(())
}
