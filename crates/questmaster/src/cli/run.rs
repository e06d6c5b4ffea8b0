//! Reflection loop command handlers.

use super::{open_store, read_text};
use questmaster::{
    ArtifactKind, ArtifactStore, ConsoleApproval, FailureReason, FileSystemStore, LoopOutcome,
    OpenAiOracle, QuestConfig, QuestResult, ReflectionController, StartMode, store_story,
};
use std::path::Path;
use tracing::instrument;

/// Stores the given inputs and runs the loop from lore or from a story.
#[instrument(skip(config), fields(session = %config.store.session))]
pub async fn run_quest(
    config: &QuestConfig,
    lore: Option<&Path>,
    story: Option<&Path>,
    skip_story: bool,
) -> QuestResult<LoopOutcome> {
    let store = open_store(config).await?;

    if let Some(path) = lore {
        let record = store.put(ArtifactKind::Lore, &read_text(path).await?).await?;
        tracing::info!(version = *record.version(), "Stored lore");
    }
    if let Some(path) = story {
        store_story(&store, &read_text(path).await?).await?;
        tracing::info!("Stored story");
    }

    let mode = if story.is_some() || skip_story || config.reflection.skip_story_generation {
        StartMode::FromStory
    } else {
        StartMode::FromLore
    };
    run_loop(config, &store, mode).await
}

/// Runs the loop from the session's last planner failure.
#[instrument(skip(config), fields(session = %config.store.session))]
pub async fn repair_quest(config: &QuestConfig) -> QuestResult<LoopOutcome> {
    let store = open_store(config).await?;
    run_loop(config, &store, StartMode::Repair).await
}

async fn run_loop(
    config: &QuestConfig,
    store: &FileSystemStore,
    mode: StartMode,
) -> QuestResult<LoopOutcome> {
    let oracle = OpenAiOracle::new(config.oracle.to_openai()?)?;
    let planner = config.planner.to_fast_downward(store.workspace())?;
    let approval = ConsoleApproval::stdin();

    let outcome = ReflectionController::new(&oracle, &planner, &approval, store)
        .with_config(config.reflection.to_loop_config()?)
        .run(mode)
        .await?;
    report(&outcome, store);
    Ok(outcome)
}

fn report(outcome: &LoopOutcome, store: &FileSystemStore) {
    let path: Vec<String> = outcome.trace().iter().map(ToString::to_string).collect();
    println!("Loop: {}", path.join(" -> "));
    println!(
        "Planner calls: {}, model repairs: {}, narrative repairs: {}",
        outcome.planner_calls(),
        outcome.model_repairs(),
        outcome.narrative_repairs()
    );

    if let Some(plan) = outcome.plan() {
        println!("\nPlan ({} steps):", plan.len());
        for step in plan.steps() {
            println!("  {}", step);
        }
        println!("\nArtifacts: {}", store.session_dir().display());
    }

    if let Some(FailureReason::Validation { raw, .. }) = outcome.failure() {
        eprintln!("\nOffending output:\n{}", raw);
    }
}
