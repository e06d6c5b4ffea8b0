//! Plan-driven adventure turns.
//!
//! An [`Adventure`] replays a solved plan one step per turn. Before a turn
//! the oracle can offer the player a menu: the planned action plus invented
//! alternatives. Whatever the player picks, the turn applies the plan step to
//! the current facts and the pick only colours the narration. Each turn
//! stores the grown story, a problem whose initial state is the new fact set
//! and the plan that is left, so a later session resumes where this one
//! stopped and a repair plans from where the story stands.

use crate::EffectSimulator;
use crate::controller::store_story;
use derive_getters::Getters;
use questmaster_core::{Domain, FactDelta, FactSet, PlanStep, PlanTrace, Problem};
use questmaster_error::QuestResult;
use questmaster_interface::Oracle;
use questmaster_narrative::{extract_options, parse_story, prompts, strip_code_fences};
use questmaster_storage::{ArtifactKind, ArtifactStore};

/// What happened on one turn.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct TurnReport {
    /// The plan step played
    step: PlanStep,
    /// The option the player picked, or the step itself
    choice: String,
    /// Facts it added and removed
    delta: FactDelta,
    /// Narration of the step
    narration: String,
    /// Steps left after this one
    remaining: usize,
}

/// Result of [`Adventure::take_turn`] and [`Adventure::take_chosen_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A step was played and more remain
    Advanced(TurnReport),
    /// The final step was played
    Won(TurnReport),
    /// There is no step to play
    Lost,
}

/// A running adventure over one session's latest model and plan.
pub struct Adventure<'a> {
    oracle: &'a dyn Oracle,
    store: &'a dyn ArtifactStore,
    domain: Domain,
    problem: Problem,
    plan: Option<PlanTrace>,
    facts: FactSet,
    story: String,
    turns: u32,
}

impl std::fmt::Debug for Adventure<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adventure")
            .field("domain", self.domain.name())
            .field("problem", self.problem.name())
            .field("remaining", &self.remaining())
            .field("facts", &self.facts.len())
            .field("turns", &self.turns)
            .finish()
    }
}

impl<'a> Adventure<'a> {
    /// Loads the latest story, domain, problem and plan from `store`.
    ///
    /// Returns `Ok(None)` when the story, domain or problem is missing. A
    /// missing or unreadable plan is not an error: the adventure starts and
    /// the first turn reports [`TurnOutcome::Lost`].
    ///
    /// # Errors
    ///
    /// Returns error if the store fails or the stored model does not
    /// validate.
    #[tracing::instrument(skip(oracle, store))]
    pub async fn load(
        oracle: &'a dyn Oracle,
        store: &'a dyn ArtifactStore,
    ) -> QuestResult<Option<Self>> {
        let story = store.latest(ArtifactKind::Story).await?;
        let domain = store.latest(ArtifactKind::Domain).await?;
        let problem = store.latest(ArtifactKind::Problem).await?;
        let (Some(story), Some(domain), Some(problem)) = (story, domain, problem) else {
            tracing::warn!("Session has no story or model to play");
            return Ok(None);
        };

        let domain = Domain::from_pddl(&domain)?;
        let problem = Problem::from_pddl(&problem, &domain)?;

        let plan = match store.latest(ArtifactKind::Plan).await? {
            Some(text) => match PlanTrace::parse(&text) {
                Ok(plan) => Some(plan),
                Err(e) => {
                    tracing::warn!(error = %e.kind, "Stored plan does not parse");
                    None
                }
            },
            None => None,
        };

        let facts = problem.initial_facts();
        tracing::info!(
            domain = %domain.name(),
            facts = facts.len(),
            steps = ?plan.as_ref().map(PlanTrace::len),
            "Adventure loaded"
        );

        Ok(Some(Self {
            oracle,
            store,
            domain,
            problem,
            plan,
            facts,
            story,
            turns: 0,
        }))
    }

    /// Current facts.
    pub fn facts(&self) -> &FactSet {
        &self.facts
    }

    /// Story so far.
    pub fn story(&self) -> &str {
        &self.story
    }

    /// Steps not yet played.
    pub fn remaining(&self) -> usize {
        self.plan.as_ref().map_or(0, PlanTrace::len)
    }

    /// Turns played.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Numbered options for the next turn, without their numbers.
    ///
    /// The first option is the planned action; the rest are alternatives the
    /// oracle invents. Empty when no plan step is left. A reply without a
    /// numbered list falls back to the bare plan step.
    ///
    /// # Errors
    ///
    /// Returns error if the oracle fails.
    #[tracing::instrument(skip(self), fields(turn = self.turns + 1))]
    pub async fn options(&self) -> QuestResult<Vec<String>> {
        let Some(step) = self.plan.as_ref().and_then(PlanTrace::peek) else {
            return Ok(Vec::new());
        };

        let request = prompts::turn_options(
            &self.domain.render(),
            &self.facts.to_string(),
            &step.to_string(),
        );
        let options = extract_options(&self.oracle.generate(&request).await?);
        if options.is_empty() {
            tracing::warn!(action = %step, "Oracle offered no numbered options");
            return Ok(vec![step.to_string()]);
        }
        tracing::debug!(count = options.len(), "Turn options offered");
        Ok(options)
    }

    /// Plays the next plan step as the planned action.
    ///
    /// # Errors
    ///
    /// Returns error if the step does not bind to its action, the oracle
    /// fails, or the store cannot be written.
    pub async fn take_turn(&mut self) -> QuestResult<TurnOutcome> {
        self.play(None).await
    }

    /// Plays the next plan step, narrating it through the player's `choice`.
    ///
    /// # Errors
    ///
    /// Same as [`Adventure::take_turn`].
    pub async fn take_chosen_turn(&mut self, choice: &str) -> QuestResult<TurnOutcome> {
        self.play(Some(choice)).await
    }

    #[tracing::instrument(skip(self), fields(turn = self.turns + 1, remaining = self.remaining()))]
    async fn play(&mut self, choice: Option<&str>) -> QuestResult<TurnOutcome> {
        let Some(step) = self.plan.as_mut().and_then(PlanTrace::next_step) else {
            tracing::info!("No plan step left to play");
            return Ok(TurnOutcome::Lost);
        };
        let choice = choice.map_or_else(|| step.to_string(), str::to_string);

        let simulator = EffectSimulator::new(&self.domain).with_problem(&self.problem);
        let next = simulator.apply_step(&step, &self.facts)?;
        let delta = self.facts.diff(&next);

        let request = prompts::continuation(
            &self.story,
            &step.to_string(),
            &choice,
            &describe_delta(&delta),
            self.next_section(),
        );
        let narration = strip_code_fences(&self.oracle.generate(&request).await?);

        self.story = format!("{}\n\n{}", self.story.trim_end(), narration.trim());
        self.facts = next;
        self.turns += 1;

        store_story(self.store, &self.story).await?;
        let updated = self.problem.with_init(&self.facts)?;
        self.store
            .put(ArtifactKind::Problem, &updated.render())
            .await?;
        self.problem = updated;
        if let Some(plan) = &self.plan {
            self.store.put(ArtifactKind::Plan, &plan.render()).await?;
        }

        let report = TurnReport {
            step,
            choice,
            delta,
            narration,
            remaining: self.remaining(),
        };
        tracing::info!(
            action = %report.step,
            choice = %report.choice,
            added = report.delta.added.len(),
            removed = report.delta.removed.len(),
            remaining = report.remaining,
            "Turn played"
        );

        if report.remaining == 0 {
            Ok(TurnOutcome::Won(report))
        } else {
            Ok(TurnOutcome::Advanced(report))
        }
    }

    fn next_section(&self) -> u32 {
        parse_story(&self.story)
            .ok()
            .and_then(|graph| graph.nodes().map(|node| *node.id()).max())
            .map_or(self.turns + 1, |max| max + 1)
    }
}

fn describe_delta(delta: &FactDelta) -> String {
    if delta.is_empty() {
        return "none".to_string();
    }
    delta
        .added
        .iter()
        .map(|fact| format!("+ {}", fact))
        .chain(delta.removed.iter().map(|fact| format!("- {}", fact)))
        .collect::<Vec<_>>()
        .join("\n")
}
