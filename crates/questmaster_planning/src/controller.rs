//! Planning-feedback reflection loop.
//!
//! The controller drives a story from lore to a solvable formal model:
//!
//! ```text
//! Start → GenerateNarrative → DeriveDomain → DeriveProblem → InvokePlanner → Done
//!                                  ↑                             ↓
//!                           RepairNarrative ← Reflect → RepairModel
//!                                                ↓
//!                                             Failed
//! ```
//!
//! Every artifact it produces goes to the [`ArtifactStore`] as a new version.
//! Oracle output is validated before anything downstream trusts it.

use crate::{FailureClass, FailureClassifier};
use derive_getters::Getters;
use questmaster_core::{Domain, PlanTrace, Problem};
use questmaster_error::{BuilderError, ModelError, QuestResult};
use questmaster_interface::{ApprovalGate, NarrativeProposal, Oracle, OracleRequest, Planner};
use questmaster_narrative::{
    export_graph, extract_json, extract_pddl, parse_story, prompts, strip_code_fences,
};
use questmaster_storage::{ArtifactKind, ArtifactStore};
use serde::{Deserialize, Serialize};

/// Where a run enters the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StartMode {
    /// Generate the story from the stored lore
    #[default]
    FromLore,
    /// Reuse the latest stored story
    FromStory,
    /// Reflect on the latest stored planner log
    Repair,
}

/// Why the loop gave up.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FailureReason {
    /// The human rejected a narrative change
    #[display("narrative proposal rejected")]
    Rejected,
    /// The repair budget for this failure class ran out
    #[display("repair budget exhausted after {} failure", _0)]
    RetriesExhausted(FailureClass),
    /// An artifact needed to continue is not in the store
    #[display("no plan available: no {} in the store", _0)]
    NoPlanAvailable(ArtifactKind),
    /// Oracle output failed validation
    #[display("invalid {}: {}", stage, message)]
    Validation {
        /// Artifact being produced
        stage: ArtifactKind,
        /// What was wrong with it
        message: String,
        /// The offending oracle output
        raw: String,
    },
}

/// Controller states.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum LoopState {
    /// Entry
    #[display("start")]
    Start,
    /// Story from lore
    #[display("generate-narrative")]
    GenerateNarrative,
    /// Domain from story
    #[display("derive-domain")]
    DeriveDomain,
    /// Problem from lore, story and domain
    #[display("derive-problem")]
    DeriveProblem,
    /// Planner run on the latest model pair
    #[display("invoke-planner")]
    InvokePlanner,
    /// Failure classification
    #[display("reflect")]
    Reflect,
    /// Human-approved story change
    #[display("repair-narrative")]
    RepairNarrative,
    /// Automatic domain and problem repair
    #[display("repair-model")]
    RepairModel,
    /// A plan was found
    #[display("done")]
    Done,
    /// The loop gave up
    #[display("failed ({})", _0)]
    Failed(FailureReason),
}

impl LoopState {
    /// Whether no transition leaves this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done | LoopState::Failed(_))
    }
}

/// Repair budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(build_fn(private, name = "build_internal"))]
pub struct LoopConfig {
    /// Model repairs allowed before giving up
    #[builder(default = "3")]
    max_model_repairs: u32,
    /// Approved narrative rewrites allowed before giving up
    #[builder(default = "2")]
    max_narrative_repairs: u32,
}

impl LoopConfigBuilder {
    /// Build the loop configuration.
    ///
    /// # Errors
    ///
    /// Never fails in practice; every field has a default.
    pub fn build(&self) -> Result<LoopConfig, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_model_repairs: 3,
            max_narrative_repairs: 2,
        }
    }
}

/// What a finished run looks like.
#[derive(Debug, Clone, Getters)]
pub struct LoopOutcome {
    /// Terminal state
    state: LoopState,
    /// Every state entered, in order, including the terminal one
    trace: Vec<LoopState>,
    /// Planner invocations
    planner_calls: u32,
    /// Model repairs performed
    model_repairs: u32,
    /// Narrative rewrites performed
    narrative_repairs: u32,
    /// Class of the most recent planner failure
    last_failure: Option<FailureClass>,
    /// The plan, when the run reached `Done`
    plan: Option<PlanTrace>,
}

impl LoopOutcome {
    /// Whether a plan was found.
    pub fn is_done(&self) -> bool {
        self.state == LoopState::Done
    }

    /// Why the run failed, if it did.
    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.state {
            LoopState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct RunState {
    trace: Vec<LoopState>,
    planner_calls: u32,
    model_repairs: u32,
    narrative_repairs: u32,
    domain: Option<Domain>,
    log: String,
    exit_code: Option<i32>,
    last_failure: Option<FailureClass>,
    plan: Option<PlanTrace>,
}

/// Drives the reflection loop against its collaborators.
pub struct ReflectionController<'a> {
    oracle: &'a dyn Oracle,
    planner: &'a dyn Planner,
    approval: &'a dyn ApprovalGate,
    store: &'a dyn ArtifactStore,
    classifier: FailureClassifier,
    config: LoopConfig,
}

impl<'a> ReflectionController<'a> {
    /// Controller with the default classifier and repair budgets.
    pub fn new(
        oracle: &'a dyn Oracle,
        planner: &'a dyn Planner,
        approval: &'a dyn ApprovalGate,
        store: &'a dyn ArtifactStore,
    ) -> Self {
        Self {
            oracle,
            planner,
            approval,
            store,
            classifier: FailureClassifier::default(),
            config: LoopConfig::default(),
        }
    }

    /// Replaces the repair budgets.
    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the failure classifier.
    pub fn with_classifier(mut self, classifier: FailureClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Runs the loop until it reaches `Done` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns error only when a collaborator fails outright: the oracle is
    /// unreachable, the planner cannot be started, the store cannot be
    /// written, or the approval prompt breaks. Everything else ends in a
    /// terminal [`LoopState`].
    #[tracing::instrument(
        skip(self),
        fields(
            oracle = %self.oracle.model_name(),
            planner = %self.planner.name(),
            max_model_repairs = self.config.max_model_repairs,
            max_narrative_repairs = self.config.max_narrative_repairs
        )
    )]
    pub async fn run(&self, mode: StartMode) -> QuestResult<LoopOutcome> {
        let mut run = RunState::default();
        let mut state = LoopState::Start;

        loop {
            run.trace.push(state.clone());
            if state.is_terminal() {
                break;
            }

            let next = match &state {
                LoopState::Start => self.start(mode, &mut run).await?,
                LoopState::GenerateNarrative => self.generate_narrative().await?,
                LoopState::DeriveDomain => self.derive_domain(&mut run).await?,
                LoopState::DeriveProblem => self.derive_problem(&mut run).await?,
                LoopState::InvokePlanner => self.invoke_planner(&mut run).await?,
                LoopState::Reflect => self.reflect(&mut run),
                LoopState::RepairNarrative => self.repair_narrative(&mut run).await?,
                LoopState::RepairModel => self.repair_model(&mut run).await?,
                LoopState::Done | LoopState::Failed(_) => break,
            };

            tracing::debug!(from = %state, to = %next, "Transition");
            state = next;
        }

        match &state {
            LoopState::Done => tracing::info!(planner_calls = run.planner_calls, "Plan found"),
            LoopState::Failed(reason) => tracing::warn!(
                reason = %reason,
                planner_calls = run.planner_calls,
                "Reflection loop failed"
            ),
            _ => {}
        }

        Ok(LoopOutcome {
            state,
            trace: run.trace,
            planner_calls: run.planner_calls,
            model_repairs: run.model_repairs,
            narrative_repairs: run.narrative_repairs,
            last_failure: run.last_failure,
            plan: run.plan,
        })
    }

    async fn start(&self, mode: StartMode, run: &mut RunState) -> QuestResult<LoopState> {
        tracing::info!(mode = %mode, "Starting reflection loop");
        Ok(match mode {
            StartMode::FromLore => LoopState::GenerateNarrative,
            StartMode::FromStory => LoopState::DeriveDomain,
            StartMode::Repair => {
                run.log = self
                    .store
                    .latest(ArtifactKind::PlannerLog)
                    .await?
                    .unwrap_or_default();
                LoopState::Reflect
            }
        })
    }

    async fn ask(&self, request: &OracleRequest) -> QuestResult<String> {
        self.oracle.generate(request).await
    }

    async fn generate_narrative(&self) -> QuestResult<LoopState> {
        let Some(lore) = self.store.latest(ArtifactKind::Lore).await? else {
            return Ok(missing(ArtifactKind::Lore));
        };

        let raw = self.ask(&prompts::story(&lore)).await?;
        let story = strip_code_fences(&raw);
        if story.trim().is_empty() {
            return Ok(invalid(ArtifactKind::Story, "empty story", raw));
        }

        store_story(self.store, &story).await?;
        Ok(LoopState::DeriveDomain)
    }

    async fn derive_domain(&self, run: &mut RunState) -> QuestResult<LoopState> {
        let Some(story) = self.store.latest(ArtifactKind::Story).await? else {
            return Ok(missing(ArtifactKind::Story));
        };

        let raw = self.ask(&prompts::domain(&story)).await?;
        self.store.put(ArtifactKind::DomainJson, &raw).await?;

        let domain = match extract_json(&raw).and_then(|json| Domain::from_json(&json)) {
            Ok(domain) => domain,
            Err(e) => return Ok(invalid_model(ArtifactKind::Domain, &e, raw)),
        };

        self.store.put(ArtifactKind::Domain, &domain.render()).await?;
        tracing::info!(
            domain = %domain.name(),
            actions = domain.actions().len(),
            predicates = domain.predicates().len(),
            "Derived domain"
        );
        run.domain = Some(domain);
        Ok(LoopState::DeriveProblem)
    }

    async fn derive_problem(&self, run: &mut RunState) -> QuestResult<LoopState> {
        let domain = match run.domain.take() {
            Some(domain) => domain,
            None => match self.store.latest(ArtifactKind::Domain).await? {
                Some(text) => match Domain::from_pddl(&text) {
                    Ok(domain) => domain,
                    Err(e) => return Ok(invalid_model(ArtifactKind::Domain, &e, text)),
                },
                None => return Ok(missing(ArtifactKind::Domain)),
            },
        };
        let Some(story) = self.store.latest(ArtifactKind::Story).await? else {
            return Ok(missing(ArtifactKind::Story));
        };
        let lore = self
            .store
            .latest(ArtifactKind::Lore)
            .await?
            .unwrap_or_default();

        let request = prompts::problem(&lore, &story, domain.name(), &domain.render());
        let raw = self.ask(&request).await?;
        self.store.put(ArtifactKind::ProblemJson, &raw).await?;

        let problem = match extract_json(&raw).and_then(|json| Problem::from_json(&json, &domain)) {
            Ok(problem) => problem,
            Err(e) => return Ok(invalid_model(ArtifactKind::Problem, &e, raw)),
        };

        self.store.put(ArtifactKind::Problem, &problem.render()).await?;
        tracing::info!(
            problem = %problem.name(),
            objects = problem.objects().len(),
            init = problem.init().len(),
            "Derived problem"
        );
        run.domain = Some(domain);
        Ok(LoopState::InvokePlanner)
    }

    async fn invoke_planner(&self, run: &mut RunState) -> QuestResult<LoopState> {
        let Some(domain) = self.store.history(ArtifactKind::Domain).await?.pop() else {
            return Ok(missing(ArtifactKind::Domain));
        };
        let Some(problem) = self.store.history(ArtifactKind::Problem).await?.pop() else {
            return Ok(missing(ArtifactKind::Problem));
        };

        run.planner_calls += 1;
        tracing::info!(
            call = run.planner_calls,
            domain_version = domain.version(),
            problem_version = problem.version(),
            "Invoking planner"
        );

        let outcome = self
            .planner
            .solve(&self.store.path_of(&domain), &self.store.path_of(&problem))
            .await?;
        self.store.put(ArtifactKind::PlannerLog, outcome.log()).await?;

        if !outcome.is_solved() {
            run.log = outcome.log().clone();
            run.exit_code = *outcome.exit_code();
            return Ok(LoopState::Reflect);
        }

        let text = outcome.plan().clone().unwrap_or_default();
        self.store.put(ArtifactKind::Plan, &text).await?;
        match PlanTrace::parse(&text) {
            Ok(plan) => {
                tracing::info!(steps = plan.len(), cost = ?plan.cost(), "Plan stored");
                run.plan = Some(plan);
                Ok(LoopState::Done)
            }
            Err(e) => Ok(invalid(ArtifactKind::Plan, e.kind.to_string(), text)),
        }
    }

    fn reflect(&self, run: &mut RunState) -> LoopState {
        let class = self.classifier.classify(&run.log, run.exit_code);
        run.last_failure = Some(class);

        let (used, budget, next) = if class.needs_narrative_repair() {
            (
                run.narrative_repairs,
                self.config.max_narrative_repairs,
                LoopState::RepairNarrative,
            )
        } else {
            (
                run.model_repairs,
                self.config.max_model_repairs,
                LoopState::RepairModel,
            )
        };

        tracing::info!(class = %class, used, budget, "Reflecting on planner failure");
        if used >= budget {
            LoopState::Failed(FailureReason::RetriesExhausted(class))
        } else {
            next
        }
    }

    async fn repair_narrative(&self, run: &mut RunState) -> QuestResult<LoopState> {
        let Some((story, domain, problem)) = self.latest_triple().await? else {
            return missing_of_triple(self.store).await;
        };

        let raw = self
            .ask(&prompts::narrative_repair(&story, &domain, &problem, &run.log))
            .await?;
        let suggestion = strip_code_fences(&raw);
        self.store.put(ArtifactKind::Proposal, &suggestion).await?;

        let proposal = NarrativeProposal::new(story.clone(), suggestion.clone(), run.log.clone());
        if !self.approval.approve(&proposal).await? {
            tracing::info!("Narrative proposal rejected");
            return Ok(LoopState::Failed(FailureReason::Rejected));
        }

        run.narrative_repairs += 1;
        let raw = self
            .ask(&prompts::narrative_rewrite(&story, &suggestion))
            .await?;
        let rewritten = strip_code_fences(&raw);
        if rewritten.trim().is_empty() {
            return Ok(invalid(ArtifactKind::Story, "empty story", raw));
        }

        store_story(self.store, &rewritten).await?;
        run.domain = None;
        Ok(LoopState::DeriveDomain)
    }

    async fn repair_model(&self, run: &mut RunState) -> QuestResult<LoopState> {
        let Some((story, domain_text, problem_text)) = self.latest_triple().await? else {
            return missing_of_triple(self.store).await;
        };

        run.model_repairs += 1;
        tracing::info!(attempt = run.model_repairs, "Repairing formal model");

        let raw = self
            .ask(&prompts::domain_repair(&story, &domain_text, &run.log))
            .await?;
        let domain = match extract_pddl(&raw).and_then(|text| Domain::from_pddl(&text)) {
            Ok(domain) => domain,
            Err(e) => return Ok(invalid_model(ArtifactKind::Domain, &e, raw)),
        };
        let rendered = domain.render();

        let raw = self
            .ask(&prompts::problem_repair(&story, &rendered, &problem_text, &run.log))
            .await?;
        let problem = match extract_pddl(&raw).and_then(|text| Problem::from_pddl(&text, &domain)) {
            Ok(problem) => problem,
            Err(e) => return Ok(invalid_model(ArtifactKind::Problem, &e, raw)),
        };

        self.store.put(ArtifactKind::Domain, &rendered).await?;
        self.store.put(ArtifactKind::Problem, &problem.render()).await?;
        run.domain = Some(domain);
        Ok(LoopState::InvokePlanner)
    }

    async fn latest_triple(&self) -> QuestResult<Option<(String, String, String)>> {
        let story = self.store.latest(ArtifactKind::Story).await?;
        let domain = self.store.latest(ArtifactKind::Domain).await?;
        let problem = self.store.latest(ArtifactKind::Problem).await?;
        Ok(match (story, domain, problem) {
            (Some(s), Some(d), Some(p)) => Some((s, d, p)),
            _ => None,
        })
    }
}

/// Stores a story version and, when it parses, its graph export.
///
/// A story that does not parse as a graph is still stored; planning does
/// not depend on the graph.
///
/// # Errors
///
/// Returns error if the store cannot be written.
pub async fn store_story(store: &dyn ArtifactStore, story: &str) -> QuestResult<()> {
    store.put(ArtifactKind::Story, story).await?;
    match parse_story(story) {
        Ok(graph) => {
            let export = export_graph(&graph);
            store.put(ArtifactKind::Graph, &export.to_json_pretty()?).await?;
            tracing::debug!(
                nodes = graph.len(),
                dangling = graph.dangling_references().len(),
                "Stored story graph"
            );
        }
        Err(e) => tracing::warn!(error = %e.kind, "Story does not parse as a graph"),
    }
    Ok(())
}

async fn missing_of_triple(store: &dyn ArtifactStore) -> QuestResult<LoopState> {
    for kind in [ArtifactKind::Story, ArtifactKind::Domain, ArtifactKind::Problem] {
        if store.history(kind).await?.is_empty() {
            return Ok(missing(kind));
        }
    }
    Ok(missing(ArtifactKind::Story))
}

fn missing(kind: ArtifactKind) -> LoopState {
    tracing::warn!(kind = %kind, "Required artifact missing");
    LoopState::Failed(FailureReason::NoPlanAvailable(kind))
}

fn invalid(stage: ArtifactKind, message: impl Into<String>, raw: String) -> LoopState {
    let message = message.into();
    tracing::error!(stage = %stage, message = %message, "Oracle output failed validation");
    LoopState::Failed(FailureReason::Validation {
        stage,
        message,
        raw,
    })
}

fn invalid_model(stage: ArtifactKind, err: &ModelError, raw: String) -> LoopState {
    invalid(stage, err.kind().to_string(), raw)
}
