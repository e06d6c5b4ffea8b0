//! Planning for QuestMaster.
//!
//! - [`EffectSimulator`] applies grounded plan steps to fact sets
//! - [`FastDownward`] runs the external planner
//! - [`FailureClassifier`] sorts planner failures into repair targets
//! - [`ReflectionController`] drives story, model and planner to a plan
//! - [`Adventure`] plays a solved plan one narrated turn at a time

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod controller;
mod fast_downward;
mod session;
mod simulator;

pub use classifier::{ClassifierRule, FailureClass, FailureClassifier};
pub use controller::{
    FailureReason, LoopConfig, LoopConfigBuilder, LoopOutcome, LoopState, ReflectionController,
    StartMode, store_story,
};
pub use fast_downward::{
    DEFAULT_PLAN_FILE, DEFAULT_SEARCH, FastDownward, FastDownwardBuilder,
};
pub use session::{Adventure, TurnOutcome, TurnReport};
pub use simulator::{EffectSimulator, apply};
