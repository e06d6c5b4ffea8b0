//! Core data types for QuestMaster.
//!
//! This crate holds the formal planning model shared by every other crate:
//! PDDL domains and problems (parsed from oracle JSON or PDDL text, validated,
//! and rendered deterministically), ground fact sets, and plan traces.
//!
//! All identifiers are lower-cased on the way in. PDDL is case-insensitive and
//! the planner reports grounded actions in lower case, so keeping a single
//! case everywhere lets facts and plan steps be compared textually.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod domain;
mod facts;
mod identifier;
mod json;
mod literal;
mod pddl;
mod plan;
mod problem;
mod sexpr;

pub use domain::{Action, Domain, Parameter, PredicateSignature, TypeDecl, TypedName};
pub use facts::{FactDelta, FactSet};
pub use identifier::{identifiers_match, normalize_identifier};
pub use literal::Literal;
pub use pddl::{render_domain, render_problem};
pub use plan::{PlanStep, PlanTrace};
pub use problem::Problem;
pub use sexpr::SExpr;
