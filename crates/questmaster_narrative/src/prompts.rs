//! Oracle prompt catalogue.
//!
//! Each function builds the request for one step of the reflection loop or
//! the adventure session. Templates use `{name}` placeholders filled by
//! [`fill`].

use questmaster_interface::OracleRequest;

const STORY_SYSTEM: &str = r#"You are a narrative designer for branching interactive fiction.

You receive a lore document describing the world, the quest, its initial
situation and goal, obstacles, a branching factor (minimum and maximum choices
per section) and depth limits (minimum and maximum steps to the goal).

Write the story as numbered sections. Each section is a state of the story:
describe what happens, then list the choices that leave it, one per line:

→ Trust the stranger [go to 6]
→ Sneak into the ruins [go to 7]

Rules:
- Number sections 1, 2, 3, ... at the start of a line. Section 1 is the start.
- Every choice ends with [go to N] where N is an existing section.
- Mark winning endings with ✅ and losing endings with ❌ in their text.
  Endings have no choices.
- Include at least one winning path and at least three losing endings reached
  from different depths.
- Write immersive prose; do not address the player directly.
"#;

const DOMAIN_SYSTEM: &str = r#"You are an expert PDDL domain modeler. Translate the story into a STRIPS
domain with typing.

Return ONLY one JSON object, no prose and no markdown:

{
  "domain_name": "kebab-case-name",
  "requirements": ["strips", "typing"],
  "types": ["type1", "subtype - type1"],
  "constants": [],
  "predicates": ["(predicate-name ?a - type1 ?b - type2)"],
  "actions": [
    {
      "name": "action-name",
      "parameters": ["?a - type1", "?b - type2"],
      "preconditions": ["(predicate-name ?a ?b)"],
      "effects": ["(other-predicate ?a)", "(not (predicate-name ?a ?b))"]
    }
  ]
}

Rules:
- Preconditions and effects are flat lists of literals; do not wrap them in (and ...).
- Every literal uses a declared predicate with the declared number of arguments.
- Every variable in an action is one of its parameters.
- Every state change adds the new fact and removes the old one with (not ...).
- Do not include objects, init or goal.
"#;

const PROBLEM_SYSTEM: &str = r#"You are an expert PDDL problem modeler. Given a lore document, a story and
a PDDL domain, write the planning problem for the story's starting state and
winning goal.

Return ONLY one JSON object, no prose and no markdown:

{
  "problem_name": "kebab-case-name",
  "domain_name": "{domain_name}",
  "objects": {"object-name": "type"},
  "init": ["(predicate obj1 obj2)"],
  "goal": ["(predicate obj1)"]
}

Rules:
- Every object used in init or goal is declared in objects (or is a domain constant).
- Facts are ground: no variables.
- Only use predicates declared in the domain, with their declared arity.
- The goal must be reachable from init with the domain's actions.

PDDL domain:
{domain}
"#;

const NARRATIVE_REPAIR_SYSTEM: &str = r#"You are a story doctor for planning-based interactive fiction. The planner
searched the whole state space of the story's formal model and found no way
to reach the goal.

Propose narrative-level changes that would make the goal reachable while
keeping the story's spirit: missing paths, items, allies, or relaxed
obstacles. Be concrete and short; list each change on its own line.
"#;

const NARRATIVE_REWRITE_SYSTEM: &str = r#"You are a narrative designer for branching interactive fiction. Apply the
approved changes to the story and return the complete revised story.

Keep the numbered-section format exactly: sections numbered at the start of a
line, choices as "→ label [go to N]", ✅ on winning endings and ❌ on losing
endings. Return only the story text.
"#;

const DOMAIN_REPAIR_SYSTEM: &str = r#"You are an expert in PDDL domain modeling. The planner failed on the domain
below. Using the planner log and the story, fix every error: syntax, missing
or misspelled predicates, wrong arity, undefined types, unbound variables.

Return ONLY the corrected PDDL domain text starting with (define, no prose and
no markdown. Preconditions and effects are (and ...) of literals.
"#;

const PROBLEM_REPAIR_SYSTEM: &str = r#"You are an expert in PDDL problem modeling. The planner failed on the
problem below. Using the corrected domain, the planner log and the story, fix
every error: undeclared objects, unknown predicates, wrong arity, variables
in facts, an unreachable goal.

Return ONLY the corrected PDDL problem text starting with (define, no prose
and no markdown.

Corrected domain:
{domain}
"#;

const TURN_OPTIONS_SYSTEM: &str = r#"You are the game master of an interactive adventure driven by a PDDL plan.
You receive the next action of a valid plan, which is the best move for the
player, the domain and the current facts.

Offer the player a numbered menu:
1. The planned action, told as a vivid story beat.
2. One or two invented alternatives that fit the world and the domain's types
   and predicates but are not part of the plan.

Rules:
- Do not reveal the rest of the plan.
- Describe actions in story language ("You pry the gate open"), never as
  PDDL ("(open-gate hero gate)").
- Number the options from 1, one per line, as "N. option".
- End with: Which action do you want to perform?

Domain:
{domain}

Current facts:
{facts}
"#;

const CONTINUATION_SYSTEM: &str = r#"You are the narrator of an interactive adventure driven by a plan. Continue
the story with the next plan action.

Write one new numbered section that follows the previous narrative and shows
the action happening, reflecting the listed state changes. Weave in the
player's chosen action: when it differs from the plan, tell it as an attempt
that the world steers back toward the planned action. Offer the player
two to four choices as "→ label [go to N]"; the first choice must be the
planned action. If the action completes the quest, mark the section ✅ and
give no choices.
"#;

/// Replaces `{key}` placeholders in `template`.
///
/// # Examples
///
/// ```
/// use questmaster_narrative::prompts::fill;
///
/// assert_eq!(fill("hello {name}", &[("name", "arin")]), "hello arin");
/// ```
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
}

/// Story generation from lore.
pub fn story(lore: &str) -> OracleRequest {
    OracleRequest::new(STORY_SYSTEM, format!("Lore document:\n\n{}", lore))
}

/// Domain derivation from the story.
pub fn domain(story: &str) -> OracleRequest {
    OracleRequest::new(DOMAIN_SYSTEM, format!("Story:\n\n{}", story))
}

/// Problem derivation from lore, story and the rendered domain.
pub fn problem(lore: &str, story: &str, domain_name: &str, domain_pddl: &str) -> OracleRequest {
    let system = fill(
        PROBLEM_SYSTEM,
        &[("domain_name", domain_name), ("domain", domain_pddl)],
    );
    OracleRequest::new(system, format!("Lore document:\n\n{}\n\nStory:\n\n{}", lore, story))
}

/// Narrative-level change proposal after an unsolvable model.
pub fn narrative_repair(story: &str, domain_pddl: &str, problem_pddl: &str, log: &str) -> OracleRequest {
    OracleRequest::new(
        NARRATIVE_REPAIR_SYSTEM,
        format!(
            "Story:\n\n{}\n\nDomain:\n\n{}\n\nProblem:\n\n{}\n\nPlanner log:\n\n{}",
            story, domain_pddl, problem_pddl, log
        ),
    )
}

/// Rewrite of the story applying an approved proposal.
pub fn narrative_rewrite(story: &str, proposal: &str) -> OracleRequest {
    OracleRequest::new(
        NARRATIVE_REWRITE_SYSTEM,
        format!("Approved changes:\n\n{}\n\nStory:\n\n{}", proposal, story),
    )
}

/// Domain repair from the planner log.
pub fn domain_repair(story: &str, domain_pddl: &str, log: &str) -> OracleRequest {
    OracleRequest::new(
        DOMAIN_REPAIR_SYSTEM,
        format!(
            "Domain:\n\n{}\n\nPlanner log:\n\n{}\n\nStory:\n\n{}",
            domain_pddl, log, story
        ),
    )
}

/// Problem repair against the repaired domain.
pub fn problem_repair(story: &str, domain_pddl: &str, problem_pddl: &str, log: &str) -> OracleRequest {
    let system = fill(PROBLEM_REPAIR_SYSTEM, &[("domain", domain_pddl)]);
    OracleRequest::new(
        system,
        format!(
            "Problem:\n\n{}\n\nPlanner log:\n\n{}\n\nStory:\n\n{}",
            problem_pddl, log, story
        ),
    )
}

/// Numbered menu for the next turn: the plan action plus invented alternatives.
pub fn turn_options(domain_pddl: &str, facts: &str, action: &str) -> OracleRequest {
    let system = fill(TURN_OPTIONS_SYSTEM, &[("domain", domain_pddl), ("facts", facts)]);
    OracleRequest::new(system, format!("Next action in the plan:\n{}", action))
}

/// Narrative continuation for one plan step and the player's chosen option.
pub fn continuation(
    story: &str,
    action: &str,
    choice: &str,
    effects: &str,
    next_section: u32,
) -> OracleRequest {
    OracleRequest::new(
        CONTINUATION_SYSTEM,
        format!(
            "Previous narrative:\n\n{}\n\nNext action in the plan:\n{}\n\nPlayer's chosen action:\n{}\n\nState changes:\n{}\n\nNumber the new section {}.",
            story, action, choice, effects, next_section
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_prompt_embeds_domain() {
        let req = problem("lore", "story", "cave", "(define (domain cave))");
        let system = &req.messages[0].content;
        assert!(system.contains("\"domain_name\": \"cave\""));
        assert!(system.contains("(define (domain cave))"));
        assert!(!system.contains("{domain}"));
    }

    #[test]
    fn test_turn_options_prompt_fills_state() {
        let req = turn_options("(define (domain cave))", "(at arin cave)", "(move arin cave forest)");
        let system = &req.messages[0].content;
        assert!(system.contains("(define (domain cave))"));
        assert!(system.contains("(at arin cave)"));
        assert!(!system.contains("{facts}"));
        assert_eq!(
            req.user_text(),
            Some("Next action in the plan:\n(move arin cave forest)")
        );
    }

    #[test]
    fn test_domain_prompt_keeps_json_braces() {
        let req = domain("1 Start");
        assert!(req.messages[0].content.contains("\"domain_name\""));
        assert_eq!(req.user_text(), Some("Story:\n\n1 Start"));
    }
}
