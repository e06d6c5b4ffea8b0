use questmaster_core::{Domain, Problem};
use questmaster_error::ModelErrorKind;

const CAVE_DOMAIN: &str = r#"{
    "domain_name": "cave-quest",
    "requirements": ["strips", ":typing"],
    "types": ["hero - agent", "agent", "location", "item"],
    "predicates": [
        "(at ?a - agent ?l - location)",
        "(item-at ?i - item ?l - location)",
        "(has ?a - agent ?i - item)",
        "(connected ?from - location ?to - location)"
    ],
    "actions": [
        {
            "name": "move",
            "parameters": ["?a - agent", "?from - location", "?to - location"],
            "preconditions": ["(at ?a ?from)", "(connected ?from ?to)"],
            "effects": ["(at ?a ?to)", "(not (at ?a ?from))"]
        },
        {
            "name": "pick-up",
            "parameters": ["?a - agent", "?i - item", "?l - location"],
            "preconditions": ["(at ?a ?l)", "(item-at ?i ?l)"],
            "effects": ["(has ?a ?i)", "(not (item-at ?i ?l))"]
        }
    ]
}"#;

fn cave_domain() -> Domain {
    Domain::from_json(CAVE_DOMAIN).expect("cave domain is valid")
}

fn kind_of(json: &str) -> ModelErrorKind {
    Domain::from_json(json).unwrap_err().kind().clone()
}

#[test]
fn test_domain_from_json_reads_all_sections() {
    let domain = cave_domain();

    assert_eq!(domain.name(), "cave-quest");
    assert_eq!(domain.requirements(), &vec!["strips".to_string(), "typing".to_string()]);
    assert_eq!(domain.types().len(), 4);
    assert_eq!(domain.types()[0].parent().as_deref(), Some("agent"));
    assert_eq!(domain.types()[1].parent(), &None);
    assert_eq!(domain.predicates().len(), 4);
    assert_eq!(domain.actions().len(), 2);

    let pick_up = domain.action("pick_up").expect("separator style is ignored");
    let params: Vec<&str> = pick_up.parameters().iter().map(|p| p.name().as_str()).collect();
    assert_eq!(params, vec!["a", "i", "l"]);
    assert!(pick_up.effects()[1].negated());
}

#[test]
fn test_subtype_walks_parent_chain() {
    let domain = cave_domain();

    assert!(domain.is_subtype("hero", "agent"));
    assert!(domain.is_subtype("hero", "object"));
    assert!(domain.is_subtype("location", "location"));
    assert!(!domain.is_subtype("agent", "hero"));
    assert!(!domain.is_subtype("item", "location"));
}

#[test]
fn test_missing_domain_name_is_reported() {
    let kind = kind_of(r#"{"requirements": [], "predicates": [], "actions": []}"#);
    assert_eq!(kind, ModelErrorKind::MissingField("domain_name".to_string()));
}

#[test]
fn test_malformed_json_is_reported() {
    assert!(matches!(kind_of("{ not json"), ModelErrorKind::MalformedJson(_)));
}

#[test]
fn test_undeclared_predicate_names_field() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(at ?x - thing)"],
        "actions": [{
            "name": "vanish",
            "parameters": ["?x - thing"],
            "preconditions": ["(at ?x)"],
            "effects": ["(gone ?x)"]
        }]
    }"#;

    match kind_of(json) {
        ModelErrorKind::UndeclaredPredicate { field, predicate } => {
            assert_eq!(field, "actions[0].effects[0]");
            assert_eq!(predicate, "gone");
        }
        other => panic!("Expected UndeclaredPredicate, got {:?}", other),
    }
}

#[test]
fn test_unbound_variable_is_rejected() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(at ?x - thing ?l - place)"],
        "actions": [{
            "name": "teleport",
            "parameters": ["?x - thing"],
            "preconditions": [],
            "effects": ["(at ?x ?somewhere)"]
        }]
    }"#;

    match kind_of(json) {
        ModelErrorKind::UnboundVariable { field, variable } => {
            assert_eq!(field, "actions[0].effects[0]");
            assert_eq!(variable, "?somewhere");
        }
        other => panic!("Expected UnboundVariable, got {:?}", other),
    }
}

#[test]
fn test_wrong_arity_is_rejected() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(at ?x - thing ?l - place)"],
        "actions": [{
            "name": "drop",
            "parameters": ["?x - thing"],
            "preconditions": ["(at ?x)"],
            "effects": []
        }]
    }"#;

    assert!(matches!(
        kind_of(json),
        ModelErrorKind::PredicateArity { found: 1, .. }
    ));
}

#[test]
fn test_duplicate_predicate_signature_is_rejected() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(open ?d - door)", "(open ?x - chest)"],
        "actions": []
    }"#;

    assert_eq!(
        kind_of(json),
        ModelErrorKind::DuplicatePredicate {
            name: "open".to_string(),
            arity: 1
        }
    );
}

#[test]
fn test_same_name_different_arity_is_allowed() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(open ?d - door)", "(open ?d - door ?k - key)"],
        "actions": []
    }"#;

    assert!(Domain::from_json(json).is_ok());
}

#[test]
fn test_duplicate_action_is_rejected() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(ready)"],
        "actions": [
            {"name": "wait", "parameters": [], "preconditions": [], "effects": ["(ready)"]},
            {"name": "WAIT", "parameters": [], "preconditions": [], "effects": ["(ready)"]}
        ]
    }"#;

    assert_eq!(kind_of(json), ModelErrorKind::DuplicateAction("wait".to_string()));
}

#[test]
fn test_equality_predicate_needs_no_declaration() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(at ?x - thing ?l - place)"],
        "actions": [{
            "name": "move",
            "parameters": ["?x - thing", "?a - place", "?b - place"],
            "preconditions": ["(at ?x ?a)", "(not (= ?a ?b))"],
            "effects": ["(at ?x ?b)", "(not (at ?x ?a))"]
        }]
    }"#;

    assert!(Domain::from_json(json).is_ok());
}

#[test]
fn test_disjunction_is_unsupported() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(lit)", "(dark)"],
        "actions": [{
            "name": "look",
            "parameters": [],
            "preconditions": ["(or (lit) (dark))"],
            "effects": []
        }]
    }"#;

    assert!(matches!(
        kind_of(json),
        ModelErrorKind::UnsupportedExpression { .. }
    ));
}

#[test]
fn test_flat_and_group_is_flattened() {
    let json = r#"{
        "domain_name": "d",
        "predicates": ["(lit)", "(warm)"],
        "actions": [{
            "name": "light-fire",
            "parameters": [],
            "preconditions": [],
            "effects": ["(and (lit) (warm))"]
        }]
    }"#;

    let domain = Domain::from_json(json).unwrap();
    assert_eq!(domain.actions()[0].effects().len(), 2);
}

const CAVE_PROBLEM: &str = r#"{
    "problem_name": "find-the-sword",
    "domain_name": "cave-quest",
    "objects": {"arin": "hero", "cave": "location", "forest": "location", "sword": "item"},
    "init": ["(at arin cave)", "(connected cave forest)", "(item-at sword forest)"],
    "goal": ["(has arin sword)"]
}"#;

#[test]
fn test_problem_from_json_keeps_object_order() {
    let domain = cave_domain();
    let problem = Problem::from_json(CAVE_PROBLEM, &domain).unwrap();

    let names: Vec<&str> = problem.objects().iter().map(|o| o.name().as_str()).collect();
    assert_eq!(names, vec!["arin", "cave", "forest", "sword"]);
    assert_eq!(problem.object_type("sword"), Some("item"));
    assert_eq!(problem.init().len(), 3);
    assert_eq!(problem.initial_facts().len(), 3);
}

#[test]
fn test_problem_without_domain_name_uses_domain() {
    let domain = cave_domain();
    let json = CAVE_PROBLEM.replace("\"domain_name\": \"cave-quest\",", "");
    let problem = Problem::from_json(&json, &domain).unwrap();

    assert_eq!(problem.domain_name(), "cave-quest");
    let pddl = problem.render();
    assert!(pddl.contains("(:domain cave-quest)"));
    assert!(!pddl.contains("(:domain )"));
    assert_eq!(Problem::from_pddl(&pddl, &domain).unwrap(), problem);
}

#[test]
fn test_problem_rejects_duplicate_objects() {
    let domain = cave_domain();
    let json = r#"{
        "problem_name": "p",
        "domain_name": "cave-quest",
        "objects": {"cave": "location", "cave": "location"},
        "init": [],
        "goal": ["(connected cave cave)"]
    }"#;

    let err = Problem::from_json(json, &domain).unwrap_err();
    assert_eq!(err.kind(), &ModelErrorKind::DuplicateObject("cave".to_string()));
}

#[test]
fn test_problem_rejects_undeclared_object() {
    let domain = cave_domain();
    let json = r#"{
        "problem_name": "p",
        "domain_name": "cave-quest",
        "objects": {"arin": "hero"},
        "init": ["(at arin nowhere)"],
        "goal": ["(at arin nowhere)"]
    }"#;

    match Problem::from_json(json, &domain).unwrap_err().kind() {
        ModelErrorKind::UndeclaredObject { field, object } => {
            assert_eq!(field, "init[0]");
            assert_eq!(object, "nowhere");
        }
        other => panic!("Expected UndeclaredObject, got {:?}", other),
    }
}

#[test]
fn test_problem_rejects_variables_in_facts() {
    let domain = cave_domain();
    let json = r#"{
        "problem_name": "p",
        "domain_name": "cave-quest",
        "objects": {"arin": "hero"},
        "init": [],
        "goal": ["(at arin ?where)"]
    }"#;

    assert!(matches!(
        Problem::from_json(json, &domain).unwrap_err().kind(),
        ModelErrorKind::NonGroundFact { .. }
    ));
}

#[test]
fn test_problem_accepts_domain_constants() {
    let json = r#"{
        "domain_name": "d",
        "types": ["place"],
        "constants": ["home - place"],
        "predicates": ["(at ?p - place)"],
        "actions": []
    }"#;
    let domain = Domain::from_json(json).unwrap();
    let problem = r#"{
        "problem_name": "p",
        "domain_name": "d",
        "objects": {},
        "init": [],
        "goal": ["(at home)"]
    }"#;

    assert!(Problem::from_json(problem, &domain).is_ok());
}

#[test]
fn test_problem_requires_goal_field() {
    let domain = cave_domain();
    let json = r#"{"problem_name": "p", "domain_name": "cave-quest", "objects": {}, "init": []}"#;

    assert_eq!(
        Problem::from_json(json, &domain).unwrap_err().kind(),
        &ModelErrorKind::MissingField("goal".to_string())
    );
}
