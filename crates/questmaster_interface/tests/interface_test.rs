use async_trait::async_trait;
use questmaster_error::QuestResult;
use questmaster_interface::{
    ApprovalGate, NarrativeProposal, Oracle, OracleRequest, PlannerOutcome, Role,
};

struct EchoOracle;

#[async_trait]
impl Oracle for EchoOracle {
    async fn generate(&self, req: &OracleRequest) -> QuestResult<String> {
        Ok(req.user_text().unwrap_or_default().to_uppercase())
    }

    fn provider_name(&self) -> &'static str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo-1"
    }
}

struct AlwaysNo;

#[async_trait]
impl ApprovalGate for AlwaysNo {
    async fn approve(&self, _proposal: &NarrativeProposal) -> QuestResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_oracle_trait_object_generates() {
    let oracle: Box<dyn Oracle> = Box::new(EchoOracle);
    let reply = oracle
        .generate(&OracleRequest::new("system", "hello"))
        .await
        .unwrap();
    assert_eq!(reply, "HELLO");
    assert_eq!(oracle.provider_name(), "echo");
}

#[tokio::test]
async fn test_approval_gate_trait_object() {
    let gate: &dyn ApprovalGate = &AlwaysNo;
    let proposal = NarrativeProposal::new("story", "add a bridge", "search exhausted");
    assert!(!gate.approve(&proposal).await.unwrap());
    assert_eq!(proposal.suggestion(), "add a bridge");
}

#[test]
fn test_role_serializes_lowercase() {
    let json = serde_json::to_string(&Role::Assistant).unwrap();
    assert_eq!(json, "\"assistant\"");
    assert_eq!(Role::System.to_string(), "system");
}

#[test]
fn test_planner_outcome_constructors() {
    let ok = PlannerOutcome::solved("(move a b)\n", "Solution found!");
    assert!(ok.is_solved());
    assert_eq!(ok.plan().as_deref(), Some("(move a b)\n"));
    assert_eq!(ok.exit_code(), &Some(0));

    let failed = PlannerOutcome::failed("Search stopped without finding a solution.", Some(12));
    assert!(!failed.is_solved());
    assert!(failed.plan().is_none());
    assert_eq!(failed.exit_code(), &Some(12));
}
