//! Tests for the console approval gate.

use questmaster::{ApprovalGate, ConsoleApproval, NarrativeProposal, is_affirmative};

fn proposal() -> NarrativeProposal {
    NarrativeProposal::new(
        "1 A locked door.",
        "Add a key in the hallway.",
        "Search stopped without finding a solution.",
    )
}

#[tokio::test]
async fn test_yes_approves() {
    let gate = ConsoleApproval::new(&b"yes\n"[..]);
    assert!(gate.approve(&proposal()).await.unwrap());
}

#[tokio::test]
async fn test_anything_else_rejects() {
    let gate = ConsoleApproval::new(&b"maybe later\n"[..]);
    assert!(!gate.approve(&proposal()).await.unwrap());
}

#[tokio::test]
async fn test_end_of_input_rejects() {
    let gate = ConsoleApproval::new(&b""[..]);
    assert!(!gate.approve(&proposal()).await.unwrap());
}

#[tokio::test]
async fn test_answers_are_read_one_line_at_a_time() {
    let gate = ConsoleApproval::new(&b"y\nn\n"[..]);
    assert!(gate.approve(&proposal()).await.unwrap());
    assert!(!gate.approve(&proposal()).await.unwrap());
}

#[test]
fn test_is_affirmative() {
    for answer in ["y", "Y", "yes", " YES \n"] {
        assert!(is_affirmative(answer), "{:?}", answer);
    }
    for answer in ["", "n", "no", "yess", "ok"] {
        assert!(!is_affirmative(answer), "{:?}", answer);
    }
}
