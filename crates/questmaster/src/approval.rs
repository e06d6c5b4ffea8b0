//! Console approval gate.

use async_trait::async_trait;
use questmaster_error::{IoError, QuestResult};
use questmaster_interface::{ApprovalGate, NarrativeProposal};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Asks a human on the terminal whether to apply a narrative rewrite.
///
/// The proposal is printed to stdout and one line is read from `input`.
/// `y` or `yes` (any case) approves; anything else, including end of input,
/// rejects.
pub struct ConsoleApproval<R> {
    input: Mutex<R>,
}

impl ConsoleApproval<BufReader<Stdin>> {
    /// Gate reading answers from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ConsoleApproval<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Gate reading answers from `input`.
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

/// Whether an answer line approves.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl<R> ApprovalGate for ConsoleApproval<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    #[tracing::instrument(skip_all)]
    async fn approve(&self, proposal: &NarrativeProposal) -> QuestResult<bool> {
        println!("\nThe planner could not solve the current story.");
        println!("Suggested change:\n\n{}\n", proposal.suggestion().trim());
        println!("Apply this change to the story? [y/N]");

        let mut line = String::new();
        let read = self
            .input
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|e| IoError::new(format!("Failed to read answer: {}", e)))?;

        let approved = read > 0 && is_affirmative(&line);
        tracing::info!(approved, "Narrative proposal answered");
        Ok(approved)
    }
}
