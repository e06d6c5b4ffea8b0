//! Turn-by-turn play of a solved quest.

use super::open_store;
use questmaster::{
    Adventure, IoError, OpenAiOracle, QuestConfig, QuestResult, TurnOutcome, TurnReport,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Plays the session's plan, narrating each step.
pub async fn play(config: &QuestConfig, auto: bool) -> QuestResult<()> {
    let store = open_store(config).await?;
    let oracle = OpenAiOracle::new(config.oracle.to_openai()?)?;

    let Some(mut adventure) = Adventure::load(&oracle, &store).await? else {
        println!("Nothing to play yet. Run `questmaster run` for this session first.");
        return Ok(());
    };

    println!("{}\n", adventure.story().trim());
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let outcome = if auto {
            adventure.take_turn().await?
        } else {
            let options = adventure.options().await?;
            if options.is_empty() {
                adventure.take_turn().await?
            } else {
                println!("Here are your options:");
                for (i, option) in options.iter().enumerate() {
                    println!("{}. {}", i + 1, option);
                }
                let Some(pick) = read_pick(&mut stdin, options.len()).await? else {
                    break;
                };
                adventure.take_chosen_turn(&options[pick]).await?
            }
        };

        match outcome {
            TurnOutcome::Advanced(report) => print_turn(&report),
            TurnOutcome::Won(report) => {
                print_turn(&report);
                println!("The quest is complete after {} turns.", adventure.turns());
                break;
            }
            TurnOutcome::Lost => {
                println!("No plan step is left to play; the quest cannot be finished.");
                break;
            }
        }
    }
    Ok(())
}

/// Reads an option number until it is in `1..=count`. `None` quits.
async fn read_pick<R>(lines: &mut Lines<R>, count: usize) -> QuestResult<Option<usize>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        println!("Which action do you want to perform? [1-{}, q to quit]", count);
        let line = lines
            .next_line()
            .await
            .map_err(|e| IoError::new(format!("Failed to read input: {}", e)))?;
        let Some(answer) = line else {
            return Ok(None);
        };
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("Not an option: {}", answer),
        }
    }
}

fn print_turn(report: &TurnReport) {
    println!("> {}\n", report.choice());
    println!("{}\n", report.narration().trim());
}
