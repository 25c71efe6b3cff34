use std::error::Error;
use std::time::Duration;

use services::{
    AppServices, SessionController, SubmissionOutcome, SubmissionResult, TickOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

const TICK: Duration = Duration::from_secs(1);

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer {
        products: String,
        reaction_type: String,
        conditions: String,
    },
    Hint,
    Details,
    Next,
    Score,
    Help,
    Quit,
    /// A `:`-prefixed word that is not a known command. Never graded.
    Unknown(String),
    Empty,
}

impl Input {
    /// Lines starting with `:` are commands, matched case-insensitively; an
    /// unrecognised one is `Unknown`. Anything else is an answer of the form
    /// `products | type | conditions`. Missing fields are submitted blank.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        if line.starts_with(':') {
            return match line.to_ascii_lowercase().as_str() {
                ":hint" | ":h" => Self::Hint,
                ":details" | ":d" => Self::Details,
                ":next" | ":n" => Self::Next,
                ":score" | ":s" => Self::Score,
                ":help" | ":?" => Self::Help,
                ":quit" | ":q" => Self::Quit,
                _ => Self::Unknown(line.to_string()),
            };
        }

        let mut parts = line.splitn(3, '|').map(str::trim);
        Self::Answer {
            products: parts.next().unwrap_or_default().to_string(),
            reaction_type: parts.next().unwrap_or_default().to_string(),
            conditions: parts.next().unwrap_or_default().to_string(),
        }
    }
}

fn print_help() {
    println!("Answer with: products | reaction type | conditions");
    println!("Commands: :hint  :details  :next  :score  :help  :quit");
}

fn print_round(session: &SessionController) {
    let board = session.scoreboard();
    println!();
    println!("{board}   {}", board.time_left_label());
    if let Some(prompt) = session.current_prompt() {
        println!("{prompt}");
    }
}

fn print_result(result: &SubmissionResult) {
    match result.outcome() {
        SubmissionOutcome::Correct => {
            println!("Correct Fields: {}", result.correct_count.value());
            println!("Points Earned: {}", result.points);
            if result.new_high_score {
                println!("New high score!");
            }
        }
        SubmissionOutcome::Incorrect => {
            println!("Incorrect. Correct Answer:");
            println!("Products: {}", result.correct_products);
            println!("Type: {}", result.correct_type);
            println!("Conditions: {}", result.correct_conditions);
        }
    }
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
}

/// Drive one interactive session: a one-second ticker races stdin lines.
///
/// Both branches borrow the controller mutably inside a single task, so a
/// tick is never processed in the middle of a submission.
///
/// # Errors
///
/// Returns an error if stdin fails or a new round cannot be started.
pub async fn run_play(services: &AppServices) -> Result<(), Box<dyn Error>> {
    let mut session = services.start_session().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    print_help();
    print_round(&session);

    loop {
        tokio::select! {
            _ = ticker.tick() => match session.tick()? {
                TickOutcome::Expired { scoreboard } => {
                    println!();
                    println!("Time's up! {scoreboard}");
                    print_round(&session);
                }
                TickOutcome::Running { seconds_remaining }
                    if seconds_remaining <= 10 && seconds_remaining % 5 == 0 =>
                {
                    println!("Time Left: {seconds_remaining}s");
                }
                TickOutcome::Running { .. } | TickOutcome::Ignored => {}
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Input::Answer { products, reaction_type, conditions } => {
                        let result = session
                            .submit_answer(&products, &reaction_type, &conditions)
                            .await?;
                        print_result(&result);
                        ticker.reset();
                        print_round(&session);
                    }
                    Input::Hint => println!("Hint: {}", session.hint()?),
                    Input::Details => println!("{}", session.details()?),
                    Input::Next => {
                        session.skip_round()?;
                        ticker.reset();
                        print_round(&session);
                    }
                    Input::Score => {
                        let board = session.scoreboard();
                        println!("{board}   {}", board.time_left_label());
                    }
                    Input::Help => print_help(),
                    Input::Unknown(command) => {
                        println!("Unknown command: {command}");
                        print_help();
                    }
                    Input::Quit => break,
                    Input::Empty => {}
                }
            }
        }
    }

    info!(
        score = session.score(),
        high_score = session.high_score(),
        "session ended"
    );
    println!("Final {}", session.scoreboard());
    Ok(())
}
