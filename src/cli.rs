use crate::dates::{Clock, parse_date_key, today_key};
use crate::feedback::Feedback;
use crate::game_state::{GameState, Outcome, Rejection};
use crate::puzzle::{Puzzle, PuzzleError};
use crate::repository::{PuzzleRepository, RepositoryError, default_store_path};
use crate::session::{GameInterface, PoolEntry, UserAction};
use crate::validator::{BatchReport, validate_batch};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::io::BufRead;
use std::path::PathBuf;
use thiserror::Error;

/// Ranklr daily top-5 puzzle tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the puzzle store (JSON object keyed by puzzle date)
    #[arg(short = 'i', long = "input", env = "RANKLR_PUZZLES", global = true)]
    pub store_path: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Check every stored puzzle before publication
    Verify,
    /// Play a puzzle in the terminal
    Play {
        /// Puzzle date (YYYY-MM-DD); defaults to today in New York
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

impl Cli {
    pub fn resolve_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(default_store_path)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error("'{0}' is not a YYYY-MM-DD date")]
    BadDate(String),
}

/// Puzzle key to play: the requested date, or today's.
pub fn resolve_date<C: Clock>(requested: Option<&str>, clock: &C) -> Result<String, LoadError> {
    match requested {
        Some(date) if parse_date_key(date).is_some() => Ok(date.to_string()),
        Some(date) => Err(LoadError::BadDate(date.to_string())),
        None => Ok(today_key(clock)),
    }
}

/// `Ok(None)` when nothing is published for `date`.
pub fn load_puzzle<R: PuzzleRepository>(repo: &R, date: &str) -> Result<Option<Puzzle>, LoadError> {
    let Some(record) = repo.fetch_puzzle(date)? else {
        return Ok(None);
    };
    Ok(Some(Puzzle::from_record(&record)?))
}

pub fn verify<R: PuzzleRepository>(repo: &R) -> Result<BatchReport, RepositoryError> {
    Ok(validate_batch(repo.fetch_all_puzzles()?))
}

/// Progress line, summary and itemised failures for a validation run.
pub fn render_report(report: &BatchReport) -> String {
    let mut out = String::new();
    if report.total() == 0 {
        out.push_str("No puzzles found in the store.\n");
        return out;
    }

    let _ = writeln!(out, "Validating {} puzzles...\n", report.total());
    let progress: String = report
        .records
        .iter()
        .map(|r| if r.is_valid() { '.' } else { 'F' })
        .collect();
    let _ = writeln!(out, "{progress}\n");

    if report.is_success() {
        let _ = writeln!(out, "All {} puzzles passed validation!", report.total());
        return out;
    }

    let _ = writeln!(
        out,
        "{} of {} puzzles failed validation.",
        report.failed_count(),
        report.total()
    );
    let _ = writeln!(out, "{} puzzles passed.\n", report.valid_count());
    let _ = writeln!(out, "DETAILED ERROR REPORT:\n");
    for record in report.failures() {
        let _ = writeln!(out, "Puzzle: {}", record.id);
        for (i, violation) in record.violations.iter().enumerate() {
            let _ = writeln!(out, "   {}. {}", i + 1, violation);
            let _ = writeln!(out, "      Expected: {}", violation.expected);
            let _ = writeln!(out, "      Actual: {}", violation.actual);
        }
        out.push('\n');
    }
    out
}

fn feedback_label(feedback: Option<Feedback>) -> &'static str {
    match feedback {
        Some(Feedback::Correct) => "[G]",
        Some(Feedback::WrongPosition) => "[Y]",
        Some(Feedback::Missing) => "[X]",
        None => "   ",
    }
}

/// Parses one prompt line against the numbered pool.
///
/// A number picks the entry at that position; anything else, including a
/// number past the end of the pool, is matched against item names.
pub fn parse_action(input: &str, pool: &[PoolEntry]) -> Option<UserAction> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "" => None,
        "exit" | "quit" => Some(UserAction::Exit),
        "submit" | "s" => Some(UserAction::Submit),
        _ => {
            let by_index = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| pool.get(i));
            by_index
                .or_else(|| pool.iter().find(|e| e.item.eq_ignore_ascii_case(input)))
                .map(|e| UserAction::Toggle(e.item.clone()))
        }
    }
}

/// Line-oriented front end over any `BufRead`.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_puzzle(&mut self, puzzle: &Puzzle) {
        println!("Puzzle for {}", puzzle.id());
        println!("{}", puzzle.question());
        println!("Data pulled on {}, from {}", puzzle.source_date(), puzzle.source());
    }

    fn display_board(&mut self, state: &GameState, pool: &[PoolEntry]) {
        println!();
        for guess in state.guess_history() {
            let marks: String = guess.feedback.iter().map(|f| f.to_char()).collect();
            println!("{}. {}  {}", guess.sequence_number, marks, guess.selected_answers.join(", "));
        }
        println!(
            "Attempt {}/{} - selected: [{}]",
            state.attempts_used() + 1,
            state.max_attempts(),
            state.current_selection().join(", ")
        );
        for (i, entry) in pool.iter().enumerate() {
            let rank = entry
                .selected_rank
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            println!("{:>2}. {} {}{}", i + 1, feedback_label(entry.best_feedback), entry.item, rank);
        }
    }

    fn read_action(&mut self, pool: &[PoolEntry]) -> Option<UserAction> {
        println!("\nEnter an option number to toggle it, 'submit' to guess, or 'exit' to quit:");
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) | Err(_) => return Some(UserAction::Exit),
            Ok(_) => {}
        }
        let action = parse_action(&input, pool);
        if action.is_none() {
            println!("Invalid input. Enter a number from 1 to {}.", pool.len());
        }
        action
    }

    fn display_rejection(&mut self, rejection: &Rejection) {
        println!("{rejection}");
    }

    fn display_outcome(&mut self, outcome: &Outcome) {
        if outcome.won {
            println!(
                "\nCongratulations! You solved it in {}/{} attempts!",
                outcome.attempts_used, outcome.max_attempts
            );
        } else {
            println!(
                "\nGame over. Better luck next time! (Used all {} attempts)",
                outcome.max_attempts
            );
        }
        println!("Correct answer:");
        for (i, answer) in outcome.correct_answers.iter().enumerate() {
            println!("{}. {}", i + 1, answer);
        }
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}
