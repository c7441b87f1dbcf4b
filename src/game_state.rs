use crate::debug_log;
use crate::feedback::{Feedback, SLOTS, evaluate};
use crate::puzzle::Puzzle;
use thiserror::Error;

/// Attempts allowed per session.
pub const MAX_ATTEMPTS: usize = 5;

/// One submitted guess. Never changes after it is appended to the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guess {
    /// 1-based submission order within the session.
    pub sequence_number: usize,
    pub selected_answers: Vec<String>,
    pub feedback: [Feedback; SLOTS],
}

impl Guess {
    pub fn is_correct(&self) -> bool {
        self.feedback.iter().all(|f| *f == Feedback::Correct)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won,
    Lost,
}

/// Player input to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Toggle(String),
    Submit,
}

/// Why an action was not applied. The state is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("the game is already complete")]
    GameComplete,
    #[error("'{0}' is not one of today's options")]
    NotInPool(String),
    #[error("all 5 rank slots are already filled")]
    SelectionFull,
    #[error("select 5 answers before submitting ({0} selected)")]
    SelectionIncomplete(usize),
    #[error("this session is for {expected}, not puzzle {actual}")]
    WrongPuzzle { expected: String, actual: String },
}

/// Final result of a finished session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub won: bool,
    pub attempts_used: usize,
    pub max_attempts: usize,
    pub correct_answers: Vec<String>,
}

/// One player's session against a single puzzle date.
///
/// Transitions never mutate in place: each returns the next state or a
/// [`Rejection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    date: String,
    current_selection: Vec<String>,
    guess_history: Vec<Guess>,
    attempts_used: usize,
    max_attempts: usize,
    is_complete: bool,
    is_won: bool,
}

impl GameState {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            current_selection: Vec::with_capacity(SLOTS),
            guess_history: Vec::with_capacity(MAX_ATTEMPTS),
            attempts_used: 0,
            max_attempts: MAX_ATTEMPTS,
            is_complete: false,
            is_won: false,
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Click order; index `i` is the rank slot `i + 1` if submitted now.
    pub fn current_selection(&self) -> &[String] {
        &self.current_selection
    }

    /// Submitted guesses, oldest first.
    pub fn guess_history(&self) -> &[Guess] {
        &self.guess_history
    }

    pub fn attempts_used(&self) -> usize {
        self.attempts_used
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_won(&self) -> bool {
        self.is_won
    }

    pub fn status(&self) -> Status {
        match (self.is_complete, self.is_won) {
            (false, _) => Status::InProgress,
            (true, true) => Status::Won,
            (true, false) => Status::Lost,
        }
    }

    pub fn can_toggle(&self) -> bool {
        !self.is_complete
    }

    pub fn can_submit(&self) -> bool {
        !self.is_complete && self.current_selection.len() == SLOTS
    }

    /// 1-based rank slot `item` occupies in the current selection.
    pub fn selected_rank(&self, item: &str) -> Option<usize> {
        self.current_selection
            .iter()
            .position(|s| s == item)
            .map(|i| i + 1)
    }

    pub fn remaining_attempts(&self) -> usize {
        self.max_attempts - self.attempts_used
    }

    pub fn transition(&self, puzzle: &Puzzle, action: &Action) -> Result<GameState, Rejection> {
        let next = match action {
            Action::Toggle(item) => self.toggle_selection(puzzle, item),
            Action::Submit => self.submit_guess(puzzle),
        };
        if let Err(ref rejection) = next {
            debug_log!("transition({:?}) rejected: {}", action, rejection);
        }
        next
    }

    /// Adds `item` at the next open rank slot, or removes it if already
    /// selected. Removal shifts later selections up one rank.
    pub fn toggle_selection(&self, puzzle: &Puzzle, item: &str) -> Result<GameState, Rejection> {
        if self.is_complete {
            return Err(Rejection::GameComplete);
        }
        self.check_puzzle(puzzle)?;
        if !puzzle.in_pool(item) {
            return Err(Rejection::NotInPool(item.to_string()));
        }

        let mut next = self.clone();
        if let Some(index) = next.current_selection.iter().position(|s| s == item) {
            next.current_selection.remove(index);
        } else if next.current_selection.len() < SLOTS {
            next.current_selection.push(item.to_string());
        } else {
            return Err(Rejection::SelectionFull);
        }
        Ok(next)
    }

    /// Scores the current selection and records it as the next attempt.
    pub fn submit_guess(&self, puzzle: &Puzzle) -> Result<GameState, Rejection> {
        if self.is_complete {
            return Err(Rejection::GameComplete);
        }
        if self.current_selection.len() != SLOTS {
            return Err(Rejection::SelectionIncomplete(self.current_selection.len()));
        }
        self.check_puzzle(puzzle)?;

        let feedback = evaluate(&self.current_selection, puzzle.correct_answers());
        let mut next = self.clone();
        let guess = Guess {
            sequence_number: self.attempts_used + 1,
            selected_answers: std::mem::take(&mut next.current_selection),
            feedback,
        };
        let all_correct = guess.is_correct();
        next.guess_history.push(guess);
        next.attempts_used += 1;
        next.is_won = all_correct;
        next.is_complete = all_correct || next.attempts_used == next.max_attempts;

        debug_log!(
            "submit_guess() - attempt {}/{} feedback {:?} complete={} won={}",
            next.attempts_used,
            next.max_attempts,
            feedback,
            next.is_complete,
            next.is_won
        );
        Ok(next)
    }

    fn check_puzzle(&self, puzzle: &Puzzle) -> Result<(), Rejection> {
        if puzzle.id() != self.date {
            return Err(Rejection::WrongPuzzle {
                expected: self.date.clone(),
                actual: puzzle.id().to_string(),
            });
        }
        Ok(())
    }

    /// Summary of a finished session, `None` while still in progress.
    pub fn outcome(&self, puzzle: &Puzzle) -> Option<Outcome> {
        if !self.is_complete {
            return None;
        }
        Some(Outcome {
            won: self.is_won,
            attempts_used: self.attempts_used,
            max_attempts: self.max_attempts,
            correct_answers: puzzle.correct_answers().to_vec(),
        })
    }
}
