use crate::game_state::Guess;

/// Number of ranked slots in a guess and in an answer.
pub const SLOTS: usize = 5;

/// Per-slot verdict for one guessed item.
///
/// Variants are declared from weakest to strongest so that `Ord` follows the
/// badge priority used when aggregating over several guesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feedback {
    /// Not among the ranked answers.
    Missing,
    /// Among the ranked answers, at a different rank.
    WrongPosition,
    /// Right item at the right rank.
    Correct,
}

impl Feedback {
    /// Single-letter badge for text output.
    #[must_use]
    pub fn to_char(self) -> char {
        match self {
            Self::Correct => 'G',
            Self::WrongPosition => 'Y',
            Self::Missing => 'X',
        }
    }
}

/// Scores a ranked guess against the ranked answer, slot by slot.
///
/// Both slices must hold exactly [`SLOTS`] items and `selected` must be free
/// of duplicates. The state machine only calls this after its submission
/// gate, so a length mismatch here is a broken invariant and panics.
pub fn evaluate<S: AsRef<str>, C: AsRef<str>>(selected: &[S], correct: &[C]) -> [Feedback; SLOTS] {
    assert_eq!(selected.len(), SLOTS, "guess must fill every rank slot");
    assert_eq!(correct.len(), SLOTS, "answer must fill every rank slot");

    let mut feedback = [Feedback::Missing; SLOTS];
    for (i, item) in selected.iter().enumerate() {
        let item = item.as_ref();
        feedback[i] = if correct[i].as_ref() == item {
            Feedback::Correct
        } else if correct.iter().any(|c| c.as_ref() == item) {
            Feedback::WrongPosition
        } else {
            Feedback::Missing
        };
    }
    feedback
}

/// Best verdict `item` has earned across every submitted guess.
///
/// `None` means the item was never part of a submitted guess. The scan is a
/// max-reduction, so the result does not depend on history order and a later
/// weaker verdict never replaces an earlier stronger one.
pub fn best_feedback(item: &str, history: &[Guess]) -> Option<Feedback> {
    let mut best = None;
    for guess in history {
        let Some(slot) = guess.selected_answers.iter().position(|s| s == item) else {
            continue;
        };
        let verdict = guess.feedback[slot];
        if verdict == Feedback::Correct {
            return Some(verdict);
        }
        best = best.max(Some(verdict));
    }
    best
}

/// Annotates the whole pool, in display order, with each item's best verdict.
pub fn annotate_pool<'a>(pool: &'a [String], history: &[Guess]) -> Vec<(&'a str, Option<Feedback>)> {
    pool.iter()
        .map(|item| (item.as_str(), best_feedback(item, history)))
        .collect()
}
