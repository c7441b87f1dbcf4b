use crate::feedback::{Feedback, annotate_pool};
use crate::game_state::{Action, GameState, Outcome, Rejection};
use crate::info_log;
use crate::puzzle::Puzzle;

/// What the player asked for on one prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Toggle(String),
    Submit,
    Exit,
}

/// One pool entry as a front end should draw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolEntry {
    pub item: String,
    /// 1-based rank slot in the pending selection.
    pub selected_rank: Option<usize>,
    pub best_feedback: Option<Feedback>,
}

/// Front end driven by [`game_loop`].
pub trait GameInterface {
    fn display_puzzle(&mut self, puzzle: &Puzzle);
    fn display_board(&mut self, state: &GameState, pool: &[PoolEntry]);
    /// `None` for input that could not be understood.
    fn read_action(&mut self, pool: &[PoolEntry]) -> Option<UserAction>;
    fn display_rejection(&mut self, rejection: &Rejection);
    fn display_outcome(&mut self, outcome: &Outcome);
    fn display_exit_message(&mut self);
}

/// Pool in display order, annotated from the current state.
pub fn pool_view(puzzle: &Puzzle, state: &GameState) -> Vec<PoolEntry> {
    annotate_pool(puzzle.possible_answers(), state.guess_history())
        .into_iter()
        .map(|(item, best_feedback)| PoolEntry {
            item: item.to_string(),
            selected_rank: state.selected_rank(item),
            best_feedback,
        })
        .collect()
}

/// Plays one session to completion or until the player exits, returning the
/// last state reached.
pub fn game_loop<I: GameInterface>(puzzle: &Puzzle, interface: &mut I) -> GameState {
    info_log!("game_loop() - starting session for {}", puzzle.id());
    interface.display_puzzle(puzzle);
    let mut state = GameState::new(puzzle.id());

    loop {
        let pool = pool_view(puzzle, &state);
        interface.display_board(&state, &pool);

        let action = match interface.read_action(&pool) {
            Some(UserAction::Exit) => {
                interface.display_exit_message();
                break;
            }
            Some(UserAction::Toggle(item)) => Action::Toggle(item),
            Some(UserAction::Submit) => Action::Submit,
            None => continue,
        };

        match state.transition(puzzle, &action) {
            Ok(next) => state = next,
            Err(rejection) => {
                interface.display_rejection(&rejection);
                continue;
            }
        }

        if let Some(outcome) = state.outcome(puzzle) {
            info_log!(
                "game_loop() - session over, won={} after {} attempts",
                outcome.won,
                outcome.attempts_used
            );
            interface.display_outcome(&outcome);
            break;
        }
    }
    state
}
