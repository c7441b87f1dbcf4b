// Library interface for ranklr
// The binary and the integration tests both go through these modules

pub mod cli;
pub mod dates;
pub mod feedback;
pub mod game_state;
pub mod logging;
pub mod puzzle;
pub mod repository;
pub mod session;
pub mod validator;

// Re-export commonly used items for easier testing
pub use feedback::{Feedback, annotate_pool, best_feedback, evaluate};
pub use game_state::{Action, GameState, Guess, Rejection, Status};
pub use puzzle::{Puzzle, PuzzleRecord};
pub use repository::{PuzzleRepository, load_records_from_file, load_records_from_str};
pub use session::game_loop;
pub use validator::{validate_batch, validate_record};
