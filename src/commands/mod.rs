pub mod move_state;

pub use move_state::{MoveCommand, MoveOutcome};
