//! Application services orchestrating reorder operations.

mod coordinator;

pub use coordinator::{MoveCoordinator, MoveError, MoveRequest, MoveResult};
