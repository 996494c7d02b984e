//! Move-submission protocol for the currently selected game.

pub mod actions;
pub mod board_view;
pub mod engine;

pub use actions::{ActionError, GameActions};
pub use board_view::{orientation, render_board, RenderedSquare};
pub use engine::{
    BoardRole, DropOutcome, MoveError, MovePhase, MoveProtocolEngine, PendingMove,
};
