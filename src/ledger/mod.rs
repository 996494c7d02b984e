pub mod client;
pub mod events;
pub mod stream;
pub mod types;

pub use client::{
    ChessChoice, ExerciseError, ExerciseOutcome, LedgerClient, MoveArgument, SharedLedgerClient,
};
pub use events::{
    ActiveGame, BoardSnapshot, DrawClaim, DrawReason, EndProposal, FinishedGame, GameDetails,
    GameOutcome, GamePhaseEvent, PassiveGame, PhaseKind, ProposedGame, SideBoard,
};
pub use stream::{PhaseFeed, PhaseNormalizer, RawCreateEvent, RawQueryUpdate, StreamError};
pub use types::{ContractRef, GameKey, GameLabel, Party};
