use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{Piece, Side, SquareIndex};
use crate::ledger::types::{ContractRef, GameKey, GameLabel, Party};

// ---- Board snapshot -------------------------------------------------------------------------

/// Full visible board state as delivered by the ledger: square index to
/// piece, absent key meaning an empty (or fogged) square.
///
/// A snapshot is immutable once received and replaced wholesale by the next
/// event for the same game; the move engine clones it for its optimistic
/// overlay rather than editing the received copy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot {
    squares: BTreeMap<SquareIndex, Piece>,
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (SquareIndex, Piece)>) -> Self {
        Self {
            squares: pairs.into_iter().collect(),
        }
    }

    pub fn piece_at(&self, index: SquareIndex) -> Option<Piece> {
        self.squares.get(&index).copied()
    }

    pub fn set_piece(&mut self, index: SquareIndex, piece: Piece) {
        self.squares.insert(index, piece);
    }

    pub fn clear_square(&mut self, index: SquareIndex) {
        self.squares.remove(&index);
    }

    pub fn iter(&self) -> impl Iterator<Item = (SquareIndex, Piece)> + '_ {
        self.squares.iter().map(|(&index, &piece)| (index, piece))
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }
}

/// One side's view of an in-play game: whose turn the board belongs to,
/// the visible pieces, and whether that side is in check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBoard {
    pub side: Side,
    pub pieces: BoardSnapshot,
    #[serde(rename = "inCheck_")]
    pub in_check: bool,
}

// ---- Game facts -----------------------------------------------------------------------------

/// Facts shared by every phase of one logical game. `proposer` and
/// `opponent` are fixed slots, not viewer-relative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    #[serde(rename = "gameId")]
    pub label: GameLabel,
    pub proposer: Party,
    pub opponent: Party,
    #[serde(rename = "desiredSide")]
    pub desired_side: Side,
}

impl GameDetails {
    pub fn game_key(&self) -> GameKey {
        GameKey::derive(&self.proposer, &self.opponent, &self.label)
    }
}

// ---- Outcomes -------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum DrawReason {
    PlayerDraw(Party),
    Stalemate,
    ThreefoldRepetition,
    FiftyMoveRule,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum GameOutcome {
    Winner(Party),
    Draw(DrawReason),
}

// ---- Phase events ---------------------------------------------------------------------------

/// The six mutually exclusive phases a game's ledger representation moves
/// through, one stream per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Proposed,
    ActiveTurn,
    PassiveTurn,
    DrawClaimed,
    EndProposed,
    Finished,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 6] = [
        PhaseKind::Proposed,
        PhaseKind::ActiveTurn,
        PhaseKind::PassiveTurn,
        PhaseKind::DrawClaimed,
        PhaseKind::EndProposed,
        PhaseKind::Finished,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            PhaseKind::Proposed => "game proposed",
            PhaseKind::ActiveTurn => "your move",
            PhaseKind::PassiveTurn => "opponent to move",
            PhaseKind::DrawClaimed => "draw claimed",
            PhaseKind::EndProposed => "end of game proposed",
            PhaseKind::Finished => "finished",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedGame {
    pub contract: ContractRef,
    pub game: GameDetails,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveGame {
    pub contract: ContractRef,
    pub game: GameDetails,
    pub player: Party,
    pub board: SideBoard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveGame {
    pub contract: ContractRef,
    pub game: GameDetails,
    pub player: Party,
    pub board: SideBoard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawClaim {
    pub contract: ContractRef,
    pub game: GameDetails,
    pub claimer: Party,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndProposal {
    pub contract: ContractRef,
    pub game: GameDetails,
    pub proposed_by: Party,
    pub board: SideBoard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedGame {
    pub contract: ContractRef,
    pub game: GameDetails,
    pub outcome: GameOutcome,
}

/// The most recently observed ledger fact about one game, tagged by phase.
/// Each variant carries its own contract reference; references are never
/// shared across variants even for the same logical game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhaseEvent {
    Proposed(ProposedGame),
    ActiveTurn(ActiveGame),
    PassiveTurn(PassiveGame),
    DrawClaimed(DrawClaim),
    EndProposed(EndProposal),
    Finished(FinishedGame),
}

impl GamePhaseEvent {
    pub fn kind(&self) -> PhaseKind {
        match self {
            GamePhaseEvent::Proposed(_) => PhaseKind::Proposed,
            GamePhaseEvent::ActiveTurn(_) => PhaseKind::ActiveTurn,
            GamePhaseEvent::PassiveTurn(_) => PhaseKind::PassiveTurn,
            GamePhaseEvent::DrawClaimed(_) => PhaseKind::DrawClaimed,
            GamePhaseEvent::EndProposed(_) => PhaseKind::EndProposed,
            GamePhaseEvent::Finished(_) => PhaseKind::Finished,
        }
    }

    pub fn game(&self) -> &GameDetails {
        match self {
            GamePhaseEvent::Proposed(e) => &e.game,
            GamePhaseEvent::ActiveTurn(e) => &e.game,
            GamePhaseEvent::PassiveTurn(e) => &e.game,
            GamePhaseEvent::DrawClaimed(e) => &e.game,
            GamePhaseEvent::EndProposed(e) => &e.game,
            GamePhaseEvent::Finished(e) => &e.game,
        }
    }

    /// The cross-stream join key; identical for every event of one logical
    /// game regardless of which phase stream delivered it.
    pub fn game_key(&self) -> GameKey {
        self.game().game_key()
    }

    pub fn contract_ref(&self) -> &ContractRef {
        match self {
            GamePhaseEvent::Proposed(e) => &e.contract,
            GamePhaseEvent::ActiveTurn(e) => &e.contract,
            GamePhaseEvent::PassiveTurn(e) => &e.contract,
            GamePhaseEvent::DrawClaimed(e) => &e.contract,
            GamePhaseEvent::EndProposed(e) => &e.contract,
            GamePhaseEvent::Finished(e) => &e.contract,
        }
    }

    /// Board carried by this event, if its phase has one.
    pub fn board(&self) -> Option<&SideBoard> {
        match self {
            GamePhaseEvent::ActiveTurn(e) => Some(&e.board),
            GamePhaseEvent::PassiveTurn(e) => Some(&e.board),
            GamePhaseEvent::EndProposed(e) => Some(&e.board),
            _ => None,
        }
    }

    pub fn as_active(&self) -> Option<&ActiveGame> {
        match self {
            GamePhaseEvent::ActiveTurn(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceKind;

    fn sample_game() -> GameDetails {
        GameDetails {
            label: GameLabel::new("g1"),
            proposer: Party::new("alice"),
            opponent: Party::new("bob"),
            desired_side: Side::White,
        }
    }

    fn sample_board() -> SideBoard {
        SideBoard {
            side: Side::White,
            pieces: BoardSnapshot::from_pairs([(0, Piece::new(Side::White, PieceKind::Rook))]),
            in_check: false,
        }
    }

    #[test]
    fn all_phases_of_one_game_share_the_key() {
        let game = sample_game();
        let proposed = GamePhaseEvent::Proposed(ProposedGame {
            contract: ContractRef::new("#1:0"),
            game: game.clone(),
        });
        let active = GamePhaseEvent::ActiveTurn(ActiveGame {
            contract: ContractRef::new("#2:0"),
            game: game.clone(),
            player: Party::new("alice"),
            board: sample_board(),
        });
        let finished = GamePhaseEvent::Finished(FinishedGame {
            contract: ContractRef::new("#3:0"),
            game,
            outcome: GameOutcome::Winner(Party::new("alice")),
        });

        assert_eq!(proposed.game_key(), active.game_key());
        assert_eq!(active.game_key(), finished.game_key());
        assert_ne!(proposed.contract_ref(), active.contract_ref());
    }

    #[test]
    fn outcome_uses_tag_value_encoding() {
        let winner = GameOutcome::Winner(Party::new("alice"));
        assert_eq!(
            serde_json::to_value(&winner).unwrap(),
            serde_json::json!({"tag": "Winner", "value": "alice"})
        );

        let draw = GameOutcome::Draw(DrawReason::Stalemate);
        assert_eq!(
            serde_json::to_value(&draw).unwrap(),
            serde_json::json!({"tag": "Draw", "value": {"tag": "Stalemate"}})
        );
        let back: GameOutcome = serde_json::from_value(
            serde_json::json!({"tag": "Draw", "value": {"tag": "Stalemate"}}),
        )
        .unwrap();
        assert_eq!(back, draw);
    }

    #[test]
    fn board_snapshot_reads_back_pieces_by_index() {
        let mut board = BoardSnapshot::empty();
        assert!(board.is_empty());
        board.set_piece(12, Piece::new(Side::Black, PieceKind::Queen));
        assert_eq!(
            board.piece_at(12),
            Some(Piece::new(Side::Black, PieceKind::Queen))
        );
        board.clear_square(12);
        assert_eq!(board.piece_at(12), None);
    }

    #[test]
    fn side_board_serializes_in_check_with_wire_name() {
        let json = serde_json::to_value(sample_board()).unwrap();
        assert!(json.get("inCheck_").is_some());
    }
}
