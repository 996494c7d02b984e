//! Display projection of a board snapshot: algebraic coordinates, piece
//! codes, and checkerboard shading, oriented for the viewing side.

use crate::board::{Coord, Shade, Side, BOARD_SQUARES};
use crate::ledger::events::BoardSnapshot;

/// Everything the presentation layer needs to draw one square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedSquare {
    pub coord: Coord,
    pub shade: Shade,
    /// Piece display code (`"wN"`, `"bQ"`, …) or `None` for an empty or
    /// fogged square.
    pub code: Option<String>,
}

/// Project a snapshot onto all 64 squares in index order.
pub fn render_board(snapshot: &BoardSnapshot) -> Vec<RenderedSquare> {
    (0..BOARD_SQUARES)
        .map(|index| RenderedSquare {
            coord: Coord::from_index(index).expect("index in range by construction"),
            shade: Shade::of(index),
            code: snapshot.piece_at(index).map(|piece| piece.code()),
        })
        .collect()
}

/// Board orientation string for the rendering widget.
pub fn orientation(side: Side) -> &'static str {
    match side {
        Side::White => "white",
        Side::Black => "black",
    }
}
