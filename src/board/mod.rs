//! Board geometry and piece codecs shared by the session and game modules.

pub mod coord;
pub mod piece;

pub use coord::{Coord, CoordError, Shade, SquareIndex, BOARD_SQUARES};
pub use piece::{Piece, PieceKind, Side, PROMOTION_KINDS};
