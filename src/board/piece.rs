use serde::{Deserialize, Serialize};

/// Which party's pieces a square belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// The rank a pawn of this side promotes on.
    pub fn promotion_rank(self) -> u8 {
        match self {
            Side::White => 8,
            Side::Black => 1,
        }
    }

    pub fn prefix(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

/// Kinds a pawn may promote to, in the order the original dialog offers them.
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

impl PieceKind {
    /// Single display letter. Knight is `N` so it cannot collide with
    /// king or bishop on their shared first letters.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Rook => 'R',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'P' => Some(PieceKind::Pawn),
            'R' => Some(PieceKind::Rook),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Side,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(owner: Side, kind: PieceKind) -> Self {
        Self { owner, kind }
    }

    /// Two-character display code, e.g. white knight -> `"wN"`.
    pub fn code(&self) -> String {
        format!("{}{}", self.owner.prefix(), self.kind.letter())
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let owner = match chars.next()? {
            'w' => Side::White,
            'b' => Side::Black,
            _ => return None,
        };
        let kind = PieceKind::from_letter(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Piece { owner, kind })
    }

    pub fn is_pawn(&self) -> bool {
        self.kind == PieceKind::Pawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[test]
    fn codes_round_trip_over_the_whole_domain() {
        for owner in [Side::White, Side::Black] {
            for kind in ALL_KINDS {
                let piece = Piece::new(owner, kind);
                assert_eq!(Piece::from_code(&piece.code()), Some(piece));
            }
        }
    }

    #[test]
    fn knight_avoids_king_letter_collision() {
        assert_eq!(Piece::new(Side::White, PieceKind::Knight).code(), "wN");
        assert_eq!(Piece::new(Side::White, PieceKind::King).code(), "wK");
        assert_eq!(Piece::new(Side::Black, PieceKind::Bishop).code(), "bB");
    }

    #[test]
    fn unknown_codes_do_not_decode() {
        for bad in ["", "w", "xN", "wZ", "wNN"] {
            assert_eq!(Piece::from_code(bad), None);
        }
    }

    #[test]
    fn promotion_ranks_are_side_relative() {
        assert_eq!(Side::White.promotion_rank(), 8);
        assert_eq!(Side::Black.promotion_rank(), 1);
    }

    #[test]
    fn serde_uses_spelled_out_names() {
        let json = serde_json::to_string(&Piece::new(Side::Black, PieceKind::Queen)).unwrap();
        assert_eq!(json, r#"{"owner":"Black","kind":"Queen"}"#);
    }
}
