use std::fmt;
use std::str::FromStr;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub type SquareIndex = u8;

/// Number of squares on the board; valid indices are `0..BOARD_SQUARES`.
pub const BOARD_SQUARES: u8 = 64;

const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordError {
    #[error("square index {0} outside 0..=63")]
    IndexOutOfRange(u8),
    #[error("malformed coordinate {0:?}")]
    Malformed(String),
}

/// Algebraic board coordinate: file `a..=h`, rank `1..=8`.
///
/// The ledger addresses squares by a linear index where `file = index / 8`
/// and `rank = index % 8 + 1`; both directions are exposed here and are
/// mutual inverses over the whole board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    file: u8,
    rank: u8,
}

impl Coord {
    pub fn from_index(index: SquareIndex) -> Result<Self, CoordError> {
        if index >= BOARD_SQUARES {
            return Err(CoordError::IndexOutOfRange(index));
        }
        Ok(Self {
            file: index / 8,
            rank: index % 8 + 1,
        })
    }

    pub fn new(file: u8, rank: u8) -> Result<Self, CoordError> {
        if file > 7 || rank < 1 || rank > 8 {
            return Err(CoordError::Malformed(format!("file {file} rank {rank}")));
        }
        Ok(Self { file, rank })
    }

    /// Zero-based file, `0` = file `a`.
    pub fn file(&self) -> u8 {
        self.file
    }

    /// One-based rank, matching algebraic notation.
    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn index(&self) -> SquareIndex {
        self.file * 8 + (self.rank - 1)
    }

    pub fn file_letter(&self) -> char {
        FILES[self.file as usize]
    }

    /// Uppercase form used by the ledger's coordinate type, e.g. `"E4"`.
    pub fn wire(&self) -> String {
        format!("{}{}", self.file_letter().to_ascii_uppercase(), self.rank)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_letter(), self.rank)
    }
}

impl FromStr for Coord {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordError::Malformed(s.to_string());
        let mut chars = s.chars();
        let file_char = chars.next().ok_or_else(malformed)?.to_ascii_lowercase();
        let rank_char = chars.next().ok_or_else(malformed)?;
        if chars.next().is_some() {
            return Err(malformed());
        }
        let file = FILES
            .iter()
            .position(|&f| f == file_char)
            .ok_or_else(malformed)? as u8;
        let rank = rank_char.to_digit(10).ok_or_else(malformed)? as u8;
        Coord::new(file, rank).map_err(|_| malformed())
    }
}

impl Serialize for Coord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.wire())
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        encoded.parse().map_err(D::Error::custom)
    }
}

/// Checkerboard shading of a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Light,
    Dark,
}

impl Shade {
    /// A square is dark iff its file parity matches its index parity.
    pub fn of(index: SquareIndex) -> Self {
        let file = index / 8;
        let dark = if file % 2 == 0 {
            index % 2 == 0
        } else {
            index % 2 != 0
        };
        if dark {
            Shade::Dark
        } else {
            Shade::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Shade::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_coord_are_mutual_inverses() {
        for index in 0..BOARD_SQUARES {
            let coord = Coord::from_index(index).unwrap();
            assert_eq!(coord.index(), index);
            let parsed: Coord = coord.to_string().parse().unwrap();
            assert_eq!(parsed, coord);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert_eq!(
            Coord::from_index(64),
            Err(CoordError::IndexOutOfRange(64))
        );
        assert_eq!(
            Coord::from_index(200),
            Err(CoordError::IndexOutOfRange(200))
        );
    }

    #[test]
    fn known_corners_map_correctly() {
        assert_eq!(Coord::from_index(0).unwrap().to_string(), "a1");
        assert_eq!(Coord::from_index(7).unwrap().to_string(), "a8");
        assert_eq!(Coord::from_index(56).unwrap().to_string(), "h1");
        assert_eq!(Coord::from_index(63).unwrap().to_string(), "h8");
    }

    #[test]
    fn wire_form_is_uppercase_and_round_trips_serde() {
        let coord: Coord = "e4".parse().unwrap();
        assert_eq!(coord.wire(), "E4");
        let json = serde_json::to_string(&coord).unwrap();
        assert_eq!(json, "\"E4\"");
        let back: Coord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coord);
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        for bad in ["", "e", "e44", "i4", "e0", "e9", "44"] {
            assert!(bad.parse::<Coord>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn shading_splits_the_board_thirty_two_each() {
        let dark = (0..BOARD_SQUARES)
            .filter(|&i| Shade::of(i).is_dark())
            .count();
        assert_eq!(dark, 32);
    }

    #[test]
    fn no_orthogonal_neighbours_share_a_shade() {
        for index in 0..BOARD_SQUARES {
            let coord = Coord::from_index(index).unwrap();
            if coord.rank() < 8 {
                let up = Coord::new(coord.file(), coord.rank() + 1).unwrap();
                assert_ne!(Shade::of(index), Shade::of(up.index()));
            }
            if coord.file() < 7 {
                let right = Coord::new(coord.file() + 1, coord.rank()).unwrap();
                assert_ne!(Shade::of(index), Shade::of(right.index()));
            }
        }
    }
}
