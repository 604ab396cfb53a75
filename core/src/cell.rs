use alloc::string::ToString;
use serde::{Deserialize, Serialize};

use crate::{Result, ViewerError};

/// Visual identity of a player's pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerMark {
    Black,
    White,
    Red,
    Yellow,
    Cross,
    Nought,
}

impl PlayerMark {
    pub const ALL: [Self; 6] = [
        Self::Black,
        Self::White,
        Self::Red,
        Self::Yellow,
        Self::Cross,
        Self::Nought,
    ];

    /// Maps the engine's `piece_type` tag.
    pub fn from_piece_type(tag: &str) -> Result<Self> {
        match tag.trim() {
            "B" => Ok(Self::Black),
            "W" => Ok(Self::White),
            "R" => Ok(Self::Red),
            "Y" => Ok(Self::Yellow),
            "X" => Ok(Self::Cross),
            "O" => Ok(Self::Nought),
            other => Err(ViewerError::UnknownPieceType(other.to_string())),
        }
    }

    pub const fn piece_type(self) -> &'static str {
        match self {
            Self::Black => "B",
            Self::White => "W",
            Self::Red => "R",
            Self::Yellow => "Y",
            Self::Cross => "X",
            Self::Nought => "O",
        }
    }

    /// CSS color the mark is drawn with.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Black => "#1a1a1a",
            Self::White => "#f5f5f5",
            Self::Red => "#c0392b",
            Self::Yellow => "#f1c40f",
            Self::Cross => "#2c3e50",
            Self::Nought => "#8e44ad",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub mark: PlayerMark,
    /// Tower height for stacking games.
    pub height: Option<u8>,
}

impl Piece {
    pub const fn new(mark: PlayerMark) -> Self {
        Self { mark, height: None }
    }

    pub const fn stacked(mark: PlayerMark, height: u8) -> Self {
        Self {
            mark,
            height: Some(height),
        }
    }
}

/// Renderer-ready state of one dense cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    /// Outside the physical board.
    #[default]
    Unplayable,
    Empty,
    Occupied(Piece),
}

impl CellState {
    pub const fn is_playable(self) -> bool {
        !matches!(self, Self::Unplayable)
    }

    pub const fn piece(self) -> Option<Piece> {
        match self {
            Self::Occupied(piece) => Some(piece),
            Self::Unplayable | Self::Empty => None,
        }
    }
}
