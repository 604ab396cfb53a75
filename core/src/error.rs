use alloc::string::{String, ToString};
use tessera_protocol::PlayerId;
use thiserror::Error;

use crate::{DenseIndex, NativeCoord, PlayerMark};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("Coordinate must be wrapped in parentheses")]
    MissingDelimiters,
    #[error("Coordinate must have two components, found {0}")]
    Arity(usize),
    #[error("Invalid coordinate component {0:?}")]
    InvalidComponent(String),
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Native coordinate {0} is mapped twice")]
    DuplicateCoordinate(NativeCoord),
    #[error("Dense index {0:?} is mapped twice")]
    DuplicateIndex(DenseIndex),
    #[error("Dense index {0:?} is outside the grid")]
    IndexOutOfBounds(DenseIndex),
}

/// Why a player's mark could not be settled.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    #[error("none of their pieces show a piece type")]
    NoEvidence,
    #[error("their pieces show {0} different piece types")]
    SeveralMarks(usize),
    #[error("{0:?} is claimed by another player")]
    MarkContested(PlayerMark),
    #[error("they already play {held:?}, not {claimed:?}")]
    Reassigned {
        held: PlayerMark,
        claimed: PlayerMark,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),
    #[error("Invalid coordinate key {key:?}: {source}")]
    InvalidCoordinate {
        key: String,
        source: CoordParseError,
    },
    #[error("Board lists {0} more than once")]
    DuplicateCoordinate(NativeCoord),
    #[error("No table entry for native coordinate {0}")]
    UnmappedCoordinate(NativeCoord),
    #[error("No native coordinate for dense index {0:?}")]
    UnmappedIndex(DenseIndex),
    #[error("Unknown piece type {0:?}")]
    UnknownPieceType(String),
    #[error("Cannot tell whose piece is at {coord}")]
    UnresolvedPiece {
        coord: NativeCoord,
        owner: Option<PlayerId>,
    },
    #[error("Cannot resolve the mark of player {id}: {reason}")]
    AmbiguousPlayerIdentity { id: PlayerId, reason: Ambiguity },
    #[error(transparent)]
    Table(#[from] TableError),
}

impl ViewerError {
    /// Identity problems that only mean "not yet known", as opposed to bad data.
    pub const fn is_pending_identity(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousPlayerIdentity {
                reason: Ambiguity::NoEvidence,
                ..
            }
        )
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, ViewerError>;
