use serde::{Deserialize, Serialize};

use crate::{Coord, CoordinateTable, GridLayout, NativeCoord, PlayerMark};

pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u32 = 500;

const ABALONE_ROWS: Coord = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameVariant {
    Abalone,
    Avalam,
    TicTacToe,
}

impl GameVariant {
    pub const ALL: [Self; 3] = [Self::Abalone, Self::Avalam, Self::TicTacToe];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Abalone => "abalone",
            Self::Avalam => "avalam",
            Self::TicTacToe => "tictactoe",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn config(self) -> VariantConfig {
        match self {
            Self::Abalone => VariantConfig {
                variant: self,
                table: abalone_table(),
                layout: GridLayout::OffsetHex,
                score_convention: ScoreConvention::NegatedLosses,
                action_kind: ActionKind::Move,
                marks: &[PlayerMark::Black, PlayerMark::White],
                autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            },
            Self::Avalam => VariantConfig {
                variant: self,
                table: CoordinateTable::identity((9, 9)),
                layout: GridLayout::Square,
                score_convention: ScoreConvention::Passthrough,
                action_kind: ActionKind::Move,
                marks: &[PlayerMark::Red, PlayerMark::Yellow],
                autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            },
            Self::TicTacToe => VariantConfig {
                variant: self,
                table: CoordinateTable::identity((3, 3)),
                layout: GridLayout::Square,
                score_convention: ScoreConvention::Passthrough,
                action_kind: ActionKind::Place,
                marks: &[PlayerMark::Cross, PlayerMark::Nought],
                autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            },
        }
    }
}

/// How raw engine scores become displayed ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreConvention {
    /// The engine counts lost pieces; display the negation.
    NegatedLosses,
    Passthrough,
}

impl ScoreConvention {
    /// Engine scores are whole numbers sent as floats.
    pub fn display(self, raw: f64) -> i64 {
        match self {
            Self::NegatedLosses => (-raw) as i64,
            Self::Passthrough => raw as i64,
        }
    }
}

/// Shape of the action a human player sends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Pick a piece, then a destination.
    Move,
    /// Pick a single cell.
    Place,
}

/// Everything that differs between supported games.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantConfig {
    pub variant: GameVariant,
    pub table: CoordinateTable,
    pub layout: GridLayout,
    pub score_convention: ScoreConvention,
    pub action_kind: ActionKind,
    pub marks: &'static [PlayerMark],
    pub autoplay_interval_ms: u32,
}

/// The 61-cell hexagon. Native `(x, y)` satisfies `x + y = 4 + 2 * row`.
fn abalone_table() -> CoordinateTable {
    let entries = (0..ABALONE_ROWS).flat_map(|row| {
        let first = row.saturating_sub(4);
        let last = (row + 4).min(ABALONE_ROWS - 1);
        (first..=last).map(move |y| {
            let x = 4 + 2 * row - y;
            let col = y + 2 - (row + 1) / 2;
            (NativeCoord(x.into(), y.into()), (row, col))
        })
    });

    CoordinateTable::new((ABALONE_ROWS, ABALONE_ROWS), entries).expect("abalone layout is a bijection")
}
