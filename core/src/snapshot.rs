use alloc::collections::BTreeMap;

use tessera_protocol::{PlayerDescriptor, PlayerId};

use crate::{DenseGrid, IdentityCache, PlayerMark, ScoreBoard};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    /// A human at this viewer picks the move.
    Interactive,
    Automated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TurnInfo {
    pub player: Option<PlayerId>,
    pub active_mark: Option<PlayerMark>,
    pub capability: Capability,
}

impl TurnInfo {
    pub fn from_descriptor(next: &PlayerDescriptor, identities: &IdentityCache) -> Self {
        let player = next.id();
        let active_mark = next
            .piece_type()
            .and_then(|tag| PlayerMark::from_piece_type(tag).ok())
            .or_else(|| player.and_then(|id| identities.mark_of(id)));
        let capability = if next.is_interactive() {
            Capability::Interactive
        } else {
            Capability::Automated
        };

        Self {
            player,
            active_mark,
            capability,
        }
    }
}

/// One fully resolved game state.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    grid: DenseGrid,
    scores: ScoreBoard,
    turn: Option<TurnInfo>,
    remaining_time: BTreeMap<PlayerId, f64>,
}

impl Snapshot {
    pub fn new(grid: DenseGrid, scores: ScoreBoard, turn: Option<TurnInfo>) -> Self {
        Self {
            grid,
            scores,
            turn,
            remaining_time: BTreeMap::new(),
        }
    }

    pub fn with_remaining_time(mut self, remaining_time: BTreeMap<PlayerId, f64>) -> Self {
        self.remaining_time = remaining_time;
        self
    }

    pub fn grid(&self) -> &DenseGrid {
        &self.grid
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn turn(&self) -> Option<&TurnInfo> {
        self.turn.as_ref()
    }

    /// Seconds left on `player`'s clock, if the engine reported it.
    pub fn remaining_time(&self, player: PlayerId) -> Option<f64> {
        self.remaining_time.get(&player).copied()
    }

    pub fn is_interactive_turn(&self) -> bool {
        self.turn
            .is_some_and(|turn| turn.capability == Capability::Interactive)
    }
}
