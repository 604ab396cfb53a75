use alloc::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};
use tessera_protocol::{PlayerDescriptor, PlayerId};

use crate::{IdentityCache, PlayerMark, ScoreConvention};

/// Displayed score per mark.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    scores: BTreeMap<PlayerMark, i64>,
}

impl ScoreBoard {
    /// Every mark of the variant at zero.
    pub fn zeroed(marks: &[PlayerMark]) -> Self {
        Self {
            scores: marks.iter().map(|&mark| (mark, 0)).collect(),
        }
    }

    pub fn get(&self, mark: PlayerMark) -> Option<i64> {
        self.scores.get(&mark).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerMark, i64)> + '_ {
        self.scores.iter().map(|(&mark, &score)| (mark, score))
    }
}

/// Scores for the listed players plus anyone the engine scored.
pub fn aggregate(
    raw: &BTreeMap<PlayerId, f64>,
    players: &[PlayerDescriptor],
    identities: &IdentityCache,
    convention: ScoreConvention,
    marks: &[PlayerMark],
) -> ScoreBoard {
    let ids = players.iter().filter_map(PlayerDescriptor::id);
    aggregate_ids(raw, ids, identities, convention, marks)
}

pub fn aggregate_ids(
    raw: &BTreeMap<PlayerId, f64>,
    ids: impl IntoIterator<Item = PlayerId>,
    identities: &IdentityCache,
    convention: ScoreConvention,
    marks: &[PlayerMark],
) -> ScoreBoard {
    let mut board = ScoreBoard::zeroed(marks);
    for id in ids.into_iter().chain(raw.keys().copied()) {
        let Some(mark) = identities.mark_of(id) else {
            trace!("No mark for player {id} yet, score left at zero");
            continue;
        };
        let score = raw.get(&id).copied().unwrap_or(0.0);
        board.scores.insert(mark, convention.display(score));
    }
    board
}
