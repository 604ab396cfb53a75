use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use hashbrown::HashMap;
use log::debug;
use smallvec::SmallVec;
use tessera_protocol::{PlayerDescriptor, PlayerId};

use crate::{Ambiguity, NativeBoard, PlayerMark, Result, ViewerError};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResolveOutcome {
    NoChange,
    Resolved,
}

/// Monotonic memo of which mark each raw player id plays.
///
/// An id is either unresolved or bound to one mark for the rest of the
/// session. No two ids ever share a mark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdentityCache {
    marks: HashMap<PlayerId, PlayerMark>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_of(&self, id: PlayerId) -> Option<PlayerMark> {
        self.marks.get(&id).copied()
    }

    pub fn holder_of(&self, mark: PlayerMark) -> Option<PlayerId> {
        self.marks
            .iter()
            .find_map(|(&id, &held)| (held == mark).then_some(id))
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Binds `id` to `mark` unless that contradicts an earlier binding.
    pub fn declare(&mut self, id: PlayerId, mark: PlayerMark) -> Result<ResolveOutcome> {
        if let Some(held) = self.mark_of(id) {
            if held == mark {
                return Ok(ResolveOutcome::NoChange);
            }
            return Err(ViewerError::AmbiguousPlayerIdentity {
                id,
                reason: Ambiguity::Reassigned {
                    held,
                    claimed: mark,
                },
            });
        }
        if self.holder_of(mark).is_some() {
            return Err(ViewerError::AmbiguousPlayerIdentity {
                id,
                reason: Ambiguity::MarkContested(mark),
            });
        }

        debug!("Player {id} plays {mark:?}");
        self.marks.insert(id, mark);
        Ok(ResolveOutcome::Resolved)
    }

    /// Resolves still-unknown `ids` from the piece types of the cells they own.
    ///
    /// An id is only bound when its pieces show exactly one mark and no other
    /// id claims that mark in the same pass. Everything else stays unresolved
    /// and is reported back.
    pub fn observe_board(
        &mut self,
        ids: impl IntoIterator<Item = PlayerId>,
        board: &NativeBoard,
    ) -> Vec<ViewerError> {
        let mut errors = Vec::new();
        let unresolved: BTreeSet<PlayerId> = ids
            .into_iter()
            .filter(|&id| self.mark_of(id).is_none())
            .collect();

        let mut claims: BTreeMap<PlayerMark, SmallVec<[PlayerId; 2]>> = BTreeMap::new();
        for id in unresolved {
            let mut marks: SmallVec<[PlayerMark; 2]> = SmallVec::new();
            let evidence = board
                .owned_by(id)
                .filter_map(|entry| entry.piece_type.as_deref())
                .filter_map(|tag| PlayerMark::from_piece_type(tag).ok());
            for mark in evidence {
                if !marks.contains(&mark) {
                    marks.push(mark);
                }
            }

            match marks.as_slice() {
                [] => errors.push(ViewerError::AmbiguousPlayerIdentity {
                    id,
                    reason: Ambiguity::NoEvidence,
                }),
                &[mark] => claims.entry(mark).or_default().push(id),
                several => errors.push(ViewerError::AmbiguousPlayerIdentity {
                    id,
                    reason: Ambiguity::SeveralMarks(several.len()),
                }),
            }
        }

        for (mark, claimants) in claims {
            if let [id] = claimants.as_slice() {
                if let Err(err) = self.declare(*id, mark) {
                    errors.push(err);
                }
            } else {
                errors.extend(claimants.iter().map(|&id| ViewerError::AmbiguousPlayerIdentity {
                    id,
                    reason: Ambiguity::MarkContested(mark),
                }));
            }
        }

        errors
    }

    /// Feeds one message's worth of evidence into the memo.
    ///
    /// Player profiles that name their piece type are taken first, then every
    /// other id mentioned by the message or owning a piece is resolved from
    /// the board.
    pub fn observe(
        &mut self,
        players: &[PlayerDescriptor],
        next_player: Option<&PlayerDescriptor>,
        board: &NativeBoard,
    ) -> Vec<ViewerError> {
        let mut errors = Vec::new();
        let descriptors = players.iter().chain(next_player);

        for descriptor in descriptors.clone() {
            let (Some(id), Some(tag)) = (descriptor.id(), descriptor.piece_type()) else {
                continue;
            };
            let declared = PlayerMark::from_piece_type(tag).and_then(|mark| self.declare(id, mark));
            if let Err(err) = declared {
                errors.push(err);
            }
        }

        let ids = descriptors
            .filter_map(PlayerDescriptor::id)
            .chain(board.iter().filter_map(|entry| entry.owner));
        errors.extend(self.observe_board(ids, board));
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NativeCoord, NativeEntry};
    use alloc::string::ToString;
    use alloc::vec;
    use tessera_protocol::PlayerProfile;

    fn piece(x: i32, y: i32, tag: &str, owner: PlayerId) -> NativeEntry {
        NativeEntry::new(NativeCoord(x, y))
            .with_piece_type(tag)
            .with_owner(owner)
    }

    fn bare(id: PlayerId) -> PlayerDescriptor {
        PlayerDescriptor::Bare(id.to_string())
    }

    #[test]
    fn resolves_bare_id_from_owned_cells() {
        let board = NativeBoard::from_entries([piece(4, 4, "W", 7), piece(0, 4, "B", 8)]).unwrap();
        let mut cache = IdentityCache::new();

        let errors = cache.observe(&[bare(7), bare(8)], None, &board);

        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(cache.mark_of(7), Some(PlayerMark::White));
        assert_eq!(cache.mark_of(8), Some(PlayerMark::Black));
    }

    #[test]
    fn resolution_survives_missing_evidence() {
        let mut cache = IdentityCache::new();
        let first = NativeBoard::from_entries([piece(4, 4, "W", 7)]).unwrap();
        cache.observe(&[bare(7)], None, &first);

        let errors = cache.observe(&[bare(7)], None, &NativeBoard::new());

        assert!(errors.is_empty());
        assert_eq!(cache.mark_of(7), Some(PlayerMark::White));
    }

    #[test]
    fn unknown_owner_stays_unresolved() {
        let mut cache = IdentityCache::new();

        let errors = cache.observe(&[bare(7)], None, &NativeBoard::new());

        assert_eq!(
            errors,
            vec![ViewerError::AmbiguousPlayerIdentity {
                id: 7,
                reason: Ambiguity::NoEvidence
            }]
        );
        assert!(errors[0].is_pending_identity());
        assert_eq!(cache.mark_of(7), None);
    }

    #[test]
    fn mixed_evidence_is_not_guessed() {
        let board = NativeBoard::from_entries([piece(0, 0, "W", 7), piece(1, 1, "B", 7)]).unwrap();
        let mut cache = IdentityCache::new();

        let errors = cache.observe_board([7], &board);

        assert_eq!(
            errors,
            vec![ViewerError::AmbiguousPlayerIdentity {
                id: 7,
                reason: Ambiguity::SeveralMarks(2)
            }]
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn simultaneous_claims_leave_both_unresolved() {
        let board = NativeBoard::from_entries([piece(0, 0, "W", 7), piece(1, 1, "W", 8)]).unwrap();
        let mut cache = IdentityCache::new();

        let errors = cache.observe_board([8, 7], &board);

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|err| matches!(
            err,
            ViewerError::AmbiguousPlayerIdentity {
                reason: Ambiguity::MarkContested(PlayerMark::White),
                ..
            }
        )));
        assert!(cache.is_empty());
    }

    #[test]
    fn declared_profile_wins_and_is_never_reassigned() {
        let profile = PlayerDescriptor::Profile(PlayerProfile {
            id: 3,
            name: None,
            piece_type: Some("B".to_string()),
            player_type: None,
        });
        let mut cache = IdentityCache::new();
        assert!(cache.observe(&[profile], None, &NativeBoard::new()).is_empty());

        assert_eq!(
            cache.declare(3, PlayerMark::White),
            Err(ViewerError::AmbiguousPlayerIdentity {
                id: 3,
                reason: Ambiguity::Reassigned {
                    held: PlayerMark::Black,
                    claimed: PlayerMark::White
                }
            })
        );
        assert_eq!(
            cache.declare(4, PlayerMark::Black),
            Err(ViewerError::AmbiguousPlayerIdentity {
                id: 4,
                reason: Ambiguity::MarkContested(PlayerMark::Black)
            })
        );
        assert_eq!(cache.declare(3, PlayerMark::Black), Ok(ResolveOutcome::NoChange));
        assert_eq!(cache.mark_of(3), Some(PlayerMark::Black));
    }
}
