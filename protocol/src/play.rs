use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PlayerId, unwrap_encoded};

/// Player type the engine reports for a human sitting at the viewer.
pub const INTERACTIVE_PLAYER_TYPE: &str = "interactive";

/// One `play` event: the full game state after a move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayMessage {
    pub rep: Representation,
    #[serde(default)]
    pub scores: BTreeMap<PlayerId, f64>,
    #[serde(default)]
    pub players: Vec<PlayerDescriptor>,
    #[serde(default)]
    pub next_player: Option<PlayerDescriptor>,
    /// Remaining clock per player, in seconds.
    #[serde(default)]
    pub remaining_time: BTreeMap<PlayerId, f64>,
}

impl PlayMessage {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(unwrap_encoded(value)?)
    }

    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }
}

/// Board as serialized by the engine.
///
/// Hex games send a sparse `env` keyed by `"(x, y)"` strings, some engines name
/// the same map `board`, and square games send the full grid as nested lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Representation {
    Env {
        env: BTreeMap<String, EnvPiece>,
    },
    Keyed {
        board: BTreeMap<String, EnvPiece>,
    },
    Grid {
        board: Vec<Vec<Option<GridCell>>>,
    },
}

/// A piece value inside a keyed board, either inline or JSON-encoded text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvPiece {
    Piece(RawPiece),
    Encoded(String),
}

impl EnvPiece {
    pub fn decode(&self) -> serde_json::Result<RawPiece> {
        match self {
            Self::Piece(piece) => Ok(piece.clone()),
            Self::Encoded(text) => serde_json::from_str(text),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPiece {
    #[serde(default)]
    pub piece_type: Option<String>,
    #[serde(default)]
    pub owner_id: Option<PlayerId>,
    /// Stack height for stacking games.
    #[serde(default, alias = "height")]
    pub value: Option<u8>,
}

impl RawPiece {
    /// Owner id, the engine uses `-1` for pieces nobody owns.
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner_id.filter(|&id| id >= 0)
    }
}

/// One occupied cell of a grid-form board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridCell {
    Stacked(PlayerId, String, u8),
    Owned(PlayerId, String),
    Mark(String),
}

impl GridCell {
    pub fn to_piece(&self) -> RawPiece {
        match self {
            Self::Stacked(owner, piece_type, height) => RawPiece {
                piece_type: Some(piece_type.clone()),
                owner_id: Some(*owner),
                value: Some(*height),
            },
            Self::Owned(owner, piece_type) => RawPiece {
                piece_type: Some(piece_type.clone()),
                owner_id: Some(*owner),
                value: None,
            },
            Self::Mark(piece_type) => RawPiece {
                piece_type: Some(piece_type.clone()),
                owner_id: None,
                value: None,
            },
        }
    }
}

/// Entry of the `players` list, or the `next_player` field.
///
/// Older engines only send the id (usually as a string), newer ones send the
/// whole player profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerDescriptor {
    Profile(PlayerProfile),
    Number(PlayerId),
    Bare(String),
}

impl PlayerDescriptor {
    /// `None` when a bare id is not an integer.
    pub fn id(&self) -> Option<PlayerId> {
        match self {
            Self::Profile(profile) => Some(profile.id),
            Self::Number(id) => Some(*id),
            Self::Bare(text) => text.trim().parse().ok(),
        }
    }

    pub fn piece_type(&self) -> Option<&str> {
        match self {
            Self::Profile(profile) => profile.piece_type.as_deref(),
            Self::Number(_) | Self::Bare(_) => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        match self {
            Self::Profile(profile) => profile.player_type.as_deref() == Some(INTERACTIVE_PLAYER_TYPE),
            Self::Number(_) | Self::Bare(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub piece_type: Option<String>,
    #[serde(default)]
    pub player_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_hex_env_with_bare_player_ids() {
        let msg = PlayMessage::from_value(json!({
            "rep": {
                "env": {"(4, 4)": {"piece_type": "W", "owner_id": 7}},
                "dimensions": [17, 9]
            },
            "scores": {"7": -3.0, "8": 0.0},
            "players": ["7", "8"],
            "remaining_time": {"7": 899.5}
        }))
        .unwrap();

        let Representation::Env { env } = &msg.rep else {
            panic!("expected env representation, got {:?}", msg.rep);
        };
        let piece = env["(4, 4)"].decode().unwrap();
        assert_eq!(piece.piece_type.as_deref(), Some("W"));
        assert_eq!(piece.owner(), Some(7));
        assert_eq!(msg.scores[&7], -3.0);
        assert_eq!(msg.players[0].id(), Some(7));
        assert_eq!(msg.remaining_time[&7], 899.5);
        assert!(msg.next_player.is_none());
    }

    #[test]
    fn decodes_string_encoded_payload_and_pieces() {
        let piece = json!({"piece_type": "B", "owner_id": 3}).to_string();
        let payload = json!({"rep": {"board": {"(0, 4)": piece}}}).to_string();

        let msg = PlayMessage::from_value(Value::String(payload)).unwrap();

        let Representation::Keyed { board } = &msg.rep else {
            panic!("expected keyed representation, got {:?}", msg.rep);
        };
        assert_eq!(board["(0, 4)"].decode().unwrap().piece_type.as_deref(), Some("B"));
    }

    #[test]
    fn decodes_grid_cells_of_every_shape() {
        let msg = PlayMessage::from_text(
            r#"{"rep": {"board": [[[1, "R", 2], null], [[2, "Y"], "X"]]}}"#,
        )
        .unwrap();

        let Representation::Grid { board } = &msg.rep else {
            panic!("expected grid representation, got {:?}", msg.rep);
        };
        assert_eq!(board[0][0], Some(GridCell::Stacked(1, "R".to_string(), 2)));
        assert_eq!(board[0][1], None);
        assert_eq!(board[1][0], Some(GridCell::Owned(2, "Y".to_string())));
        assert_eq!(board[1][1], Some(GridCell::Mark("X".to_string())));
        assert_eq!(board[0][0].as_ref().unwrap().to_piece().value, Some(2));
    }

    #[test]
    fn player_profile_carries_mark_and_capability() {
        let next: PlayerDescriptor = serde_json::from_value(json!({
            "id": 12, "name": "alice", "piece_type": "B", "player_type": "interactive"
        }))
        .unwrap();

        assert_eq!(next.id(), Some(12));
        assert_eq!(next.piece_type(), Some("B"));
        assert!(next.is_interactive());
    }

    #[test]
    fn bare_player_id_must_be_numeric() {
        assert_eq!(PlayerDescriptor::Bare(" 42".to_string()).id(), Some(42));
        assert_eq!(PlayerDescriptor::Bare("alice".to_string()).id(), None);
    }

    #[test]
    fn unowned_piece_has_no_owner() {
        let piece = RawPiece {
            piece_type: Some("W".to_string()),
            owner_id: Some(-1),
            value: None,
        };
        assert_eq!(piece.owner(), None);
    }

    #[test]
    fn missing_rep_is_an_error() {
        assert!(PlayMessage::from_value(json!({"scores": {}})).is_err());
    }
}
