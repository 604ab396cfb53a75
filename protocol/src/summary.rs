use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PlayerId, unwrap_encoded};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Game played out to the end.
    Done,
    /// A player was disqualified (timeout or illegal action).
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
}

/// The `done` event sent once a game is over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoneMessage {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
    #[serde(default)]
    pub scores: BTreeMap<PlayerId, f64>,
    #[serde(default)]
    pub winners_id: Vec<PlayerId>,
    pub status: GameStatus,
}

impl DoneMessage {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(unwrap_encoded(value)?)
    }
}

/// A recorded game: every `play` payload in order plus the final summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub steps: Vec<Value>,
    #[serde(default)]
    pub final_summary: Option<DoneMessage>,
}

impl Recording {
    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn done_message_from_encoded_text() {
        let text = json!({
            "players": [{"id": 7, "name": "alice"}, {"id": 8, "name": "bob"}],
            "scores": {"7": -1.0, "8": -6.0},
            "custom_stats": [],
            "winners_id": [7],
            "status": "done"
        })
        .to_string();

        let done = DoneMessage::from_value(Value::String(text)).unwrap();

        assert_eq!(done.status, GameStatus::Done);
        assert_eq!(done.winners_id, vec![7]);
        assert_eq!(done.players[1].name.as_deref(), Some("bob"));
        assert_eq!(done.scores[&8], -6.0);
    }

    #[test]
    fn cancelled_status() {
        let done = DoneMessage::from_value(json!({"status": "cancelled"})).unwrap();
        assert_eq!(done.status, GameStatus::Cancelled);
        assert!(done.players.is_empty());
    }

    #[test]
    fn recording_without_summary() {
        let recording = Recording::from_text(r#"{"steps": [{"rep": {"env": {}}}], "final_summary": null}"#).unwrap();
        assert_eq!(recording.steps.len(), 1);
        assert!(recording.final_summary.is_none());
    }
}
