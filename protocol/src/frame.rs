use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WireCoord;

/// Frame pushed by the relay to viewers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerFrame {
    #[serde(rename = "play")]
    Play(Value),
    #[serde(rename = "done")]
    Done(Value),
    #[serde(rename = "ActionNotPermitted")]
    ActionNotPermitted,
}

impl ServerFrame {
    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Frame sent by a viewer back to the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientFrame {
    /// The engine expects the action itself as JSON text.
    #[serde(rename = "interact")]
    Interact(String),
}

impl ClientFrame {
    pub fn interact(action: &Interact) -> serde_json::Result<Self> {
        Ok(Self::Interact(serde_json::to_string(action)?))
    }

    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A move chosen by a human player, in native coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Interact {
    Move {
        from: WireCoord,
        to: WireCoord,
        #[serde(rename = "type")]
        piece_type: String,
    },
    Place {
        position: WireCoord,
    },
}
