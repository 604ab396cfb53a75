//! Wire types exchanged with the game engine relay.
//!
//! Everything here is plain data: the engine side speaks JSON, sometimes with a
//! payload that was `json.dumps`-ed more than once, so the decoding helpers peel
//! those string layers before handing the value to serde.

use serde_json::Value;

pub use frame::*;
pub use play::*;
pub use summary::*;

mod frame;
mod play;
mod summary;

/// Raw player identifier as emitted by the engine.
pub type PlayerId = i64;

/// Native coordinate as it travels in outgoing actions, `[first, second]`.
pub type WireCoord = [i32; 2];

/// How many times a payload may be wrapped in a JSON string before we give up.
pub const MAX_ENCODING_DEPTH: usize = 2;

/// Decodes string-wrapped JSON until a non-string value shows up.
pub fn unwrap_encoded(mut value: Value) -> serde_json::Result<Value> {
    for _ in 0..MAX_ENCODING_DEPTH {
        match value {
            Value::String(text) => value = serde_json::from_str(&text)?,
            other => return Ok(other),
        }
    }
    Ok(value)
}
