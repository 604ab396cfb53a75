#![no_std]

extern crate alloc;

pub use action::*;
pub use board::*;
pub use cell::*;
pub use coord::*;
pub use error::*;
pub use grid::*;
pub use history::*;
pub use identity::*;
pub use score::*;
pub use session::*;
pub use snapshot::*;
pub use table::*;
pub use transcode::*;
pub use types::*;
pub use variant::*;

mod action;
mod board;
mod cell;
mod coord;
mod error;
mod grid;
mod history;
mod identity;
mod score;
mod session;
mod snapshot;
mod table;
mod transcode;
mod types;
mod variant;
