use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashSet;
use log::trace;
use tessera_protocol::{EnvPiece, PlayerId, RawPiece, Representation};

use crate::{NativeCoord, Result, ViewerError};

/// One occupied cell as the engine describes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeEntry {
    pub coord: NativeCoord,
    pub piece_type: Option<String>,
    pub owner: Option<PlayerId>,
    pub height: Option<u8>,
}

impl NativeEntry {
    pub fn new(coord: NativeCoord) -> Self {
        Self {
            coord,
            piece_type: None,
            owner: None,
            height: None,
        }
    }

    pub fn with_piece_type(mut self, piece_type: &str) -> Self {
        self.piece_type = Some(piece_type.to_string());
        self
    }

    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_height(mut self, height: u8) -> Self {
        self.height = Some(height);
        self
    }

    fn from_raw(coord: NativeCoord, raw: RawPiece) -> Self {
        Self {
            coord,
            owner: raw.owner(),
            piece_type: raw.piece_type,
            height: raw.value,
        }
    }
}

/// The engine's sparse board with every key parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeBoard {
    entries: Vec<NativeEntry>,
}

impl NativeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = NativeEntry>) -> Result<Self> {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.coord) {
                return Err(ViewerError::DuplicateCoordinate(entry.coord));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_representation(rep: &Representation) -> Result<Self> {
        match rep {
            Representation::Env { env: pieces } | Representation::Keyed { board: pieces } => {
                Self::from_entries(
                    pieces
                        .iter()
                        .map(|(key, piece)| keyed_entry(key, piece))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            Representation::Grid { board } => {
                let mut entries = Vec::new();
                for (i, row) in board.iter().enumerate() {
                    for (j, cell) in row.iter().enumerate() {
                        let Some(cell) = cell else {
                            continue;
                        };
                        let coord = NativeCoord(grid_component(i)?, grid_component(j)?);
                        entries.push(NativeEntry::from_raw(coord, cell.to_piece()));
                    }
                }
                trace!("Grid board with {} rows, {} pieces", board.len(), entries.len());
                Ok(Self { entries })
            }
        }
    }

    pub fn entries(&self) -> &[NativeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &NativeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn owned_by(&self, id: PlayerId) -> impl Iterator<Item = &NativeEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.owner == Some(id))
    }
}

fn keyed_entry(key: &str, piece: &EnvPiece) -> Result<NativeEntry> {
    let coord = key
        .parse::<NativeCoord>()
        .map_err(|source| ViewerError::InvalidCoordinate {
            key: key.to_string(),
            source,
        })?;
    Ok(NativeEntry::from_raw(coord, piece.decode()?))
}

fn grid_component(position: usize) -> Result<i32> {
    i32::try_from(position)
        .map_err(|_| ViewerError::MalformedMessage("board is too large".to_string()))
}
