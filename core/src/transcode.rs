use log::trace;

use crate::{
    CellState, CoordinateTable, DenseGrid, IdentityCache, NativeBoard, NativeEntry, Piece,
    PlayerMark, Result, ViewerError,
};

/// Overlays the native board on the table's baseline grid.
///
/// Fails as a whole when any entry has no table image or no resolvable mark,
/// so a caller never sees a partially drawn board.
pub fn transcode(
    board: &NativeBoard,
    table: &CoordinateTable,
    identities: &IdentityCache,
) -> Result<DenseGrid> {
    let mut grid = table.baseline();
    for entry in board.iter() {
        let index = table.lookup(entry.coord)?;
        let mark = resolve_mark(entry, identities)?;
        grid[index] = CellState::Occupied(Piece {
            mark,
            height: entry.height,
        });
    }
    trace!("Transcoded {} pieces", board.len());
    Ok(grid)
}

fn resolve_mark(entry: &NativeEntry, identities: &IdentityCache) -> Result<PlayerMark> {
    if let Some(tag) = &entry.piece_type {
        return PlayerMark::from_piece_type(tag);
    }
    entry
        .owner
        .and_then(|owner| identities.mark_of(owner))
        .ok_or(ViewerError::UnresolvedPiece {
            coord: entry.coord,
            owner: entry.owner,
        })
}
