use alloc::string::ToString;

use tessera_protocol::Interact;

use crate::{CoordinateTable, DenseIndex, PlayerMark, Result};

/// Move of the `mark` piece at `from` to `to`, in native coordinates.
pub fn encode_move(
    table: &CoordinateTable,
    from: DenseIndex,
    to: DenseIndex,
    mark: PlayerMark,
) -> Result<Interact> {
    Ok(Interact::Move {
        from: table.native_of(from)?.to_wire(),
        to: table.native_of(to)?.to_wire(),
        piece_type: mark.piece_type().to_string(),
    })
}

pub fn encode_place(table: &CoordinateTable, position: DenseIndex) -> Result<Interact> {
    Ok(Interact::Place {
        position: table.native_of(position)?.to_wire(),
    })
}
