use serde::{Deserialize, Serialize};

/// Single dense-grid axis, used for both rows and columns.
pub type Coord = u8;

/// Position in the dense grid, `(row, col)`.
pub type DenseIndex = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for DenseIndex {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// How cells of a dense grid touch each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridLayout {
    /// Plain squares, eight neighbours.
    Square,
    /// Hexagons packed in rows, odd rows drawn half a cell to the right.
    OffsetHex,
}

impl GridLayout {
    fn displacements(self, row: Coord) -> &'static [(isize, isize)] {
        match self {
            Self::Square => &SQUARE_DISPLACEMENTS,
            Self::OffsetHex if row % 2 == 0 => &EVEN_ROW_HEX_DISPLACEMENTS,
            Self::OffsetHex => &ODD_ROW_HEX_DISPLACEMENTS,
        }
    }
}

const SQUARE_DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const EVEN_ROW_HEX_DISPLACEMENTS: [(isize, isize); 6] =
    [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];

const ODD_ROW_HEX_DISPLACEMENTS: [(isize, isize); 6] =
    [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// Applies `delta` to `index`, returning a value only when it remains in bounds.
///
/// Indices, deltas and bounds are all `(row, col)`.
fn apply_delta(index: DenseIndex, delta: (isize, isize), bounds: DenseIndex) -> Option<DenseIndex> {
    let (row, col) = index;
    let (dr, dc) = delta;
    let (rows, cols) = bounds;

    let next_row = row.checked_add_signed(dr.try_into().ok()?)?;
    if next_row >= rows {
        return None;
    }

    let next_col = col.checked_add_signed(dc.try_into().ok()?)?;
    if next_col >= cols {
        return None;
    }

    Some((next_row, next_col))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: DenseIndex,
    bounds: DenseIndex,
    displacements: &'static [(isize, isize)],
    index: u8,
}

impl NeighborIter {
    pub fn new(center: DenseIndex, bounds: DenseIndex, layout: GridLayout) -> Self {
        Self {
            center,
            bounds,
            displacements: layout.displacements(center.0),
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = DenseIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *self.displacements.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}
