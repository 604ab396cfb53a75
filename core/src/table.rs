use hashbrown::HashMap;
use ndarray::Array2;

use crate::{
    CellState, Coord, DenseGrid, DenseIndex, NativeCoord, Result, TableError, ToNdIndex,
    ViewerError,
};

/// Bijection between a variant's native coordinates and dense grid indices.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateTable {
    size: DenseIndex,
    forward: HashMap<NativeCoord, DenseIndex>,
    inverse: Array2<Option<NativeCoord>>,
}

impl CoordinateTable {
    pub fn new(
        size: DenseIndex,
        entries: impl IntoIterator<Item = (NativeCoord, DenseIndex)>,
    ) -> core::result::Result<Self, TableError> {
        let mut forward = HashMap::new();
        let mut inverse: Array2<Option<NativeCoord>> = Array2::default(size.to_nd_index());

        for (coord, index) in entries {
            if index.0 >= size.0 || index.1 >= size.1 {
                return Err(TableError::IndexOutOfBounds(index));
            }
            let slot = &mut inverse[index.to_nd_index()];
            if slot.is_some() {
                return Err(TableError::DuplicateIndex(index));
            }
            if forward.insert(coord, index).is_some() {
                return Err(TableError::DuplicateCoordinate(coord));
            }
            *slot = Some(coord);
        }

        Ok(Self {
            size,
            forward,
            inverse,
        })
    }

    /// Table for engines whose native `(row, col)` already is the dense index.
    pub fn identity(size: DenseIndex) -> Self {
        let forward = (0..size.0)
            .flat_map(|row| (0..size.1).map(move |col| (row, col)))
            .map(|index| (NativeCoord::from(index), index))
            .collect();
        let inverse = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            Some(NativeCoord::from((row as Coord, col as Coord)))
        });

        Self {
            size,
            forward,
            inverse,
        }
    }

    pub fn size(&self) -> DenseIndex {
        self.size
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn lookup(&self, coord: NativeCoord) -> Result<DenseIndex> {
        self.forward
            .get(&coord)
            .copied()
            .ok_or(ViewerError::UnmappedCoordinate(coord))
    }

    pub fn native_of(&self, index: DenseIndex) -> Result<NativeCoord> {
        if index.0 >= self.size.0 || index.1 >= self.size.1 {
            return Err(ViewerError::UnmappedIndex(index));
        }
        self.inverse[index.to_nd_index()].ok_or(ViewerError::UnmappedIndex(index))
    }

    /// Physical board shape: mapped cells are empty, everything else unplayable.
    pub fn baseline(&self) -> DenseGrid {
        let mut grid = DenseGrid::new(self.size);
        for &index in self.forward.values() {
            grid[index] = CellState::Empty;
        }
        grid
    }

    /// Entries in dense row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (NativeCoord, DenseIndex)> + '_ {
        self.inverse
            .indexed_iter()
            .filter_map(|((row, col), coord)| coord.map(|coord| (coord, (row as Coord, col as Coord))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_table_round_trips() {
        let table = CoordinateTable::identity((3, 3));
        assert_eq!(table.len(), 9);
        assert_eq!(table.lookup(NativeCoord(2, 1)), Ok((2, 1)));
        assert_eq!(table.native_of((2, 1)), Ok(NativeCoord(2, 1)));
        assert_eq!(
            table.lookup(NativeCoord(3, 0)),
            Err(ViewerError::UnmappedCoordinate(NativeCoord(3, 0)))
        );
        assert_eq!(table.native_of((0, 3)), Err(ViewerError::UnmappedIndex((0, 3))));
    }

    #[test]
    fn baseline_marks_unmapped_cells_unplayable() {
        let table =
            CoordinateTable::new((2, 2), [(NativeCoord(5, 5), (0, 1)), (NativeCoord(6, 6), (1, 0))])
                .unwrap();
        let baseline = table.baseline();

        assert_eq!(baseline[(0, 0)], CellState::Unplayable);
        assert_eq!(baseline[(0, 1)], CellState::Empty);
        assert_eq!(baseline[(1, 0)], CellState::Empty);
        assert_eq!(baseline[(1, 1)], CellState::Unplayable);
        assert_eq!(table.native_of((1, 1)), Err(ViewerError::UnmappedIndex((1, 1))));
    }

    #[test]
    fn rejects_non_bijective_entries() {
        assert_eq!(
            CoordinateTable::new((2, 2), [(NativeCoord(0, 0), (0, 0)), (NativeCoord(1, 1), (0, 0))]),
            Err(TableError::DuplicateIndex((0, 0)))
        );
        assert_eq!(
            CoordinateTable::new((2, 2), [(NativeCoord(0, 0), (0, 0)), (NativeCoord(0, 0), (1, 1))]),
            Err(TableError::DuplicateCoordinate(NativeCoord(0, 0)))
        );
        assert_eq!(
            CoordinateTable::new((2, 2), [(NativeCoord(0, 0), (2, 0))]),
            Err(TableError::IndexOutOfBounds((2, 0)))
        );
    }
}
