use core::ops::{Index, IndexMut};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{CellState, Coord, DenseIndex, GridLayout, NeighborIter, Piece, ToNdIndex};

/// Fixed-size rectangle of cells handed to the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseGrid {
    cells: Array2<CellState>,
}

impl DenseGrid {
    /// A grid where every cell is [`CellState::Unplayable`].
    pub fn new(size: DenseIndex) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> DenseIndex {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn contains(&self, (row, col): DenseIndex) -> bool {
        let (rows, cols) = self.size();
        row < rows && col < cols
    }

    pub fn get(&self, index: DenseIndex) -> Option<CellState> {
        self.contains(index).then(|| self[index])
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (DenseIndex, CellState)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    pub fn occupied(&self) -> impl Iterator<Item = (DenseIndex, Piece)> + '_ {
        self.iter()
            .filter_map(|(index, cell)| cell.piece().map(|piece| (index, piece)))
    }

    /// Playable cells touching `index`.
    pub fn playable_neighbors(
        &self,
        index: DenseIndex,
        layout: GridLayout,
    ) -> impl Iterator<Item = DenseIndex> + '_ {
        NeighborIter::new(index, self.size(), layout).filter(|&next| self[next].is_playable())
    }
}

impl Index<DenseIndex> for DenseGrid {
    type Output = CellState;

    fn index(&self, index: DenseIndex) -> &Self::Output {
        &self.cells[index.to_nd_index()]
    }
}

impl IndexMut<DenseIndex> for DenseGrid {
    fn index_mut(&mut self, index: DenseIndex) -> &mut Self::Output {
        &mut self.cells[index.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerMark;
    use alloc::vec::Vec;

    #[test]
    fn new_grid_is_unplayable() {
        let grid = DenseGrid::new((2, 3));
        assert_eq!(grid.size(), (2, 3));
        assert!(grid.iter().all(|(_, cell)| cell == CellState::Unplayable));
        assert_eq!(grid.get((2, 0)), None);
    }

    #[test]
    fn occupied_lists_pieces_in_row_major_order() {
        let mut grid = DenseGrid::new((2, 2));
        grid[(1, 0)] = CellState::Occupied(Piece::new(PlayerMark::Cross));
        grid[(0, 1)] = CellState::Occupied(Piece::new(PlayerMark::Nought));

        let pieces: Vec<_> = grid.occupied().collect();
        assert_eq!(
            pieces,
            [
                ((0, 1), Piece::new(PlayerMark::Nought)),
                ((1, 0), Piece::new(PlayerMark::Cross)),
            ]
        );
    }

    #[test]
    fn playable_neighbors_skip_unplayable_cells() {
        let mut grid = DenseGrid::new((3, 3));
        grid[(0, 1)] = CellState::Empty;
        grid[(1, 1)] = CellState::Empty;

        let neighbors: Vec<_> = grid.playable_neighbors((0, 0), GridLayout::Square).collect();
        assert_eq!(neighbors, [(0, 1), (1, 1)]);
    }
}
