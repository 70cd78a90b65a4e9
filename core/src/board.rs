use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::types::grid_size;
use crate::*;

/// Mine layout together with the adjacency value of every cell, derived once at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    contents: Array2<CellContent>,
    mine_count: CellCount,
}

impl Board {
    /// Derives the adjacency grid from a `(rows, cols)` mask of mine positions.
    ///
    /// Fails with [`GameError::EmptyBoard`] on a zero axis and [`GameError::InvalidBoardShape`] when an axis does not
    /// fit in a [`Coord`].
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mine_mask.dim();
        if rows == 0 || cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if Coord::try_from(rows).is_err() || Coord::try_from(cols).is_err() {
            return Err(GameError::InvalidBoardShape);
        }

        let contents = Array2::from_shape_fn(mine_mask.dim(), |(row, col)| {
            if mine_mask[(row, col)] {
                return CellContent::Mine;
            }
            // both axes fit in a Coord, checked above
            let coords = (row as Coord, col as Coord);
            let count = mine_mask
                .iter_neighbors(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count();
            // at most 8 neighbors
            CellContent::from_adjacent_mines(count as u8)
        });
        // 255 * 255 cells fit in a CellCount
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;

        Ok(Self {
            contents,
            mine_count,
        })
    }

    /// Builds a board with mines at the given `(row, col)` positions, duplicates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// `(rows, cols)`
    pub fn size(&self) -> Coord2 {
        grid_size(&self.contents)
    }

    pub fn total_cells(&self) -> CellCount {
        self.contents.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn is_mine(&self, coords: Coord2) -> Result<bool> {
        self.adjacency(coords).map(CellContent::is_mine)
    }

    /// Content of the cell: `Mine`, `Empty` or the number of adjacent mines.
    pub fn adjacency(&self, coords: Coord2) -> Result<CellContent> {
        let coords = self.validate_coords(coords)?;
        Ok(self[coords])
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.contents.iter_neighbors(coords)
    }

    /// All mine positions in row-major order.
    pub fn mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.contents
            .indexed_iter()
            .filter(|(_, content)| content.is_mine())
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }
}

impl Index<Coord2> for Board {
    type Output = CellContent;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.contents[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_counts_moore_neighbors() {
        let board = Board::from_mine_coords((3, 3), &[(0, 0), (0, 2)]).unwrap();

        assert_eq!(board.adjacency((0, 1)), Ok(CellContent::Adjacent(2)));
        assert_eq!(board.adjacency((1, 1)), Ok(CellContent::Adjacent(2)));
        assert_eq!(board.adjacency((1, 0)), Ok(CellContent::Adjacent(1)));
        assert_eq!(board.adjacency((2, 1)), Ok(CellContent::Empty));
        assert_eq!(board.adjacency((0, 0)), Ok(CellContent::Mine));
    }

    #[test]
    fn adjacency_does_not_wrap_around_edges() {
        let board = Board::from_mine_coords((3, 4), &[(1, 0)]).unwrap();

        assert_eq!(board[(1, 3)], CellContent::Empty);
        assert_eq!(board[(0, 3)], CellContent::Empty);
        assert_eq!(board[(2, 1)], CellContent::Adjacent(1));
    }

    #[test]
    fn fully_surrounded_cell_counts_eight() {
        let mines: Vec<Coord2> = NeighborIter::new((1, 1), (3, 3)).collect();
        let board = Board::from_mine_coords((3, 3), &mines).unwrap();

        assert_eq!(board[(1, 1)], CellContent::Adjacent(8));
        assert_eq!(board.mine_count(), 8);
        assert_eq!(board.safe_cell_count(), 1);
    }

    #[test]
    fn queries_reject_out_of_bounds() {
        let board = Board::from_mine_coords((2, 3), &[(0, 0)]).unwrap();

        assert_eq!(board.is_mine((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.adjacency((0, 3)), Err(GameError::InvalidCoords));
        assert_eq!(board.is_mine((0, 0)), Ok(true));
    }

    #[test]
    fn from_mine_coords_rejects_outside_mines_and_merges_duplicates() {
        assert_eq!(
            Board::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );

        let board = Board::from_mine_coords((2, 2), &[(1, 1), (1, 1)]).unwrap();
        assert_eq!(board.mine_count(), 1);
        assert_eq!(board.mine_coords().collect::<Vec<_>>(), vec![(1, 1)]);
    }

    #[test]
    fn from_mine_mask_rejects_shapes_beyond_coord_range() {
        let mut tall: Array2<bool> = Array2::default((300, 1));
        tall[(0, 0)] = true;
        assert_eq!(Board::from_mine_mask(tall), Err(GameError::InvalidBoardShape));

        let wide: Array2<bool> = Array2::default((1, 256));
        assert_eq!(Board::from_mine_mask(wide), Err(GameError::InvalidBoardShape));

        let empty: Array2<bool> = Array2::default((0, 4));
        assert_eq!(Board::from_mine_mask(empty), Err(GameError::EmptyBoard));
    }

    #[test]
    fn largest_board_reports_consistent_counts() {
        let mut mask: Array2<bool> = Array2::default((255, 255));
        mask[(254, 254)] = true;

        let board = Board::from_mine_mask(mask).unwrap();

        assert_eq!(board.size(), (255, 255));
        assert_eq!(board.total_cells(), 65025);
        assert_eq!(board.safe_cell_count(), 65024);
        assert_eq!(board[(253, 253)], CellContent::Adjacent(1));
    }

    #[test]
    fn game_config_reflects_layout() {
        let board = Board::from_mine_coords((4, 5), &[(3, 4), (0, 0)]).unwrap();
        let config = board.game_config();

        assert_eq!(config.size(), (4, 5));
        assert_eq!(config.mines(), 2);
    }
}
