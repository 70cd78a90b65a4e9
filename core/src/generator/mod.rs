use crate::*;
pub use random::*;

mod random;

/// Produces the board for a match once the first reveal is known.
pub trait BoardGenerator {
    /// The returned board always has `config`'s size and mine count.
    fn generate(&mut self, config: GameConfig, safe_cell: Coord2) -> Result<Board>;
}

/// How much protection the first revealed cell gets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartTile {
    /// No protection, the first reveal may hit a mine.
    Random,
    /// The first reveal is never a mine.
    SimpleSafe,
    /// The first reveal is never a mine nor next to one, so it always opens a region.
    #[default]
    AlwaysZero,
}

impl StartTile {
    /// Whether a generated board satisfies this policy at the start cell.
    pub const fn accepts(self, content: CellContent) -> bool {
        match self {
            Self::Random => true,
            Self::SimpleSafe => !content.is_mine(),
            Self::AlwaysZero => content.is_empty(),
        }
    }
}

/// Hands out a prepared board every time, ignoring where the player clicks first.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBoardGenerator {
    board: Board,
}

impl FixedBoardGenerator {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        Board::from_mine_coords(size, mine_coords).map(Self::new)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}

impl BoardGenerator for FixedBoardGenerator {
    fn generate(&mut self, config: GameConfig, _safe_cell: Coord2) -> Result<Board> {
        if config != self.board.game_config() {
            log::warn!(
                "Fixed board does not match requested config, board: {:?}, requested: {:?}",
                self.board.game_config(),
                config
            );
            return Err(GameError::InvalidBoardShape);
        }
        Ok(self.board.clone())
    }
}
