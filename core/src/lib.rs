//! Game logic for a classic minesweeper: deferred first-click-safe board generation, flood reveal and the win/loss
//! state machine. Rendering and input plumbing live outside this crate, they drive a [`GameSession`] and read
//! [`Tile`]s or a [`Snapshot`] back.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use snapshot::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod session;
mod snapshot;
mod tile;
mod types;

/// Board dimensions and mine count, fixed for the lifetime of a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    size: Coord2,
    mines: CellCount,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates a configuration, both dimensions must be positive and at least one cell must stay free of mines.
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::EmptyBoard);
        }
        let max = mult(height, width) - 1;
        if mines > max {
            return Err(GameError::TooManyMines {
                requested: mines,
                max,
            });
        }
        Ok(Self::new_unchecked((height, width), mines))
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((16, 30), 99)
    }

    /// `(rows, cols)`
    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn width(&self) -> Coord {
        self.size.1
    }

    pub const fn height(&self) -> Coord {
        self.size.0
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.size.0 && coords.1 < self.size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::expert()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
    /// The mark completed the board.
    Won,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
            Self::Won => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}
