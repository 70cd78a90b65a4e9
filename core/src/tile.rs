use serde::{Deserialize, Serialize};

/// What a cell holds, fixed once the board is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    Mine,
    /// Safe cell with no mine among its neighbors.
    Empty,
    /// Safe cell next to `1..=8` mines.
    Adjacent(u8),
}

impl CellContent {
    pub const fn from_adjacent_mines(count: u8) -> Self {
        if count == 0 {
            Self::Empty
        } else {
            Self::Adjacent(count)
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of neighboring mines, `None` for a mine.
    pub const fn adjacent_mines(self) -> Option<u8> {
        match self {
            Self::Mine => None,
            Self::Empty => Some(0),
            Self::Adjacent(count) => Some(count),
        }
    }
}

/// Player-visible state of a cell, layered over its [`CellContent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
    Questioned,
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        !matches!(self, Self::Revealed)
    }

    /// Flags and question marks keep a cell from being revealed, directly or by flood.
    pub const fn is_marked(self) -> bool {
        matches!(self, Self::Flagged | Self::Questioned)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// How a cell should be drawn, combining its state, its content and the phase of the match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Hidden,
    Flag,
    Question,
    Empty,
    Number(u8),
    /// Unmarked mine shown after a loss.
    Mine,
    /// Flagged or question-marked mine shown after a loss.
    FlaggedMine,
    /// The mine that ended the match.
    Exploded,
}

impl Tile {
    // whether the tile is visually closed
    pub const fn is_closed(self) -> bool {
        use Tile::*;
        match self {
            Hidden => true,
            Flag => true,
            Question => true,
            Empty => false,
            Number(_) => false,
            Mine => false,
            FlaggedMine => false,
            Exploded => false,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Hidden
    }
}
