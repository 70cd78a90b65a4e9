use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Board does not match the requested size and mine count")]
    InvalidBoardShape,
    #[error("Too many mines, requested {requested} but at most {max} fit")]
    TooManyMines { requested: CellCount, max: CellCount },
}

pub type Result<T> = core::result::Result<T, GameError>;
