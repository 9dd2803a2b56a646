//! Error type for the minesweeper-logic crate

use thiserror::Error;

use crate::board::Cell;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
  #[error("cell {cell} is outside the {height}x{width} board")]
  OutOfBounds { cell: Cell, height: u32, width: u32 },

  #[error("cannot place {requested} mines on a board with {available} free cells")]
  TooManyMines { requested: u32, available: u32 },

  #[error("cell {cell} was deduced to be both a mine and safe")]
  Contradiction { cell: Cell },

  #[error("cell {cell} was already revealed with count {previous}, got {count}")]
  ConflictingCount { cell: Cell, previous: u32, count: u32 },

  #[error("sentence claims {count} mines among {cells} cells")]
  InvalidSentence { cells: usize, count: i64 },

  #[error("invalid configuration: {message}")]
  InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
