use core::fmt;
use std::collections::BTreeSet;

use board::{Board, Cell};
use rand::prelude::SliceRandom;
use rand::RngCore;
use tracing::debug;

pub mod autoplay;
pub mod board;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod sentence;
pub mod solver;

pub use error::{Error, Result};
pub use knowledge::{InferenceMode, KnowledgeBase};
pub use sentence::Sentence;
pub use solver::Solver;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Field {
  Mine,
  Empty(u32),
}

impl Field {
  pub fn is_mine(self) -> bool {
    matches!(self, Field::Mine)
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Field::Mine => write!(f, "X"),
      Field::Empty(0) => write!(f, " "),
      Field::Empty(mines) => write!(f, "{}", mines),
    }
  }
}

/// Ground truth: where the mines are and how many surround every other cell.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Minefield {
  board: Board<Field>,
  mines: BTreeSet<Cell>,
}

impl Minefield {
  pub fn new(mines: &Board<bool>) -> Self {
    let mut board = Board::new(mines.height, mines.width, Field::Empty(0));
    let mut mine_cells = BTreeSet::new();
    for (cell, &is_mine) in mines.enumerate() {
      board[cell] = if is_mine {
        mine_cells.insert(cell);
        Field::Mine
      } else {
        Field::Empty(mines.get_around(cell).filter(|&&m| m).count() as u32)
      };
    }

    Minefield {
      board,
      mines: mine_cells,
    }
  }

  pub fn height(&self) -> u32 {
    self.board.height
  }

  pub fn width(&self) -> u32 {
    self.board.width
  }

  pub fn mines(&self) -> &BTreeSet<Cell> {
    &self.mines
  }

  pub fn mine_count(&self) -> usize {
    self.mines.len()
  }

  pub fn is_mine(&self, cell: Cell) -> bool {
    self.mines.contains(&cell)
  }

  /// Mines among the neighbours of `cell`, not counting `cell` itself.
  pub fn nearby_mines(&self, cell: Cell) -> u32 {
    cell.neighbours().filter(|n| self.mines.contains(n)).count() as u32
  }

  pub fn field(&self, cell: Cell) -> Option<Field> {
    self.board.get(cell).copied()
  }
}

impl fmt::Debug for Minefield {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for row in 0..self.height() {
      for col in 0..self.width() {
        let cell = Cell::new(row as i32, col as i32);
        write!(f, "{}", self.board[cell])?;
      }
      writeln!(f)?;
    }

    Ok(())
  }
}

impl From<MinefieldBuilder> for Minefield {
  fn from(builder: MinefieldBuilder) -> Self {
    builder.build()
  }
}

pub struct MinefieldBuilder {
  mines: Board<bool>,
  rng: Box<dyn RngCore>,
}

impl MinefieldBuilder {
  pub fn new(height: u32, width: u32) -> Self {
    Self {
      mines: Board::new(height, width, false),
      rng: Box::new(rand::thread_rng()),
    }
  }

  pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
    self.rng = Box::new(rng);
    self
  }

  pub fn has_mine(&self, cell: Cell) -> bool {
    self.mines.get(cell).copied().unwrap_or(false)
  }

  pub fn set_mine(&mut self, cell: Cell) -> Result<()> {
    match self.mines.get_mut(cell) {
      Some(field) => {
        *field = true;
        Ok(())
      }
      None => Err(Error::OutOfBounds {
        cell,
        height: self.mines.height,
        width: self.mines.width,
      }),
    }
  }

  /// Scatters `mines` more mines over the cells that do not have one yet.
  pub fn add_random_mines(&mut self, mines: u32) -> Result<()> {
    let mut free: Vec<_> = self.mines.positions().filter(|&cell| !self.has_mine(cell)).collect();
    if free.len() < mines as usize {
      return Err(Error::TooManyMines {
        requested: mines,
        available: free.len() as u32,
      });
    }

    free.shuffle(&mut self.rng);
    for cell in free.into_iter().take(mines as usize) {
      self.mines[cell] = true;
    }
    Ok(())
  }

  pub fn build(self) -> Minefield {
    Minefield::new(&self.mines)
  }
}

/// A minefield as the player sees it: what has been revealed and flagged.
#[derive(Clone, PartialEq, Eq)]
pub struct Game {
  minefield: Minefield,
  revealed: Board<bool>,
  flags: BTreeSet<Cell>,
}

impl Game {
  pub fn minefield(&self) -> &Minefield {
    &self.minefield
  }

  pub fn height(&self) -> u32 {
    self.minefield.height()
  }

  pub fn width(&self) -> u32 {
    self.minefield.width()
  }

  pub fn is_mine(&self, cell: Cell) -> bool {
    self.minefield.is_mine(cell)
  }

  pub fn is_revealed(&self, cell: Cell) -> bool {
    self.revealed.get(cell).copied().unwrap_or(false)
  }

  /// Uncovers `cell`. `Field::Mine` means the game is lost.
  pub fn reveal(&mut self, cell: Cell) -> Result<Field> {
    let field = self.minefield.field(cell).ok_or(Error::OutOfBounds {
      cell,
      height: self.height(),
      width: self.width(),
    })?;
    self.revealed[cell] = true;
    debug!(%cell, %field, "revealed");
    Ok(field)
  }

  pub fn flag(&mut self, cell: Cell) -> bool {
    self.flags.insert(cell)
  }

  pub fn flags(&self) -> &BTreeSet<Cell> {
    &self.flags
  }

  /// Won once exactly the mines are flagged.
  pub fn has_won(&self) -> bool {
    &self.flags == self.minefield.mines()
  }
}

impl From<Minefield> for Game {
  fn from(minefield: Minefield) -> Self {
    Self {
      revealed: Board::new(minefield.height(), minefield.width(), false),
      flags: BTreeSet::new(),
      minefield,
    }
  }
}

impl From<MinefieldBuilder> for Game {
  fn from(builder: MinefieldBuilder) -> Self {
    Self::from(builder.build())
  }
}

impl fmt::Debug for Game {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for row in 0..self.height() {
      for col in 0..self.width() {
        let cell = Cell::new(row as i32, col as i32);
        if self.is_revealed(cell) {
          write!(f, "{}", self.minefield.board[cell])?;
        } else if self.flags.contains(&cell) {
          write!(f, "F")?;
        } else {
          write!(f, "░")?;
        }
      }
      writeln!(f)?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  fn minefield(height: u32, width: u32, mines: &[(i32, i32)]) -> Minefield {
    let mut builder = MinefieldBuilder::new(height, width);
    for &cell in mines {
      builder.set_mine(cell.into()).unwrap();
    }
    builder.build()
  }

  #[test]
  fn counts_surrounding_mines() {
    let field = minefield(3, 3, &[(0, 0), (2, 2)]);
    assert_eq!(field.nearby_mines(Cell::new(1, 1)), 2);
    assert_eq!(field.nearby_mines(Cell::new(0, 1)), 1);
    assert_eq!(field.nearby_mines(Cell::new(0, 2)), 0);
    assert_eq!(field.field(Cell::new(1, 1)), Some(Field::Empty(2)));
    assert_eq!(field.field(Cell::new(0, 0)), Some(Field::Mine));
    assert_eq!(format!("{:?}", field), "X1 \n121\n 1X\n");
  }

  #[test]
  fn random_mines_are_placed_exactly() {
    let mut builder = MinefieldBuilder::new(8, 8).with_rng(StdRng::seed_from_u64(1));
    builder.add_random_mines(10).unwrap();
    assert_eq!(builder.build().mine_count(), 10);
  }

  #[test]
  fn board_can_be_filled() {
    let mut builder = MinefieldBuilder::new(3, 4);
    builder.add_random_mines(12).unwrap();
    assert_eq!(builder.build().mine_count(), 12);
  }

  #[test]
  fn too_many_mines_is_an_error() {
    let mut builder = MinefieldBuilder::new(3, 4);
    builder.set_mine(Cell::new(0, 0)).unwrap();
    assert_eq!(
      builder.add_random_mines(12),
      Err(Error::TooManyMines {
        requested: 12,
        available: 11
      })
    );
  }

  #[test]
  fn seeded_layouts_repeat() {
    let layout = |seed| {
      let mut builder = MinefieldBuilder::new(6, 6).with_rng(StdRng::seed_from_u64(seed));
      builder.add_random_mines(9).unwrap();
      builder.build().mines().clone()
    };
    assert_eq!(layout(42), layout(42));
  }

  #[test]
  fn reveal_reports_field() {
    let mut game = Game::from(minefield(1, 2, &[(0, 1)]));
    assert_eq!(game.reveal(Cell::new(0, 0)), Ok(Field::Empty(1)));
    assert!(game.is_revealed(Cell::new(0, 0)));
    assert_eq!(game.reveal(Cell::new(0, 1)), Ok(Field::Mine));
    assert!(matches!(game.reveal(Cell::new(1, 0)), Err(Error::OutOfBounds { .. })));
  }

  #[test]
  fn won_when_flags_match_mines() {
    let mut game = Game::from(minefield(2, 2, &[(1, 1)]));
    assert!(!game.has_won());
    game.flag(Cell::new(0, 0));
    assert!(!game.has_won());
    assert_eq!(format!("{:?}", game), "F░\n░░\n");

    let mut game = Game::from(minefield(2, 2, &[(1, 1)]));
    game.flag(Cell::new(1, 1));
    assert!(game.has_won());
  }
}
