use core::fmt;
use std::ops::{Add, Index, IndexMut};

use serde::{Deserialize, Serialize};

pub static NORTH: Cell = Cell::new(-1, 0);
pub static NORTH_EAST: Cell = Cell::new(-1, 1);
pub static EAST: Cell = Cell::new(0, 1);
pub static SOUTH_EAST: Cell = Cell::new(1, 1);
pub static SOUTH: Cell = Cell::new(1, 0);
pub static SOUTH_WEST: Cell = Cell::new(1, -1);
pub static WEST: Cell = Cell::new(0, -1);
pub static NORTH_WEST: Cell = Cell::new(-1, -1);

pub static DIRECTIONS: [Cell; 8] = [NORTH_WEST, NORTH, NORTH_EAST, WEST, EAST, SOUTH_WEST, SOUTH, SOUTH_EAST];

/// A `(row, col)` coordinate. Signed so that neighbour arithmetic may step off
/// the grid; boards decide what is in range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
  pub row: i32,
  pub col: i32,
}

impl Cell {
  pub const fn new(row: i32, col: i32) -> Cell {
    Cell { row, col }
  }

  /// The eight surrounding cells, in bounds or not.
  pub fn neighbours(self) -> impl Iterator<Item = Cell> {
    DIRECTIONS.iter().map(move |&dir| dir + self)
  }
}

impl fmt::Debug for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

impl Add<Cell> for Cell {
  type Output = Cell;

  fn add(self, rhs: Cell) -> Self::Output {
    Cell::new(self.row + rhs.row, self.col + rhs.col)
  }
}

impl From<(i32, i32)> for Cell {
  fn from((row, col): (i32, i32)) -> Self {
    Cell::new(row, col)
  }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board<T> {
  pub height: u32,
  pub width: u32,
  fields: Vec<T>,
}

impl<T> Board<T> {
  pub fn new(height: u32, width: u32, default: T) -> Self
  where
    T: Clone,
  {
    Self {
      height,
      width,
      fields: vec![default; width as usize * height as usize],
    }
  }

  fn cell_to_index(&self, cell: Cell) -> Option<usize> {
    match (usize::try_from(cell.row), usize::try_from(cell.col)) {
      (Ok(row), Ok(col)) if row < self.height as usize && col < self.width as usize => {
        Some(col + row * (self.width as usize))
      }
      _ => None,
    }
  }

  pub fn contains(&self, cell: Cell) -> bool {
    self.cell_to_index(cell).is_some()
  }

  pub fn area(&self) -> usize {
    self.fields.len()
  }

  pub fn get(&self, cell: Cell) -> Option<&T> {
    self.cell_to_index(cell).and_then(|i| self.fields.get(i))
  }

  pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
    self.cell_to_index(cell).and_then(|i| self.fields.get_mut(i))
  }

  /// In-bounds neighbours of `cell`.
  pub fn neighbours_of(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
    cell.neighbours().filter(move |&n| self.contains(n))
  }

  pub fn get_around(&self, cell: Cell) -> impl Iterator<Item = &T> {
    cell.neighbours().flat_map(|n| self.get(n))
  }

  pub fn positions(&self) -> CellIterator {
    CellIterator::new(self.height, self.width)
  }

  pub fn enumerate(&self) -> impl Iterator<Item = (Cell, &T)> {
    self.positions().zip(self.fields.iter())
  }
}

impl<T> Index<Cell> for Board<T> {
  type Output = T;

  fn index(&self, index: Cell) -> &Self::Output {
    self.get(index).unwrap_or_else(|| {
      panic!(
        "Cannot access cell {:?} on board with size {}x{}",
        index, self.height, self.width
      )
    })
  }
}

impl<T> IndexMut<Cell> for Board<T> {
  fn index_mut(&mut self, index: Cell) -> &mut T {
    let (height, width) = (self.height, self.width);
    self.get_mut(index).unwrap_or_else(|| {
      panic!(
        "Cannot mut-access cell {:?} on board with size {}x{}",
        index, height, width
      )
    })
  }
}

/// Row-major walk over every cell of a `height x width` grid.
pub struct CellIterator {
  next: Cell,
  height: i32,
  width: i32,
}

impl CellIterator {
  pub fn new(height: u32, width: u32) -> Self {
    let height = height as i32;
    Self {
      next: if width == 0 { Cell::new(height, 0) } else { Cell::new(0, 0) },
      height,
      width: width as i32,
    }
  }
}

impl Iterator for CellIterator {
  type Item = Cell;

  fn next(&mut self) -> Option<Self::Item> {
    let cell = &mut self.next;
    if cell.row >= self.height {
      None
    } else {
      let result = *cell;
      cell.col += 1;
      if cell.col >= self.width {
        cell.col = 0;
        cell.row += 1;
      }
      Some(result)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions_are_row_major() {
    let board = Board::new(2, 3, ());
    let cells: Vec<_> = board.positions().collect();
    assert_eq!(
      cells,
      vec![
        Cell::new(0, 0),
        Cell::new(0, 1),
        Cell::new(0, 2),
        Cell::new(1, 0),
        Cell::new(1, 1),
        Cell::new(1, 2),
      ]
    );
  }

  #[test]
  fn empty_board_has_no_positions() {
    assert_eq!(Board::new(3, 0, false).positions().count(), 0);
    assert_eq!(Board::new(0, 3, false).positions().count(), 0);
  }

  #[test]
  fn corner_has_three_neighbours() {
    let board = Board::new(3, 3, false);
    let mut around: Vec<_> = board.neighbours_of(Cell::new(0, 0)).collect();
    around.sort();
    assert_eq!(around, vec![Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]);
    assert_eq!(board.neighbours_of(Cell::new(1, 1)).count(), 8);
  }

  #[test]
  fn off_grid_cells_are_rejected() {
    let board = Board::new(2, 4, 0u8);
    assert!(board.get(Cell::new(-1, 0)).is_none());
    assert!(board.get(Cell::new(2, 0)).is_none());
    assert!(board.get(Cell::new(0, 4)).is_none());
    assert!(board.contains(Cell::new(1, 3)));
  }

  #[test]
  #[should_panic]
  fn indexing_off_grid_panics() {
    let board = Board::new(1, 1, 0u8);
    let _ = board[Cell::new(1, 1)];
  }
}
