use core::fmt;
use std::collections::BTreeSet;

use crate::board::Cell;
use crate::error::{Error, Result};

/// The claim "exactly `count` of `cells` are mines".
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Sentence {
  cells: BTreeSet<Cell>,
  count: u32,
}

impl Sentence {
  /// Fails with `Error::InvalidSentence` when `count` exceeds the number of distinct cells.
  pub fn new(cells: impl IntoIterator<Item = Cell>, count: u32) -> Result<Self> {
    let cells: BTreeSet<Cell> = cells.into_iter().collect();
    if count as usize > cells.len() {
      return Err(Error::InvalidSentence {
        cells: cells.len(),
        count: i64::from(count),
      });
    }
    Ok(Self { cells, count })
  }

  pub fn cells(&self) -> &BTreeSet<Cell> {
    &self.cells
  }

  pub fn count(&self) -> u32 {
    self.count
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn contains(&self, cell: Cell) -> bool {
    self.cells.contains(&cell)
  }

  /// Every cell is a mine when the count covers the whole set.
  /// An empty sentence with count 0 answers with the empty set.
  pub fn known_mines(&self) -> Option<&BTreeSet<Cell>> {
    if self.count as usize == self.cells.len() {
      Some(&self.cells)
    } else {
      None
    }
  }

  pub fn known_safes(&self) -> Option<&BTreeSet<Cell>> {
    if self.count == 0 {
      Some(&self.cells)
    } else {
      None
    }
  }

  /// Returns whether the sentence changed. The count never drops below zero;
  /// marking a member of a zero-count sentence is a contradiction the
  /// knowledge base rejects before it gets here.
  pub fn mark_mine(&mut self, cell: Cell) -> bool {
    if self.cells.remove(&cell) {
      self.count = self.count.saturating_sub(1);
      true
    } else {
      false
    }
  }

  /// Returns whether the sentence changed.
  pub fn mark_safe(&mut self, cell: Cell) -> bool {
    self.cells.remove(&cell)
  }

  pub fn is_subset_of(&self, other: &Sentence) -> bool {
    self.cells.is_subset(&other.cells)
  }

  /// Derives `other - self`, assuming `self` is a subset of `other`.
  /// `None` when the counts cannot both hold.
  pub fn subtract_from(&self, other: &Sentence) -> Option<Sentence> {
    debug_assert!(self.is_subset_of(other));
    let cells: BTreeSet<Cell> = other.cells.difference(&self.cells).copied().collect();
    let count = other.count.checked_sub(self.count)?;
    if count as usize > cells.len() {
      return None;
    }
    Some(Sentence { cells, count })
  }
}

impl fmt::Display for Sentence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, cell) in self.cells.iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{}", cell)?;
    }
    write!(f, "}} = {}", self.count)
  }
}

impl fmt::Debug for Sentence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}
