use core::fmt;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::board::{Board, Cell};
use crate::error::{Error, Result};
use crate::sentence::Sentence;

/// How far each update pushes the deduction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceMode {
  /// Propagate facts and resolve subsets exactly once per update. Trivial
  /// sentences found by subset resolution are only propagated on the next one.
  SinglePass,
  /// Repeat both passes until neither finds anything new.
  #[default]
  Fixpoint,
}

/// Sentences about a `height x width` grid plus the facts derived from them.
///
/// `mines` and `safes` are always disjoint, every opened cell is safe, and
/// once an update returns no sentence mentions a confirmed cell.
#[derive(Clone)]
pub struct KnowledgeBase {
  grid: Board<()>,
  mode: InferenceMode,
  sentences: Vec<Sentence>,
  mines: BTreeSet<Cell>,
  safes: BTreeSet<Cell>,
  moves_made: BTreeSet<Cell>,
  revealed: BTreeMap<Cell, u32>,
}

impl KnowledgeBase {
  pub fn new(height: u32, width: u32) -> Self {
    Self::with_mode(height, width, InferenceMode::default())
  }

  pub fn with_mode(height: u32, width: u32, mode: InferenceMode) -> Self {
    Self {
      grid: Board::new(height, width, ()),
      mode,
      sentences: Vec::new(),
      mines: BTreeSet::new(),
      safes: BTreeSet::new(),
      moves_made: BTreeSet::new(),
      revealed: BTreeMap::new(),
    }
  }

  pub fn height(&self) -> u32 {
    self.grid.height
  }

  pub fn width(&self) -> u32 {
    self.grid.width
  }

  pub fn area(&self) -> usize {
    self.grid.area()
  }

  pub fn mode(&self) -> InferenceMode {
    self.mode
  }

  pub fn sentences(&self) -> &[Sentence] {
    &self.sentences
  }

  pub fn mines(&self) -> &BTreeSet<Cell> {
    &self.mines
  }

  pub fn safes(&self) -> &BTreeSet<Cell> {
    &self.safes
  }

  pub fn moves_made(&self) -> &BTreeSet<Cell> {
    &self.moves_made
  }

  pub fn positions(&self) -> impl Iterator<Item = Cell> {
    self.grid.positions()
  }

  pub fn is_resolved(&self, cell: Cell) -> bool {
    self.mines.contains(&cell) || self.safes.contains(&cell)
  }

  pub fn revealed_count(&self, cell: Cell) -> Option<u32> {
    self.revealed.get(&cell).copied()
  }

  fn check_bounds(&self, cell: Cell) -> Result<()> {
    if self.grid.contains(cell) {
      Ok(())
    } else {
      Err(Error::OutOfBounds {
        cell,
        height: self.grid.height,
        width: self.grid.width,
      })
    }
  }

  /// Records that the safe cell `cell` was opened and has `count` mines
  /// around it, then deduces whatever follows.
  ///
  /// Re-ingesting an opened cell with the same count changes nothing. If the
  /// new count contradicts what is already known the error is returned and
  /// the knowledge base is left as it was before the call.
  pub fn ingest(&mut self, cell: Cell, count: u32) -> Result<()> {
    self.check_bounds(cell)?;
    if let Some(&previous) = self.revealed.get(&cell) {
      if previous == count {
        trace!(%cell, count, "cell already ingested");
        return Ok(());
      }
      return Err(Error::ConflictingCount { cell, previous, count });
    }

    let mut mines_left = i64::from(count);
    let mut unknowns = BTreeSet::new();
    for neighbour in self.grid.neighbours_of(cell) {
      if self.mines.contains(&neighbour) {
        mines_left -= 1;
      } else if !self.safes.contains(&neighbour) {
        unknowns.insert(neighbour);
      }
    }

    if mines_left < 0 {
      return Err(Error::InvalidSentence {
        cells: unknowns.len(),
        count: mines_left,
      });
    }
    let sentence = Sentence::new(unknowns, mines_left as u32)?;

    debug!(%cell, count, "ingesting revealed cell");
    self.staged(|kb| {
      kb.mark_safe(cell)?;
      kb.moves_made.insert(cell);
      kb.revealed.insert(cell, count);
      kb.sentences.push(sentence);
      kb.infer()
    })
  }

  /// Adds a claim that did not come from a single revealed cell, reducing
  /// away cells that are already known, then deduces whatever follows.
  pub fn add_sentence(&mut self, mut sentence: Sentence) -> Result<()> {
    if sentence.count() as usize > sentence.len() {
      return Err(Error::InvalidSentence {
        cells: sentence.len(),
        count: i64::from(sentence.count()),
      });
    }
    let cells: Vec<Cell> = sentence.cells().iter().copied().collect();
    for cell in cells {
      self.check_bounds(cell)?;
      if self.mines.contains(&cell) {
        if sentence.count() == 0 {
          return Err(Error::Contradiction { cell });
        }
        sentence.mark_mine(cell);
      } else if self.safes.contains(&cell) {
        if sentence.count() as usize == sentence.len() {
          return Err(Error::Contradiction { cell });
        }
        sentence.mark_safe(cell);
      }
    }

    debug!(%sentence, "adding sentence");
    self.staged(|kb| {
      kb.sentences.push(sentence);
      kb.infer()
    })
  }

  /// Runs `update`, putting the knowledge base back the way it was if the
  /// update or the deductions it triggers fail.
  fn staged(&mut self, update: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
    let before = self.clone();
    let result = update(self);
    if let Err(err) = &result {
      debug!(%err, "rolling back knowledge update");
      *self = before;
    }
    result
  }

  /// Confirms `cell` as a mine and removes it from every sentence.
  pub fn mark_mine(&mut self, cell: Cell) -> Result<()> {
    self.check_bounds(cell)?;
    if self.safes.contains(&cell) || self.sentences.iter().any(|s| s.count() == 0 && s.contains(cell)) {
      return Err(Error::Contradiction { cell });
    }

    if self.mines.insert(cell) {
      debug!(%cell, "confirmed mine");
    }
    for sentence in &mut self.sentences {
      sentence.mark_mine(cell);
    }
    Ok(())
  }

  /// Confirms `cell` as safe and removes it from every sentence.
  pub fn mark_safe(&mut self, cell: Cell) -> Result<()> {
    self.check_bounds(cell)?;
    if self.mines.contains(&cell)
      || self
        .sentences
        .iter()
        .any(|s| s.count() as usize == s.len() && s.contains(cell))
    {
      return Err(Error::Contradiction { cell });
    }

    if self.safes.insert(cell) {
      debug!(%cell, "confirmed safe");
    }
    for sentence in &mut self.sentences {
      sentence.mark_safe(cell);
    }
    Ok(())
  }

  /// Runs the deduction passes over the current sentences. `ingest` and
  /// `add_sentence` call this themselves.
  pub fn infer(&mut self) -> Result<()> {
    match self.mode {
      InferenceMode::SinglePass => {
        self.propagate()?;
        self.resolve_subsets()?;
      }
      InferenceMode::Fixpoint => loop {
        let marked = self.propagate()?;
        let derived = self.resolve_subsets()?;
        if !marked && !derived {
          break;
        }
      },
    }

    self.sentences.retain(|sentence| !sentence.is_empty());
    trace!(sentences = self.sentences.len(), "inference finished");
    Ok(())
  }

  /// Marks every cell that a trivial sentence pins down. Returns whether any
  /// new fact was found.
  fn propagate(&mut self) -> Result<bool> {
    let known_before = self.mines.len() + self.safes.len();

    // marking shrinks the sentences, so work from copies of what each yields
    for i in 0..self.sentences.len() {
      let safes: Vec<Cell> = match self.sentences[i].known_safes() {
        Some(cells) => cells.iter().copied().collect(),
        None => Vec::new(),
      };
      for cell in safes {
        self.mark_safe(cell)?;
      }

      let mines: Vec<Cell> = match self.sentences[i].known_mines() {
        Some(cells) => cells.iter().copied().collect(),
        None => Vec::new(),
      };
      for cell in mines {
        self.mark_mine(cell)?;
      }
    }

    Ok(self.mines.len() + self.safes.len() != known_before)
  }

  /// Drops duplicate sentences and derives `B - A` for every pair where the
  /// cells of `A` are a subset of the cells of `B`. Returns whether any new
  /// sentence was added.
  fn resolve_subsets(&mut self) -> Result<bool> {
    let mut known = HashSet::with_capacity(self.sentences.len());
    let snapshot: Vec<Sentence> = self
      .sentences
      .iter()
      .filter(|sentence| known.insert((*sentence).clone()))
      .cloned()
      .collect();

    let mut derived = Vec::new();
    for (i, subset) in snapshot.iter().enumerate() {
      for (j, superset) in snapshot.iter().enumerate() {
        if i == j || !subset.is_subset_of(superset) {
          continue;
        }

        let sentence = subset
          .subtract_from(superset)
          .ok_or_else(|| Error::InvalidSentence {
            cells: superset.len() - subset.len(),
            count: i64::from(superset.count()) - i64::from(subset.count()),
          })?;
        if known.insert(sentence.clone()) {
          trace!(%subset, %superset, %sentence, "derived sentence");
          derived.push(sentence);
        }
      }
    }

    let changed = !derived.is_empty();
    self.sentences = snapshot;
    self.sentences.extend(derived);
    Ok(changed)
  }
}

impl fmt::Debug for KnowledgeBase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for row in 0..self.grid.height {
      for col in 0..self.grid.width {
        let cell = Cell::new(row as i32, col as i32);
        if self.mines.contains(&cell) {
          write!(f, "X")?;
        } else if let Some(count) = self.revealed_count(cell) {
          match count {
            0 => write!(f, " ")?,
            count => write!(f, "{}", count)?,
          }
        } else if self.safes.contains(&cell) {
          write!(f, ".")?;
        } else {
          write!(f, "░")?;
        }
      }
      writeln!(f)?;
    }

    Ok(())
  }
}
