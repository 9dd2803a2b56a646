use core::fmt;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Cell;
use crate::error::Result;
use crate::knowledge::{InferenceMode, KnowledgeBase};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
  /// The cell was deduced to be safe.
  Safe,
  /// Nothing certain was left, so the cell is a guess.
  Random,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
  pub cell: Cell,
  pub kind: MoveKind,
}

/// Picks moves from what its knowledge base has deduced.
pub struct Solver {
  knowledge: KnowledgeBase,
  rng: Box<dyn RngCore>,
}

impl Solver {
  pub fn new(height: u32, width: u32) -> Self {
    Self::from(KnowledgeBase::new(height, width))
  }

  pub fn with_mode(height: u32, width: u32, mode: InferenceMode) -> Self {
    Self::from(KnowledgeBase::with_mode(height, width, mode))
  }

  pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
    self.rng = Box::new(rng);
    self
  }

  pub fn knowledge(&self) -> &KnowledgeBase {
    &self.knowledge
  }

  pub fn ingest(&mut self, cell: Cell, count: u32) -> Result<()> {
    self.knowledge.ingest(cell, count)
  }

  /// Some safe cell that has not been opened yet.
  pub fn pick_safe_move(&mut self) -> Option<Cell> {
    let knowledge = &self.knowledge;
    let candidates: Vec<Cell> = knowledge.safes().difference(knowledge.moves_made()).copied().collect();
    candidates.choose(&mut self.rng).copied()
  }

  /// A uniformly chosen cell that is neither opened nor a known mine, or
  /// `None` once every such cell is used up.
  pub fn pick_random_move(&mut self) -> Option<Cell> {
    let knowledge = &self.knowledge;
    if knowledge.mines().len() + knowledge.moves_made().len() == knowledge.area() {
      return None;
    }

    let candidates: Vec<Cell> = knowledge
      .positions()
      .filter(|cell| !knowledge.moves_made().contains(cell) && !knowledge.mines().contains(cell))
      .collect();
    candidates.choose(&mut self.rng).copied()
  }

  pub fn next_move(&mut self) -> Option<Move> {
    let next = if let Some(cell) = self.pick_safe_move() {
      Move {
        cell,
        kind: MoveKind::Safe,
      }
    } else {
      Move {
        cell: self.pick_random_move()?,
        kind: MoveKind::Random,
      }
    };

    debug!(cell = %next.cell, kind = ?next.kind, "picked move");
    Some(next)
  }
}

impl From<KnowledgeBase> for Solver {
  fn from(knowledge: KnowledgeBase) -> Self {
    Self {
      knowledge,
      rng: Box::new(rand::thread_rng()),
    }
  }
}

impl fmt::Debug for Solver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.knowledge, f)
  }
}
