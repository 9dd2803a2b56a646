//! Lets a [`Solver`] play whole games against a [`Game`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Cell;
use crate::config::GameConfig;
use crate::error::Result;
use crate::solver::{MoveKind, Solver};
use crate::{Field, Game, MinefieldBuilder};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Outcome {
  Won,
  Lost { cell: Cell },
  /// Every cell was used up without the flags matching the mines.
  Stuck,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameReport {
  pub outcome: Outcome,
  pub safe_moves: u32,
  pub random_moves: u32,
  pub mines_flagged: u32,
}

impl GameReport {
  pub fn moves(&self) -> u32 {
    self.safe_moves + self.random_moves
  }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Summary {
  pub config: GameConfig,
  pub won: u32,
  pub lost: u32,
  pub stuck: u32,
  pub games: Vec<GameReport>,
}

impl Summary {
  pub fn win_rate(&self) -> f64 {
    if self.games.is_empty() {
      0.0
    } else {
      f64::from(self.won) / self.games.len() as f64
    }
  }
}

/// Plays until the game is won, a mine is hit, or no move is left.
pub fn play(game: &mut Game, solver: &mut Solver) -> Result<GameReport> {
  let mut safe_moves = 0;
  let mut random_moves = 0;

  let outcome = loop {
    if game.has_won() {
      break Outcome::Won;
    }

    let next = match solver.next_move() {
      Some(next) => next,
      None => break Outcome::Stuck,
    };
    match next.kind {
      MoveKind::Safe => safe_moves += 1,
      MoveKind::Random => random_moves += 1,
    }

    match game.reveal(next.cell)? {
      Field::Mine => break Outcome::Lost { cell: next.cell },
      Field::Empty(count) => {
        solver.ingest(next.cell, count)?;
        for &mine in solver.knowledge().mines() {
          if game.flag(mine) {
            debug!(cell = %mine, "flagged");
          }
        }
      }
    }
  };

  let report = GameReport {
    outcome,
    safe_moves,
    random_moves,
    mines_flagged: game.flags().len() as u32,
  };
  info!(
    outcome = ?report.outcome,
    safe_moves,
    random_moves,
    mines_flagged = report.mines_flagged,
    "game finished"
  );
  Ok(report)
}

/// Builds game number `index` of a batch. Seeded configs derive separate
/// streams for mine placement and move selection.
pub fn setup(config: &GameConfig, index: u32) -> Result<(Game, Solver)> {
  let mut builder = MinefieldBuilder::new(config.height, config.width);
  let mut solver = Solver::with_mode(config.height, config.width, config.mode);
  if let Some(seed) = config.seed {
    let seed = seed.wrapping_add(u64::from(index));
    builder = builder.with_rng(StdRng::seed_from_u64(seed));
    solver = solver.with_rng(StdRng::seed_from_u64(seed.rotate_left(32) ^ 0x5eed));
  }

  builder.add_random_mines(config.mines)?;
  Ok((Game::from(builder), solver))
}

pub fn run(config: &GameConfig) -> Result<Summary> {
  run_with(config, |_, _, _, _| {})
}

/// Plays every game of the batch, handing each finished game to `on_finish`.
pub fn run_with(
  config: &GameConfig,
  mut on_finish: impl FnMut(u32, &Game, &Solver, &GameReport),
) -> Result<Summary> {
  config.validate()?;

  let mut summary = Summary {
    config: config.clone(),
    won: 0,
    lost: 0,
    stuck: 0,
    games: Vec::with_capacity(config.games as usize),
  };

  for index in 0..config.games {
    let (mut game, mut solver) = setup(config, index)?;
    let report = play(&mut game, &mut solver)?;
    match report.outcome {
      Outcome::Won => summary.won += 1,
      Outcome::Lost { .. } => summary.lost += 1,
      Outcome::Stuck => summary.stuck += 1,
    }
    on_finish(index, &game, &solver, &report);
    summary.games.push(report);
  }

  info!(won = summary.won, lost = summary.lost, stuck = summary.stuck, "batch finished");
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{KnowledgeBase, Minefield};

  fn game(height: u32, width: u32, mines: &[(i32, i32)]) -> Game {
    let mut builder = MinefieldBuilder::new(height, width);
    for &cell in mines {
      builder.set_mine(cell.into()).unwrap();
    }
    Game::from(Minefield::from(builder))
  }

  #[test]
  fn two_cells_one_mine_is_won_after_one_move() {
    let mut game = game(1, 2, &[(0, 1)]);
    let mut knowledge = KnowledgeBase::new(1, 2);
    knowledge.mark_safe(Cell::new(0, 0)).unwrap();
    let mut solver = Solver::from(knowledge).with_rng(StdRng::seed_from_u64(0));

    let report = play(&mut game, &mut solver).unwrap();
    assert_eq!(report.outcome, Outcome::Won);
    assert_eq!(report.safe_moves, 1);
    assert_eq!(report.random_moves, 0);
    assert_eq!(report.mines_flagged, 1);
    assert!(game.flags().contains(&Cell::new(0, 1)));
  }

  #[test]
  fn guessing_the_only_cell_of_a_mined_board_is_lost() {
    let mut game = game(1, 1, &[(0, 0)]);
    let mut solver = Solver::new(1, 1).with_rng(StdRng::seed_from_u64(0));

    let report = play(&mut game, &mut solver).unwrap();
    assert_eq!(report.outcome, Outcome::Lost { cell: Cell::new(0, 0) });
    assert_eq!(report.random_moves, 1);
    assert_eq!(report.mines_flagged, 0);
  }

  #[test]
  fn mine_free_board_is_won_immediately() {
    let mut game = game(2, 2, &[]);
    let mut solver = Solver::new(2, 2);
    let report = play(&mut game, &mut solver).unwrap();
    assert_eq!(report.outcome, Outcome::Won);
    assert_eq!(report.moves(), 0);
  }

  #[test]
  fn run_counts_every_game() {
    let config = GameConfig {
      games: 5,
      seed: Some(11),
      ..GameConfig::default()
    };
    let summary = run(&config).unwrap();
    assert_eq!(summary.games.len(), 5);
    assert_eq!(summary.won + summary.lost + summary.stuck, 5);
  }

  #[test]
  fn run_rejects_invalid_config() {
    let config = GameConfig {
      games: 0,
      ..GameConfig::default()
    };
    assert!(run(&config).is_err());
  }
}
