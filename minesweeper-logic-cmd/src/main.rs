//! Lets the knowledge-based solver play minesweeper and reports how it did.

use anyhow::{Context, Result};
use clap::Parser;
use minesweeper_logic::autoplay::{self, Outcome};
use minesweeper_logic::config::GameConfig;
use minesweeper_logic::InferenceMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "minesweeper-logic")]
#[command(version, about = "Self-play for a knowledge-based minesweeper solver", long_about = None)]
struct Cli {
  /// Board rows
  #[arg(long, default_value_t = 8)]
  height: u32,

  /// Board columns
  #[arg(long, default_value_t = 8)]
  width: u32,

  /// Mines per board
  #[arg(long, default_value_t = 8)]
  mines: u32,

  /// Number of games to play
  #[arg(long, default_value_t = 1)]
  games: u32,

  /// Seed for reproducible boards and moves
  #[arg(long)]
  seed: Option<u64>,

  /// Run each deduction pass once per move instead of to a fixpoint
  #[arg(long)]
  single_pass: bool,

  /// Print the summary as JSON
  #[arg(long)]
  json: bool,

  /// Print the board and the solver's knowledge after every game
  #[arg(long)]
  show_board: bool,

  /// Increase log verbosity (-v, -vv, -vvv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

impl Cli {
  fn config(&self) -> GameConfig {
    GameConfig {
      height: self.height,
      width: self.width,
      mines: self.mines,
      games: self.games,
      seed: self.seed,
      mode: if self.single_pass {
        InferenceMode::SinglePass
      } else {
        InferenceMode::Fixpoint
      },
    }
  }
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let config = cli.config();
  tracing::info!(?config, "starting");
  let show_board = cli.show_board;
  let summary = autoplay::run_with(&config, |index, game, solver, report| {
    if show_board {
      println!("game {}: {:?}", index + 1, report.outcome);
      println!("{:?}", game.minefield());
      println!("{:?}", solver);
    }
  })
  .context("failed to play")?;

  if cli.json {
    let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
    println!("{}", json);
    return Ok(());
  }

  for (index, report) in summary.games.iter().enumerate() {
    let outcome = match report.outcome {
      Outcome::Won => "won".to_string(),
      Outcome::Lost { cell } => format!("lost at {}", cell),
      Outcome::Stuck => "stuck".to_string(),
    };
    println!(
      "game {:>4}: {:<16} {:>3} safe, {:>3} random, {:>3} flagged",
      index + 1,
      outcome,
      report.safe_moves,
      report.random_moves,
      report.mines_flagged
    );
  }
  println!(
    "{} won, {} lost, {} stuck ({:.1}% won)",
    summary.won,
    summary.lost,
    summary.stuck,
    summary.win_rate() * 100.0
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_map_onto_config() {
    let cli = Cli::parse_from(["minesweeper-logic", "--height", "4", "--width", "5", "--mines", "3", "--single-pass"]);
    let config = cli.config();
    assert_eq!(config.height, 4);
    assert_eq!(config.width, 5);
    assert_eq!(config.mines, 3);
    assert_eq!(config.mode, InferenceMode::SinglePass);
    assert_eq!(config.seed, None);
  }

  #[test]
  fn defaults_match_library_defaults() {
    let cli = Cli::parse_from(["minesweeper-logic"]);
    assert_eq!(cli.config(), GameConfig::default());
  }
}
