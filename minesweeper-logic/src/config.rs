//! Settings for a batch of self-played games

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::knowledge::InferenceMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
  /// Board rows
  pub height: u32,

  /// Board columns
  pub width: u32,

  /// Mines per board
  pub mines: u32,

  /// Number of games to play
  pub games: u32,

  /// Base seed; game `i` uses `seed + i`. Unseeded runs use the thread RNG.
  pub seed: Option<u64>,

  /// Deduction strategy of the knowledge base
  pub mode: InferenceMode,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      height: 8,
      width: 8,
      mines: 8,
      games: 1,
      seed: None,
      mode: InferenceMode::default(),
    }
  }
}

impl GameConfig {
  pub fn validate(&self) -> Result<()> {
    if self.height == 0 || self.width == 0 {
      return Err(Error::InvalidConfig {
        message: format!("board must not be empty, got {}x{}", self.height, self.width),
      });
    }

    let cells = u64::from(self.height) * u64::from(self.width);
    if cells > u64::from(u32::MAX) || self.height > i32::MAX as u32 || self.width > i32::MAX as u32 {
      return Err(Error::InvalidConfig {
        message: format!("a {}x{} board is too large", self.height, self.width),
      });
    }

    if u64::from(self.mines) >= cells {
      return Err(Error::InvalidConfig {
        message: format!("{} mines leave no safe cell on a {}x{} board", self.mines, self.height, self.width),
      });
    }

    if self.games == 0 {
      return Err(Error::InvalidConfig {
        message: "at least one game must be played".to_string(),
      });
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_valid() {
    assert_eq!(GameConfig::default().validate(), Ok(()));
  }

  #[test]
  fn rejects_degenerate_boards() {
    let config = GameConfig {
      width: 0,
      ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

    let config = GameConfig {
      height: 2,
      width: 2,
      mines: 4,
      ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

    let config = GameConfig {
      games: 0,
      ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
  }

  #[test]
  fn rejects_boards_whose_area_overflows() {
    let config = GameConfig {
      height: 70_000,
      width: 70_000,
      ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

    let config = GameConfig {
      height: 1,
      width: u32::MAX,
      ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
  }
}
