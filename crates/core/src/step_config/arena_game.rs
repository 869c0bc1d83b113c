//! `arena_game` step: a mini-game from the game catalog with a passing score.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_ARENA_MIN_SCORE: i32 = 70;

/// Default time limit in seconds.
pub const DEFAULT_ARENA_TIME_LIMIT_SECS: i32 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ArenaGameConfig {
    /// Game identifier from the reference catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub game_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100))]
    pub min_score: Option<i32>,
    pub difficulty: GameDifficulty,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 3600))]
    pub time_limit: Option<i32>,
}

impl Default for ArenaGameConfig {
    fn default() -> Self {
        Self {
            game_type: None,
            min_score: Some(DEFAULT_ARENA_MIN_SCORE),
            difficulty: GameDifficulty::Medium,
            time_limit: Some(DEFAULT_ARENA_TIME_LIMIT_SECS),
        }
    }
}

impl ArenaGameConfig {
    pub fn is_complete(&self) -> bool {
        self.game_type.is_some()
    }
}
