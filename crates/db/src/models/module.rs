//! Module rows.
//!
//! Rows are decoded leniently: a tag the current build does not know, or a
//! `step_config` that no longer fits its payload shape, is repaired with a
//! warning rather than failing the whole tree load.

use questline_core::module::{Module, UnlockCondition, DEFAULT_CHECKPOINT_MIN_SCORE};
use questline_core::step_config::{StepConfig, StepType};
use questline_core::types::{ModuleId, Timestamp, TrainingId};
use sqlx::FromRow;

/// A row from the `training_modules` table.
#[derive(Debug, Clone, FromRow)]
pub struct ModuleRow {
    pub id: ModuleId,
    pub training_id: TrainingId,
    pub parent_id: Option<ModuleId>,
    pub order_index: i32,
    pub numbering: String,
    pub name: String,
    pub description: Option<String>,
    pub step_type: String,
    pub step_config: serde_json::Value,
    pub time_minutes: i32,
    pub xp_reward: i32,
    pub coins_reward: i32,
    pub is_required: bool,
    pub is_optional: bool,
    pub is_checkpoint: bool,
    pub min_score: Option<i32>,
    pub unlock_condition: String,
    pub is_preview_available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ModuleRow {
    pub fn into_domain(self) -> Module {
        let step_type = StepType::parse(&self.step_type).unwrap_or_else(|e| {
            tracing::warn!(module_id = %self.id, error = %e, "Unknown step_type, using content");
            StepType::default()
        });
        let unlock_condition = UnlockCondition::from_str_db(&self.unlock_condition)
            .unwrap_or_else(|e| {
                tracing::warn!(module_id = %self.id, error = %e, "Unknown unlock_condition");
                UnlockCondition::default()
            });
        let mut step_config = StepConfig::normalize(self.step_config);
        step_config.ensure(step_type);

        let min_score = match self.min_score {
            None if self.is_checkpoint => {
                tracing::warn!(module_id = %self.id, "Checkpoint without min_score, using default");
                Some(DEFAULT_CHECKPOINT_MIN_SCORE)
            }
            other => other,
        };

        Module {
            id: self.id,
            parent_id: self.parent_id,
            order_index: self.order_index,
            numbering: self.numbering,
            name: self.name,
            description: self.description,
            step_type,
            step_config,
            time_minutes: self.time_minutes,
            xp_reward: self.xp_reward,
            coins_reward: self.coins_reward,
            is_required: self.is_required,
            is_optional: self.is_optional,
            is_checkpoint: self.is_checkpoint,
            min_score,
            unlock_condition,
            is_preview_available: self.is_preview_available,
        }
    }
}
