//! Module (content tree node) model and partial updates.
//!
//! A module is either a top-level chapter (`parent_id = None`) or a step
//! under a chapter. Structural fields (`id`, `parent_id`, `order_index`,
//! `numbering`) are owned by [`crate::tree::ModuleTree`]; everything else is
//! edited through [`ModulePatch`].

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::step_config::{StepConfig, StepPayload, StepType};
use crate::types::ModuleId;

/// Passing score assigned when a module first becomes a checkpoint.
pub const DEFAULT_CHECKPOINT_MIN_SCORE: i32 = 70;

/// Display name given to a new top-level module.
pub const NEW_MODULE_NAME: &str = "New module";

/// Display name given to a new child step.
pub const NEW_STEP_NAME: &str = "New step";

/// When a learner may start a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockCondition {
    None,
    #[default]
    PreviousComplete,
    PreviousScore,
}

impl UnlockCondition {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "none" => Ok(Self::None),
            "previous_complete" => Ok(Self::PreviousComplete),
            "previous_score" => Ok(Self::PreviousScore),
            _ => Err(CoreError::Validation(format!(
                "Invalid unlock_condition '{s}'. Must be one of: none, previous_complete, previous_score"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PreviousComplete => "previous_complete",
            Self::PreviousScore => "previous_score",
        }
    }
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub parent_id: Option<ModuleId>,
    /// Position within the sibling group; siblings always hold `0..n`.
    pub order_index: i32,
    /// Derived display label such as `"2"` or `"2.3"`.
    #[serde(default)]
    pub numbering: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub step_type: StepType,
    #[serde(default)]
    pub step_config: StepConfig,
    #[serde(default)]
    pub time_minutes: i32,
    #[serde(default)]
    pub xp_reward: i32,
    #[serde(default)]
    pub coins_reward: i32,
    pub is_required: bool,
    pub is_optional: bool,
    #[serde(default)]
    pub is_checkpoint: bool,
    /// Kept even while `is_checkpoint` is false so toggling back restores it.
    #[serde(default)]
    pub min_score: Option<i32>,
    #[serde(default)]
    pub unlock_condition: UnlockCondition,
    #[serde(default)]
    pub is_preview_available: bool,
}

impl Module {
    /// A module with default content, ready to be placed in a sibling group.
    pub fn new(id: ModuleId, parent_id: Option<ModuleId>, order_index: i32) -> Self {
        let name = if parent_id.is_some() {
            NEW_STEP_NAME
        } else {
            NEW_MODULE_NAME
        };
        Self {
            id,
            parent_id,
            order_index,
            numbering: String::new(),
            name: name.to_string(),
            description: None,
            step_type: StepType::Content,
            step_config: StepConfig::for_step_type(StepType::Content),
            time_minutes: 0,
            xp_reward: 0,
            coins_reward: 0,
            is_required: true,
            is_optional: false,
            is_checkpoint: false,
            min_score: None,
            unlock_condition: UnlockCondition::PreviousComplete,
            is_preview_available: false,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Payload selected by the current `step_type`.
    pub fn active_payload(&self) -> Option<&StepPayload> {
        self.step_config.get(self.step_type)
    }

    /// Switch step type. Payloads of other step types are kept untouched.
    pub fn set_step_type(&mut self, step_type: StepType) {
        self.step_type = step_type;
        self.step_config.ensure(step_type);
    }

    /// Mark or unmark as required; `is_optional` is always the inverse.
    pub fn set_required(&mut self, required: bool) {
        self.is_required = required;
        self.is_optional = !required;
    }

    /// Toggle checkpoint status without losing a previously set `min_score`.
    pub fn set_checkpoint(&mut self, checkpoint: bool) {
        self.is_checkpoint = checkpoint;
        if checkpoint && self.min_score.is_none() {
            self.min_score = Some(DEFAULT_CHECKPOINT_MIN_SCORE);
        }
    }

    /// The passing score, if this module gates progression.
    pub fn effective_min_score(&self) -> Option<i32> {
        self.is_checkpoint.then_some(self.min_score).flatten()
    }

    /// Apply a partial update atomically: either every field in the patch is
    /// applied or (on validation failure) the module is left unchanged.
    pub fn apply_patch(&mut self, patch: &ModulePatch) -> Result<(), CoreError> {
        patch.validate()?;

        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(description) = &patch.description {
            next.description = (!description.is_empty()).then(|| description.clone());
        }
        if let Some(step_type) = patch.step_type {
            next.set_step_type(step_type);
        }
        if let Some(updates) = &patch.step_config {
            next.step_config.merge(next.step_type, updates)?;
        }
        if let Some(minutes) = patch.time_minutes {
            next.time_minutes = minutes;
        }
        if let Some(xp) = patch.xp_reward {
            next.xp_reward = xp;
        }
        if let Some(coins) = patch.coins_reward {
            next.coins_reward = coins;
        }
        if let Some(required) = patch.is_required {
            next.set_required(required);
        }
        if let Some(optional) = patch.is_optional {
            next.set_required(!optional);
        }
        if let Some(score) = patch.min_score {
            next.min_score = Some(score);
        }
        if let Some(checkpoint) = patch.is_checkpoint {
            next.set_checkpoint(checkpoint);
        }
        if let Some(condition) = patch.unlock_condition {
            next.unlock_condition = condition;
        }
        if let Some(preview) = patch.is_preview_available {
            next.is_preview_available = preview;
        }

        *self = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// Partial update of a module's editable fields. `None` means "leave as is".
///
/// `step_config` is a JSON object shallow-merged into the payload of the
/// (possibly just changed) active step type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ModulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// An empty string clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_type: Option<StepType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_config: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 1440))]
    pub time_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100000))]
    pub xp_reward: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100000))]
    pub coins_reward: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_checkpoint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100))]
    pub min_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_condition: Option<UnlockCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_preview_available: Option<bool>,
}

impl ModulePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
