//! Training creation wizard: a linear, gated flow over a draft.
//!
//! The flow is data: an ordered list of steps, each with a gate deciding
//! whether the draft may advance past it. Nothing is persisted until the
//! final step materializes the draft into a [`NewTraining`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::CoreError;
use crate::training::{
    BadgeRelation, CertificateSettings, ItemReward, NewTraining, SkillImpact, TrainingLevel,
};

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Form state collected across the wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: TrainingLevel,
    pub thumbnail_url: Option<String>,
    pub estimated_hours: f64,
    pub xp_reward: i32,
    pub coins_reward: i32,
    pub skill_impacts: Vec<SkillImpact>,
    pub badge_relations: Vec<BadgeRelation>,
    pub item_rewards: Vec<ItemReward>,
    pub evolution_template_id: Option<String>,
    pub certificate: CertificateSettings,
}

/// Partial update to the draft. Lists are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DraftPatch {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub difficulty: Option<TrainingLevel>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub estimated_hours: Option<f64>,
    #[validate(range(min = 0, max = 100000))]
    pub xp_reward: Option<i32>,
    #[validate(range(min = 0, max = 100000))]
    pub coins_reward: Option<i32>,
    #[validate(nested)]
    pub skill_impacts: Option<Vec<SkillImpact>>,
    pub badge_relations: Option<Vec<BadgeRelation>>,
    #[validate(nested)]
    pub item_rewards: Option<Vec<ItemReward>>,
    /// An empty string clears the template.
    pub evolution_template_id: Option<String>,
    #[validate(nested)]
    pub certificate: Option<CertificateSettings>,
}

impl WizardDraft {
    /// Apply a patch after validating it. On error the draft is unchanged.
    pub fn apply(&mut self, patch: &DraftPatch) -> Result<(), CoreError> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(hours) = patch.estimated_hours {
            self.estimated_hours = hours;
        }
        if let Some(xp) = patch.xp_reward {
            self.xp_reward = xp;
        }
        if let Some(coins) = patch.coins_reward {
            self.coins_reward = coins;
        }
        if let Some(impacts) = &patch.skill_impacts {
            self.skill_impacts = impacts.clone();
        }
        if let Some(relations) = &patch.badge_relations {
            self.badge_relations = relations.clone();
        }
        if let Some(items) = &patch.item_rewards {
            self.item_rewards = items.clone();
        }
        if let Some(template) = &patch.evolution_template_id {
            self.evolution_template_id = (!template.is_empty()).then(|| template.clone());
        }
        if let Some(certificate) = &patch.certificate {
            self.certificate = certificate.clone();
        }
        Ok(())
    }

    /// Build the training to persist, with a fresh id.
    pub fn to_new_training(&self) -> Result<NewTraining, CoreError> {
        let description = self.description.trim();
        let training = NewTraining {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            category: self.category.trim().to_string(),
            level: self.difficulty,
            thumbnail_url: self.thumbnail_url.clone(),
            estimated_hours: self.estimated_hours,
            xp_reward: self.xp_reward,
            coins_reward: self.coins_reward,
            skill_impacts: self.skill_impacts.clone(),
            badge_relations: self.badge_relations.clone(),
            item_rewards: self.item_rewards.clone(),
            evolution_template_id: self.evolution_template_id.clone(),
            certificate: self.certificate.clone(),
        };
        training.validate()?;
        Ok(training)
    }
}

// ---------------------------------------------------------------------------
// Flow definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStepId {
    BasicInfo,
    Rewards,
    Certification,
    Review,
}

impl WizardStepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info",
            Self::Rewards => "rewards",
            Self::Certification => "certification",
            Self::Review => "review",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic information",
            Self::Rewards => "Rewards",
            Self::Certification => "Certification",
            Self::Review => "Review",
        }
    }
}

/// Gate deciding whether the draft may advance past a step.
pub type StepGate = fn(&WizardDraft) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct WizardStep {
    pub id: WizardStepId,
    pub can_proceed: StepGate,
}

impl WizardStep {
    /// A step that never blocks progression.
    pub fn open(id: WizardStepId) -> Self {
        Self {
            id,
            can_proceed: always,
        }
    }

    pub fn gated(id: WizardStepId, can_proceed: StepGate) -> Self {
        Self { id, can_proceed }
    }
}

fn always(_: &WizardDraft) -> bool {
    true
}

/// Basic info needs a name and a category before moving on.
pub fn basic_info_complete(draft: &WizardDraft) -> bool {
    !draft.name.trim().is_empty() && !draft.category.trim().is_empty()
}

#[derive(Debug, Clone)]
pub struct WizardFlow {
    steps: Vec<WizardStep>,
}

impl WizardFlow {
    pub fn new(steps: Vec<WizardStep>) -> Result<Self, CoreError> {
        if steps.is_empty() {
            return Err(CoreError::Validation(
                "A wizard flow needs at least one step".into(),
            ));
        }
        Ok(Self { steps })
    }

    /// Basic info, rewards, certification, review.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                WizardStep::gated(WizardStepId::BasicInfo, basic_info_complete),
                WizardStep::open(WizardStepId::Rewards),
                WizardStep::open(WizardStepId::Certification),
                WizardStep::open(WizardStepId::Review),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }
}

impl Default for WizardFlow {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Wizard state machine
// ---------------------------------------------------------------------------

/// Result of going back one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Moved(WizardStepId),
    /// Back from the first step closes the wizard and drops the draft.
    Cancelled,
}

/// Serializable snapshot of wizard progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardStatus {
    pub step: WizardStepId,
    pub step_label: &'static str,
    /// 1-based position of the current step.
    pub position: usize,
    pub total_steps: usize,
    pub can_proceed: bool,
    pub can_submit: bool,
    pub draft: WizardDraft,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    flow: WizardFlow,
    current: usize,
    draft: WizardDraft,
    /// Bumped on every reset; lets async work detect a draft it no longer
    /// belongs to.
    epoch: u64,
}

impl Wizard {
    pub fn new(flow: WizardFlow) -> Self {
        Self {
            flow,
            current: 0,
            draft: WizardDraft::default(),
            epoch: 0,
        }
    }

    pub fn draft(&self) -> &WizardDraft {
        &self.draft
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current_step(&self) -> WizardStepId {
        self.flow.steps[self.current].id
    }

    pub fn position(&self) -> usize {
        self.current + 1
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.flow.len()
    }

    pub fn can_proceed(&self) -> bool {
        (self.flow.steps[self.current].can_proceed)(&self.draft)
    }

    pub fn status(&self) -> WizardStatus {
        let step = self.current_step();
        WizardStatus {
            step,
            step_label: step.label(),
            position: self.position(),
            total_steps: self.flow.len(),
            can_proceed: self.can_proceed(),
            can_submit: self.is_last_step(),
            draft: self.draft.clone(),
        }
    }

    pub fn update_draft(&mut self, patch: &DraftPatch) -> Result<(), CoreError> {
        self.draft.apply(patch)
    }

    /// Set or clear the thumbnail once an upload (or removal) resolves.
    pub fn set_thumbnail(&mut self, url: Option<String>) {
        self.draft.thumbnail_url = url;
    }

    /// Advance one step if the current gate allows it.
    pub fn next(&mut self) -> Result<WizardStepId, CoreError> {
        if self.is_last_step() {
            return Err(CoreError::Conflict(
                "Already at the final step; submit instead".into(),
            ));
        }
        if !self.can_proceed() {
            return Err(CoreError::Validation(format!(
                "Step '{}' is incomplete",
                self.current_step().as_str()
            )));
        }
        self.current += 1;
        Ok(self.current_step())
    }

    pub fn back(&mut self) -> BackOutcome {
        if self.current == 0 {
            self.reset();
            return BackOutcome::Cancelled;
        }
        self.current -= 1;
        BackOutcome::Moved(self.current_step())
    }

    /// Drop the draft and return to the first step.
    pub fn reset(&mut self) {
        self.current = 0;
        self.draft = WizardDraft::default();
        self.epoch += 1;
    }

    /// Build the training to persist. Only allowed on the final step. The
    /// wizard itself is not reset here; callers reset once the store has
    /// accepted the training.
    pub fn materialize(&self) -> Result<NewTraining, CoreError> {
        if !self.is_last_step() {
            return Err(CoreError::Conflict(format!(
                "Cannot submit from step '{}'",
                self.current_step().as_str()
            )));
        }
        self.draft.to_new_training()
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(WizardFlow::standard())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
