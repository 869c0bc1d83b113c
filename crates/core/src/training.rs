//! Training aggregate and its reward/certificate linkages.
//!
//! Beyond identity the editor treats a training as opaque metadata. The
//! linkage types here are what the creation wizard collects and what the
//! content store persists alongside the training row.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{Timestamp, TrainingId};

// ---------------------------------------------------------------------------
// Difficulty level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl TrainingLevel {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(CoreError::Validation(format!("Invalid training level: '{s}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

// ---------------------------------------------------------------------------
// Reward linkages
// ---------------------------------------------------------------------------

pub const MIN_IMPACT_LEVEL: u8 = 1;
pub const MAX_IMPACT_LEVEL: u8 = 5;

/// How strongly completing the training develops a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SkillImpact {
    pub skill_id: String,
    #[validate(range(min = 1, max = 5))]
    pub impact_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRelationKind {
    AwardedOnCompletion,
    RequiredToStart,
}

impl BadgeRelationKind {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "awarded_on_completion" => Ok(Self::AwardedOnCompletion),
            "required_to_start" => Ok(Self::RequiredToStart),
            _ => Err(CoreError::Validation(format!("Invalid badge relation: '{s}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwardedOnCompletion => "awarded_on_completion",
            Self::RequiredToStart => "required_to_start",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRelation {
    pub badge_id: String,
    pub relation: BadgeRelationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ItemReward {
    pub item_id: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CertificateSettings {
    pub enabled: bool,
    #[validate(length(max = 200))]
    pub template_name: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub min_score: i32,
}

impl Default for CertificateSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            template_name: None,
            min_score: 70,
        }
    }
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Fields of a training that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewTraining {
    pub id: TrainingId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub level: TrainingLevel,
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub estimated_hours: f64,
    #[validate(range(min = 0, max = 100000))]
    pub xp_reward: i32,
    #[validate(range(min = 0, max = 100000))]
    pub coins_reward: i32,
    #[validate(nested)]
    pub skill_impacts: Vec<SkillImpact>,
    pub badge_relations: Vec<BadgeRelation>,
    #[validate(nested)]
    pub item_rewards: Vec<ItemReward>,
    pub evolution_template_id: Option<String>,
    #[validate(nested)]
    pub certificate: CertificateSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: TrainingId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub level: TrainingLevel,
    pub thumbnail_url: Option<String>,
    pub estimated_hours: f64,
    pub xp_reward: i32,
    pub coins_reward: i32,
    pub skill_impacts: Vec<SkillImpact>,
    pub badge_relations: Vec<BadgeRelation>,
    pub item_rewards: Vec<ItemReward>,
    pub evolution_template_id: Option<String>,
    pub certificate: CertificateSettings,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Training {
    pub fn from_new(new: NewTraining, now: Timestamp) -> Self {
        Self {
            id: new.id,
            name: new.name,
            description: new.description,
            category: new.category,
            level: new.level,
            thumbnail_url: new.thumbnail_url,
            estimated_hours: new.estimated_hours,
            xp_reward: new.xp_reward,
            coins_reward: new.coins_reward,
            skill_impacts: new.skill_impacts,
            badge_relations: new.badge_relations,
            item_rewards: new.item_rewards,
            evolution_template_id: new.evolution_template_id,
            certificate: new.certificate,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_db_roundtrip() {
        for level in [
            TrainingLevel::Beginner,
            TrainingLevel::Intermediate,
            TrainingLevel::Advanced,
        ] {
            assert_eq!(TrainingLevel::from_str_db(level.as_str()).unwrap(), level);
        }
        assert!(TrainingLevel::from_str_db("expert").is_err());
    }

    #[test]
    fn badge_relation_serializes_snake_case() {
        let relation = BadgeRelation {
            badge_id: "b1".into(),
            relation: BadgeRelationKind::RequiredToStart,
        };
        let value = serde_json::to_value(&relation).unwrap();
        assert_eq!(value["relation"], "required_to_start");
    }

    #[test]
    fn impact_level_bounds() {
        let ok = SkillImpact {
            skill_id: "s".into(),
            impact_level: MAX_IMPACT_LEVEL,
        };
        assert!(ok.validate().is_ok());
        let too_high = SkillImpact {
            impact_level: MAX_IMPACT_LEVEL + 1,
            ..ok.clone()
        };
        assert!(too_high.validate().is_err());
        let zero = SkillImpact {
            impact_level: MIN_IMPACT_LEVEL - 1,
            ..ok
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn item_reward_requires_positive_quantity() {
        let reward = ItemReward {
            item_id: "potion".into(),
            quantity: 0,
        };
        assert!(reward.validate().is_err());
    }
}
