//! Training rows.

use questline_core::training::{
    BadgeRelation, CertificateSettings, ItemReward, SkillImpact, Training, TrainingLevel,
};
use questline_core::types::{Timestamp, TrainingId};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `trainings` table. Reward linkages are JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct TrainingRow {
    pub id: TrainingId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub level: String,
    pub thumbnail_url: Option<String>,
    pub estimated_hours: f64,
    pub xp_reward: i32,
    pub coins_reward: i32,
    pub skill_impacts: Json<Vec<SkillImpact>>,
    pub badge_relations: Json<Vec<BadgeRelation>>,
    pub item_rewards: Json<Vec<ItemReward>>,
    pub evolution_template_id: Option<String>,
    pub certificate: Json<CertificateSettings>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrainingRow {
    pub fn into_domain(self) -> Training {
        let level = TrainingLevel::from_str_db(&self.level).unwrap_or_else(|e| {
            tracing::warn!(training_id = %self.id, error = %e, "Unknown level, using default");
            TrainingLevel::default()
        });
        Training {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            level,
            thumbnail_url: self.thumbnail_url,
            estimated_hours: self.estimated_hours,
            xp_reward: self.xp_reward,
            coins_reward: self.coins_reward,
            skill_impacts: self.skill_impacts.0,
            badge_relations: self.badge_relations.0,
            item_rewards: self.item_rewards.0,
            evolution_template_id: self.evolution_template_id,
            certificate: self.certificate.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
