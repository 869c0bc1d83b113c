//! Repository for the `trainings` table.

use questline_core::training::NewTraining;
use questline_core::types::TrainingId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::training::TrainingRow;

/// Column list for trainings queries.
const COLUMNS: &str = "id, name, description, category, level, thumbnail_url, \
    estimated_hours, xp_reward, coins_reward, skill_impacts, badge_relations, \
    item_rewards, evolution_template_id, certificate, created_at, updated_at";

pub struct TrainingRepo;

impl TrainingRepo {
    /// Insert a training with all of its reward linkages.
    pub async fn create(pool: &PgPool, input: &NewTraining) -> Result<TrainingRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO trainings
                (id, name, description, category, level, thumbnail_url, estimated_hours,
                 xp_reward, coins_reward, skill_impacts, badge_relations, item_rewards,
                 evolution_template_id, certificate)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrainingRow>(&query)
            .bind(input.id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.level.as_str())
            .bind(&input.thumbnail_url)
            .bind(input.estimated_hours)
            .bind(input.xp_reward)
            .bind(input.coins_reward)
            .bind(Json(&input.skill_impacts))
            .bind(Json(&input.badge_relations))
            .bind(Json(&input.item_rewards))
            .bind(&input.evolution_template_id)
            .bind(Json(&input.certificate))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: TrainingId,
    ) -> Result<Option<TrainingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trainings WHERE id = $1");
        sqlx::query_as::<_, TrainingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List trainings, most recently updated first.
    pub async fn list(pool: &PgPool) -> Result<Vec<TrainingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trainings ORDER BY updated_at DESC, name");
        sqlx::query_as::<_, TrainingRow>(&query).fetch_all(pool).await
    }

    /// Bump `updated_at` after the module tree changed.
    pub async fn touch(pool: &PgPool, id: TrainingId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE trainings SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
