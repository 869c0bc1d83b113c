//! Repository for the `training_modules` table.

use questline_core::module::Module;
use questline_core::types::{ModuleId, TrainingId};
use sqlx::PgPool;

use crate::models::module::ModuleRow;

/// Column list for training_modules queries.
const COLUMNS: &str = "id, training_id, parent_id, order_index, numbering, name, \
    description, step_type, step_config, time_minutes, xp_reward, coins_reward, \
    is_required, is_optional, is_checkpoint, min_score, unlock_condition, \
    is_preview_available, created_at, updated_at";

pub struct ModuleRepo;

impl ModuleRepo {
    /// All modules of a training, parents before children.
    pub async fn list_by_training(
        pool: &PgPool,
        training_id: TrainingId,
    ) -> Result<Vec<ModuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM training_modules
             WHERE training_id = $1
             ORDER BY parent_id NULLS FIRST, order_index"
        );
        sqlx::query_as::<_, ModuleRow>(&query)
            .bind(training_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or overwrite each module with its full state, in one transaction.
    ///
    /// Callers pass parents before their children so the `parent_id` foreign
    /// key is satisfied row by row.
    pub async fn upsert_many(
        pool: &PgPool,
        training_id: TrainingId,
        modules: &[Module],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut affected = 0;

        for module in modules {
            let step_config = serde_json::to_value(&module.step_config)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            let result = sqlx::query(
                "INSERT INTO training_modules
                    (id, training_id, parent_id, order_index, numbering, name, description,
                     step_type, step_config, time_minutes, xp_reward, coins_reward,
                     is_required, is_optional, is_checkpoint, min_score, unlock_condition,
                     is_preview_available)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                 ON CONFLICT (id) DO UPDATE SET
                    parent_id = EXCLUDED.parent_id,
                    order_index = EXCLUDED.order_index,
                    numbering = EXCLUDED.numbering,
                    name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    step_type = EXCLUDED.step_type,
                    step_config = EXCLUDED.step_config,
                    time_minutes = EXCLUDED.time_minutes,
                    xp_reward = EXCLUDED.xp_reward,
                    coins_reward = EXCLUDED.coins_reward,
                    is_required = EXCLUDED.is_required,
                    is_optional = EXCLUDED.is_optional,
                    is_checkpoint = EXCLUDED.is_checkpoint,
                    min_score = EXCLUDED.min_score,
                    unlock_condition = EXCLUDED.unlock_condition,
                    is_preview_available = EXCLUDED.is_preview_available,
                    updated_at = NOW()
                 WHERE training_modules.training_id = EXCLUDED.training_id",
            )
            .bind(module.id)
            .bind(training_id)
            .bind(module.parent_id)
            .bind(module.order_index)
            .bind(&module.numbering)
            .bind(&module.name)
            .bind(&module.description)
            .bind(module.step_type.as_str())
            .bind(step_config)
            .bind(module.time_minutes)
            .bind(module.xp_reward)
            .bind(module.coins_reward)
            .bind(module.is_required)
            .bind(module.is_optional)
            .bind(module.is_checkpoint)
            .bind(module.min_score)
            .bind(module.unlock_condition.as_str())
            .bind(module.is_preview_available)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    /// Delete the given modules of a training. Children of a deleted
    /// top-level module are removed by the `ON DELETE CASCADE` foreign key.
    pub async fn delete_many(
        pool: &PgPool,
        training_id: TrainingId,
        ids: &[ModuleId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM training_modules WHERE training_id = $1 AND id = ANY($2)")
                .bind(training_id)
                .bind(ids)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
