//! Repository for instruction sets and their steps.
//!
//! Steps are never patched individually: every write replaces the full step
//! list inside one transaction so a set can never be observed with a partial
//! or reordered list.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use pmx_core::types::DbId;

use crate::models::instruction::{
    InstructionSet, InstructionSetInput, InstructionSetWithSteps, InstructionStep,
};

const COLUMNS: &str = "i.id, i.name, i.description, i.created_at, i.updated_at, \
    (SELECT COUNT(*) FROM task_templates t WHERE t.instruction_id = i.id) AS task_count";

const STEP_COLUMNS: &str = "id, instruction_set_id, order_index, text";

#[derive(FromRow)]
struct InstructionSetRow {
    #[sqlx(flatten)]
    instruction: InstructionSet,
    task_count: i64,
}

/// Provides CRUD operations for instruction sets.
pub struct InstructionRepo;

impl InstructionRepo {
    /// List all instruction sets with ordered steps and usage counts.
    pub async fn list(pool: &PgPool) -> Result<Vec<InstructionSetWithSteps>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instruction_sets i ORDER BY i.name");
        let rows = sqlx::query_as::<_, InstructionSetRow>(&query)
            .fetch_all(pool)
            .await?;

        let steps_query = format!(
            "SELECT {STEP_COLUMNS} FROM instruction_steps
             ORDER BY instruction_set_id, order_index"
        );
        let steps = sqlx::query_as::<_, InstructionStep>(&steps_query)
            .fetch_all(pool)
            .await?;

        let mut by_set: HashMap<DbId, Vec<InstructionStep>> = HashMap::new();
        for step in steps {
            by_set.entry(step.instruction_set_id).or_default().push(step);
        }

        Ok(rows
            .into_iter()
            .map(|row| InstructionSetWithSteps {
                steps: by_set.remove(&row.instruction.id).unwrap_or_default(),
                instruction: row.instruction,
                task_count: row.task_count,
            })
            .collect())
    }

    /// Find an instruction set by its internal ID, with ordered steps.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InstructionSetWithSteps>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instruction_sets i WHERE i.id = $1");
        let Some(row) = sqlx::query_as::<_, InstructionSetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let steps_query = format!(
            "SELECT {STEP_COLUMNS} FROM instruction_steps
             WHERE instruction_set_id = $1 ORDER BY order_index"
        );
        let steps = sqlx::query_as::<_, InstructionStep>(&steps_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(InstructionSetWithSteps {
            instruction: row.instruction,
            steps,
            task_count: row.task_count,
        }))
    }

    /// Insert an instruction set and its steps in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &InstructionSetInput,
    ) -> Result<InstructionSetWithSteps, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO instruction_sets (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        for (index, step) in input.steps.iter().enumerate() {
            sqlx::query(
                "INSERT INTO instruction_steps (instruction_set_id, order_index, text)
                 VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(index as i32)
            .bind(&step.text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite an instruction set: the row is updated and the step list is
    /// deleted and recreated atomically, keeping `order_index` contiguous.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &InstructionSetInput,
    ) -> Result<Option<InstructionSetWithSteps>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE instruction_sets SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM instruction_steps WHERE instruction_set_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for (index, step) in input.steps.iter().enumerate() {
            sqlx::query(
                "INSERT INTO instruction_steps (instruction_set_id, order_index, text)
                 VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(index as i32)
            .bind(&step.text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Number of task templates referencing the set. Used to block deletes.
    pub async fn task_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM task_templates WHERE instruction_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM instruction_sets WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete an instruction set by ID; steps cascade. Returns `true` if a
    /// row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM instruction_sets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
