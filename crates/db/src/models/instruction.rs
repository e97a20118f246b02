//! Instruction set and step models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::types::{DbId, Timestamp};

/// A row from the `instruction_sets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSet {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `instruction_steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionStep {
    pub id: DbId,
    pub instruction_set_id: DbId,
    pub order_index: i32,
    pub text: String,
}

/// Instruction set with its ordered steps and usage count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSetWithSteps {
    #[serde(flatten)]
    pub instruction: InstructionSet,
    pub steps: Vec<InstructionStep>,
    pub task_count: i64,
}

/// Input DTO for creating or overwriting an instruction set.
///
/// The step list replaces the existing steps wholesale; `order_index` is
/// assigned from the submitted order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSetInput {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<InstructionStepInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstructionStepInput {
    pub text: String,
}
