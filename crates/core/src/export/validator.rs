//! Pre-flight validation of the assignment graph before workbook generation.
//!
//! Walks every assignment and asserts that each record the spreadsheet needs
//! is complete. Checks are deduplicated per distinct equipment, building,
//! task-template, and instruction id so an entity referenced by many
//! assignments is reported once. Validation never fails fast: the full error
//! list comes back in one pass. Only an empty input set is a hard error.

use serde::Serialize;

use super::graph::{ExportAssignment, ExportTask};
use super::ExportError;
use crate::recurrence::{MonthlyMode, Repeat};
use crate::types::DbId;
use std::collections::HashSet;

/// A single failed assertion.
///
/// `field` is a stable dotted identifier for grouping; `item` is a
/// human-readable label locating the offending entity ("RTU-1 (Assignment 2)").
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

/// Aggregated outcome of a validation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validate every record reachable from `assignments`.
///
/// Returns `Err(ExportError::NoAssignments)` when the input is empty;
/// otherwise always returns a [`ValidationResult`], valid or not.
pub fn validate_export(
    assignments: &[ExportAssignment],
) -> Result<ValidationResult, ExportError> {
    if assignments.is_empty() {
        return Err(ExportError::NoAssignments);
    }

    let mut errors = Vec::new();
    let mut checked_equipment: HashSet<DbId> = HashSet::new();
    let mut checked_buildings: HashSet<DbId> = HashSet::new();
    let mut checked_tasks: HashSet<DbId> = HashSet::new();
    let mut checked_instructions: HashSet<DbId> = HashSet::new();

    for (assignment_index, assignment) in assignments.iter().enumerate() {
        let assignment_context = format!("Assignment {}", assignment_index + 1);

        if checked_equipment.insert(assignment.equipment.id)
            && assignment.equipment.fmx_equipment_name.trim().is_empty()
        {
            errors.push(ValidationError {
                field: "equipment.fmxEquipmentName".into(),
                message: "FMX Equipment Name is required for export".into(),
                item: Some(format!(
                    "{} ({assignment_context})",
                    assignment.equipment.name
                )),
            });
        }

        if checked_buildings.insert(assignment.equipment.building.id)
            && assignment
                .equipment
                .building
                .fmx_building_name
                .trim()
                .is_empty()
        {
            errors.push(ValidationError {
                field: "building.fmxBuildingName".into(),
                message: "FMX Building Name is required for export".into(),
                item: Some(format!(
                    "{} ({assignment_context})",
                    assignment.equipment.building.name
                )),
            });
        }

        for (task_index, task) in assignment.tasks.iter().enumerate() {
            let task_context = format!("{assignment_context}, Task {}", task_index + 1);
            if checked_tasks.insert(task.id) {
                check_task(task, &task_context, &mut checked_instructions, &mut errors);
            }
        }
    }

    Ok(ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    })
}

fn check_task(
    task: &ExportTask,
    task_context: &str,
    checked_instructions: &mut HashSet<DbId>,
    errors: &mut Vec<ValidationError>,
) {
    let labelled = |errors: &mut Vec<ValidationError>, field: &str, message: &str| {
        errors.push(ValidationError {
            field: field.into(),
            message: message.into(),
            item: Some(format!("{} ({task_context})", task.name)),
        });
    };

    if task.name.trim().is_empty() {
        errors.push(ValidationError {
            field: "task.name".into(),
            message: "Task name is required".into(),
            item: Some(task_context.into()),
        });
    }

    if task.first_due_date.is_none() {
        labelled(errors, "task.firstDueDate", "First due date is required");
    }

    match task.repeat.as_deref() {
        None => labelled(errors, "task.repeatEnum", "Repeat frequency is required"),
        Some(raw) => match raw.parse::<Repeat>() {
            Err(_) => labelled(errors, "task.repeatEnum", "Invalid repeat frequency"),
            Ok(repeat) => check_frequency_fields(task, repeat, task_context, errors),
        },
    }

    match &task.request_type {
        Some(rt) if !rt.name.trim().is_empty() => {}
        _ => labelled(
            errors,
            "task.requestType",
            "Request type is required and must be valid in FMX",
        ),
    }

    match &task.instruction {
        None => labelled(errors, "task.instruction", "Instruction set is required"),
        Some(instruction) => {
            if checked_instructions.insert(instruction.id) {
                let instruction_item =
                    Some(format!("{} ({task_context})", instruction.name));
                if instruction.name.trim().is_empty() {
                    errors.push(ValidationError {
                        field: "instruction.name".into(),
                        message: "Instruction name is required".into(),
                        item: Some(format!("Unnamed ({task_context})")),
                    });
                }
                if instruction.steps.is_empty() {
                    errors.push(ValidationError {
                        field: "instruction.steps".into(),
                        message: "Instruction must have at least one step".into(),
                        item: instruction_item,
                    });
                } else if instruction.steps.iter().any(|s| s.trim().is_empty()) {
                    errors.push(ValidationError {
                        field: "instruction.steps".into(),
                        message: "All instruction steps must have text".into(),
                        item: instruction_item,
                    });
                }
            }
        }
    }

    if let (Some(from), Some(thru)) = (task.exclude_from, task.exclude_thru) {
        if from >= thru {
            labelled(
                errors,
                "task.excludeDates",
                "Exclude \"from\" date must be before \"thru\" date",
            );
        }
    }

    if let Some(hours) = task.est_time_hours {
        if hours.is_nan() || hours < 0.0 {
            labelled(
                errors,
                "task.estTimeHours",
                "Estimated time must be a positive number",
            );
        }
    }
}

/// Re-validate the stored frequency fields for the active repeat variant.
///
/// Runs independently of the write-path validation because rows may have
/// been seeded directly into the store.
fn check_frequency_fields(
    task: &ExportTask,
    repeat: Repeat,
    task_context: &str,
    errors: &mut Vec<ValidationError>,
) {
    let rec = &task.recurrence;
    let with_value = |errors: &mut Vec<ValidationError>,
                      field: &str,
                      message: &str,
                      value: Option<i32>| {
        let rendered = value.map_or_else(|| "none".to_string(), |v| v.to_string());
        errors.push(ValidationError {
            field: field.into(),
            message: message.into(),
            item: Some(format!(
                "{} ({task_context}) - Current value: {rendered}",
                task.name
            )),
        });
    };

    match repeat {
        Repeat::Never => {}
        Repeat::Daily => {
            if !rec.daily_every_x_days.is_some_and(|v| (1..=365).contains(&v)) {
                with_value(
                    errors,
                    "task.dailyEveryXDays",
                    "Daily frequency requires \"every X days\" to be set (minimum 1)",
                    rec.daily_every_x_days,
                );
            }
        }
        Repeat::Weekly => {
            if !rec
                .weekly_every_x_weeks
                .is_some_and(|v| (1..=52).contains(&v))
            {
                with_value(
                    errors,
                    "task.weeklyEveryXWeeks",
                    "Weekly frequency requires \"every X weeks\" to be set (minimum 1)",
                    rec.weekly_every_x_weeks,
                );
            }
            let has_day = [
                rec.weekly_sun,
                rec.weekly_mon,
                rec.weekly_tues,
                rec.weekly_wed,
                rec.weekly_thur,
                rec.weekly_fri,
                rec.weekly_sat,
            ]
            .iter()
            .any(|d| d.unwrap_or(false));
            if !has_day {
                errors.push(ValidationError {
                    field: "task.weeklyDays".into(),
                    message: "Weekly frequency requires at least one day of the week to be selected"
                        .into(),
                    item: Some(format!("{} ({task_context})", task.name)),
                });
            }
        }
        Repeat::Monthly => {
            if !rec
                .monthly_every_x_months
                .is_some_and(|v| (1..=12).contains(&v))
            {
                with_value(
                    errors,
                    "task.monthlyEveryXMonths",
                    "Monthly frequency requires \"every X months\" to be set (minimum 1)",
                    rec.monthly_every_x_months,
                );
            }
            match rec.monthly_mode.as_deref() {
                None => errors.push(ValidationError {
                    field: "task.monthlyMode".into(),
                    message: "Monthly frequency requires a monthly mode to be selected".into(),
                    item: Some(format!("{} ({task_context})", task.name)),
                }),
                Some(raw) if raw.parse::<MonthlyMode>().is_err() => {
                    errors.push(ValidationError {
                        field: "task.monthlyMode".into(),
                        message: "Invalid monthly mode".into(),
                        item: Some(format!("{} ({task_context})", task.name)),
                    });
                }
                Some(_) => {}
            }
        }
        Repeat::Yearly => {
            if !rec
                .yearly_every_x_years
                .is_some_and(|v| (1..=10).contains(&v))
            {
                with_value(
                    errors,
                    "task.yearlyEveryXYears",
                    "Yearly frequency requires \"every X years\" to be set (minimum 1)",
                    rec.yearly_every_x_years,
                );
            }
        }
    }
}

/// Render the aggregated error list as the client-facing multi-line message,
/// grouped by field identifier in first-seen order.
pub fn format_validation_errors(errors: &[ValidationError]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let mut fields: Vec<&str> = Vec::new();
    for error in errors {
        if !fields.contains(&error.field.as_str()) {
            fields.push(&error.field);
        }
    }

    let mut message = String::from("Export validation failed:\n\n");
    for field in fields {
        message.push_str(field);
        message.push_str(":\n");
        for error in errors.iter().filter(|e| e.field == field) {
            message.push_str("  \u{2022} ");
            message.push_str(&error.message);
            if let Some(item) = &error.item {
                message.push_str(&format!(" ({item})"));
            }
            message.push('\n');
        }
        message.push('\n');
    }
    message.push_str("Please fix these issues before exporting.");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::graph::*;
    use crate::recurrence::RecurrenceFields;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn building() -> ExportBuilding {
        ExportBuilding {
            id: 1,
            name: "Main".into(),
            fmx_building_name: "MAIN-01".into(),
        }
    }

    fn equipment(id: DbId, fmx_name: &str) -> ExportEquipment {
        ExportEquipment {
            id,
            name: "RTU-1".into(),
            fmx_equipment_name: fmx_name.into(),
            building: building(),
        }
    }

    fn monthly_task(id: DbId) -> ExportTask {
        ExportTask {
            id,
            name: "Quarterly filter check".into(),
            location: None,
            first_due_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            repeat: Some("MONTHLY".into()),
            recurrence: RecurrenceFields {
                monthly_mode: Some("DAY_OF_MONTH".into()),
                monthly_every_x_months: Some(1),
                ..Default::default()
            },
            exclude_from: None,
            exclude_thru: None,
            next_due_mode: "FIXED".to_string(),
            inventory_names: None,
            inventory_quantities: None,
            est_time_hours: Some(1.5),
            notes: None,
            request_type: Some(ExportRequestType {
                id: 1,
                name: "Preventive Maintenance".into(),
            }),
            instruction: Some(ExportInstruction {
                id: 1,
                name: "Filter swap".into(),
                description: None,
                steps: vec!["Check filter".into(), "Replace if dirty".into()],
            }),
        }
    }

    fn assignment(id: DbId, equipment: ExportEquipment, tasks: Vec<ExportTask>) -> ExportAssignment {
        ExportAssignment {
            id,
            equipment,
            tasks,
            assigned_users: None,
            outsourced: false,
            remind_before_days_primary: None,
            remind_before_days_secondary: None,
            remind_after_days: None,
        }
    }

    #[test]
    fn empty_input_is_a_distinct_error() {
        let err = validate_export(&[]).unwrap_err();
        assert_matches!(err, ExportError::NoAssignments);
    }

    #[test]
    fn complete_graph_is_valid() {
        let result =
            validate_export(&[assignment(1, equipment(1, "RTU-1-FMX"), vec![monthly_task(1)])])
                .unwrap();
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn missing_fmx_equipment_name_reported_once_across_assignments() {
        // The same equipment appears in three assignments; the check must
        // run once.
        let eq = equipment(7, "");
        let assignments = vec![
            assignment(1, eq.clone(), vec![monthly_task(1)]),
            assignment(2, eq.clone(), vec![monthly_task(1)]),
            assignment(3, eq, vec![monthly_task(1)]),
        ];
        let result = validate_export(&assignments).unwrap();
        assert!(!result.is_valid);

        let matching: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.field == "equipment.fmxEquipmentName")
            .collect();
        assert_eq!(matching.len(), 1);
        assert!(matching[0].item.as_deref().unwrap().contains("RTU-1"));
    }

    #[test]
    fn weekly_task_without_days_is_flagged() {
        let mut task = monthly_task(2);
        task.repeat = Some("WEEKLY".into());
        task.recurrence = RecurrenceFields {
            weekly_every_x_weeks: Some(2),
            ..Default::default()
        };
        let result =
            validate_export(&[assignment(1, equipment(1, "RTU-1-FMX"), vec![task])]).unwrap();
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "task.weeklyDays"));
    }

    #[test]
    fn monthly_task_without_mode_is_flagged() {
        let mut task = monthly_task(3);
        task.recurrence.monthly_mode = None;
        let result =
            validate_export(&[assignment(1, equipment(1, "RTU-1-FMX"), vec![task])]).unwrap();
        assert!(result.errors.iter().any(|e| e.field == "task.monthlyMode"));
    }

    #[test]
    fn exclude_dates_must_be_ordered() {
        let mut task = monthly_task(4);
        task.exclude_from = NaiveDate::from_ymd_opt(2025, 6, 1);
        task.exclude_thru = NaiveDate::from_ymd_opt(2025, 6, 1);
        let result =
            validate_export(&[assignment(1, equipment(1, "RTU-1-FMX"), vec![task])]).unwrap();
        assert!(result.errors.iter().any(|e| e.field == "task.excludeDates"));
    }

    #[test]
    fn negative_estimated_time_is_flagged() {
        let mut task = monthly_task(5);
        task.est_time_hours = Some(-0.5);
        let result =
            validate_export(&[assignment(1, equipment(1, "RTU-1-FMX"), vec![task])]).unwrap();
        assert!(result.errors.iter().any(|e| e.field == "task.estTimeHours"));
    }

    #[test]
    fn empty_instruction_step_is_flagged() {
        let mut task = monthly_task(6);
        task.instruction.as_mut().unwrap().steps = vec!["Check filter".into(), " ".into()];
        let result =
            validate_export(&[assignment(1, equipment(1, "RTU-1-FMX"), vec![task])]).unwrap();
        let err = result
            .errors
            .iter()
            .find(|e| e.field == "instruction.steps")
            .expect("expected a step error");
        assert_eq!(err.message, "All instruction steps must have text");
    }

    #[test]
    fn formatter_groups_errors_by_field() {
        let errors = vec![
            ValidationError {
                field: "task.name".into(),
                message: "Task name is required".into(),
                item: Some("Assignment 1, Task 1".into()),
            },
            ValidationError {
                field: "building.fmxBuildingName".into(),
                message: "FMX Building Name is required for export".into(),
                item: Some("Main (Assignment 1)".into()),
            },
            ValidationError {
                field: "task.name".into(),
                message: "Task name is required".into(),
                item: Some("Assignment 2, Task 1".into()),
            },
        ];
        let message = format_validation_errors(&errors);
        assert!(message.starts_with("Export validation failed:"));
        assert!(message.ends_with("Please fix these issues before exporting."));
        // task.name appears once as a group header even with two entries.
        assert_eq!(message.matches("task.name:").count(), 1);
        assert!(message.contains("\u{2022} Task name is required (Assignment 1, Task 1)"));
    }
}
