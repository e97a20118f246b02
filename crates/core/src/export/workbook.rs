//! FMX import workbook generation.
//!
//! The three-sheet layout (sheet names, header text, column order, merged
//! header regions, and fill colors) is a fixed contract with the downstream
//! FMX importer: the consuming side relies on the visual grouping as well as
//! the column order, so header geometry is reproduced exactly.
//!
//! Row building is split out from serialization so the deduplication and
//! cell-rendering rules are testable without parsing xlsx output.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};

use super::graph::{ExportAssignment, ExportTask};
use super::validator::validate_export;
use super::ExportError;
use crate::recurrence::Repeat;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Sheet layout contract
// ---------------------------------------------------------------------------

pub const SHEET_INSTRUCTIONS: &str = "Instructions";
pub const SHEET_TASKS: &str = "Time-based tasks";
pub const SHEET_OCCURRENCES: &str = "Occurrences";

const INSTRUCTION_COLUMNS: [(&str, f64); 3] =
    [("Name*", 30.0), ("Description", 50.0), ("Steps*", 80.0)];

const TASK_COLUMNS: [(&str, f64); 28] = [
    ("Instruction", 30.0),
    ("Name", 30.0),
    ("Request Type", 20.0),
    ("Buildings", 30.0),
    ("Location", 20.0),
    ("First due date", 15.0),
    ("Repeat", 15.0),
    ("Daily every X days", 18.0),
    ("Weekly Sun", 12.0),
    ("Weekly Mon", 12.0),
    ("Weekly Tues", 12.0),
    ("Weekly Wed", 12.0),
    ("Weekly Thur", 12.0),
    ("Weekly Fri", 12.0),
    ("Weekly Sat", 12.0),
    ("Weekly every X weeks", 20.0),
    ("Monthly mode", 20.0),
    ("Monthly every X months", 22.0),
    ("Yearly every X years", 20.0),
    ("Exclude dates From", 18.0),
    ("Exclude dates Thru", 18.0),
    ("Next due date mode", 18.0),
    ("Inventory used Names", 25.0),
    ("Inventory used Quantities", 28.0),
    ("Estimated time (hours)", 20.0),
    ("Notes", 40.0),
    ("Assigned users", 30.0),
    ("Outsourced", 12.0),
];

const OCCURRENCE_COLUMNS: [(&str, f64); 7] = [
    ("Task name", 30.0),
    ("Equipment items", 40.0),
    ("Assigned users", 30.0),
    ("Outsourced", 12.0),
    ("Email reminder days before (primary)", 35.0),
    ("Email reminder days before (secondary)", 38.0),
    ("Email reminder days after", 25.0),
];

/// Merged section bands over the task-sheet header: (title, first column,
/// last column, fill color).
const TASK_BANDS: [(&str, u16, u16, Color); 7] = [
    ("TASK", 0, 6, COLOR_TASK),
    ("DAILY", 7, 7, COLOR_DAILY),
    ("WEEKLY", 8, 15, COLOR_WEEKLY),
    ("MONTHLY", 16, 17, COLOR_MONTHLY),
    ("YEARLY", 18, 18, COLOR_YEARLY),
    ("TASK", 19, 25, COLOR_TASK),
    ("OCCURRENCES", 26, 27, COLOR_OCCURRENCES),
];

const COLOR_TITLE: Color = Color::RGB(0xC0504D);
const COLOR_HEADER: Color = Color::RGB(0xE6E6FA);
const COLOR_TASK: Color = Color::RGB(0xE6E6FA);
const COLOR_DAILY: Color = Color::RGB(0xDDEBF7);
const COLOR_WEEKLY: Color = Color::RGB(0xE2EFDA);
const COLOR_MONTHLY: Color = Color::RGB(0xFFF2CC);
const COLOR_YEARLY: Color = Color::RGB(0xFCE4D6);
const COLOR_OCCURRENCES: Color = Color::RGB(0xEDEDED);

/// Deterministic output file name for an export generated on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("fmx-planned-maintenance-{date}.xlsx")
}

// ---------------------------------------------------------------------------
// Row building
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRow {
    pub name: String,
    pub description: String,
    /// Step texts joined with `\n` in order-index order.
    pub steps: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub instruction: String,
    pub name: String,
    pub request_type: String,
    pub buildings: String,
    pub location: String,
    pub first_due_date: String,
    pub repeat: String,
    pub daily_every_x_days: String,
    pub weekly_days: [String; 7],
    pub weekly_every_x_weeks: String,
    pub monthly_mode: String,
    pub monthly_every_x_months: String,
    pub yearly_every_x_years: String,
    pub exclude_from: String,
    pub exclude_thru: String,
    pub next_due_mode: String,
    pub inventory_names: String,
    pub inventory_quantities: String,
    pub est_time_hours: String,
    pub notes: String,
}

impl TaskRow {
    /// Cells in sheet column order. The trailing `Assigned users` and
    /// `Outsourced` columns are per-assignment and stay blank here; their
    /// values appear on the Occurrences sheet.
    fn cells(&self) -> Vec<&str> {
        let mut cells: Vec<&str> = vec![
            &self.instruction,
            &self.name,
            &self.request_type,
            &self.buildings,
            &self.location,
            &self.first_due_date,
            &self.repeat,
            &self.daily_every_x_days,
        ];
        cells.extend(self.weekly_days.iter().map(String::as_str));
        cells.extend([
            self.weekly_every_x_weeks.as_str(),
            self.monthly_mode.as_str(),
            self.monthly_every_x_months.as_str(),
            self.yearly_every_x_years.as_str(),
            self.exclude_from.as_str(),
            self.exclude_thru.as_str(),
            self.next_due_mode.as_str(),
            self.inventory_names.as_str(),
            self.inventory_quantities.as_str(),
            self.est_time_hours.as_str(),
            self.notes.as_str(),
            "",
            "",
        ]);
        cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRow {
    pub task_name: String,
    pub equipment_items: String,
    pub assigned_users: String,
    pub outsourced: String,
    pub remind_before_days_primary: String,
    pub remind_before_days_secondary: String,
    pub remind_after_days: String,
}

/// The three deduplicated row sets of one export.
#[derive(Debug, Clone, Default)]
pub struct ExportRows {
    pub instructions: Vec<InstructionRow>,
    pub tasks: Vec<TaskRow>,
    pub occurrences: Vec<OccurrenceRow>,
}

/// Walk every assignment and collect the three row sets.
///
/// Instructions are keyed by instruction id; tasks by (task id, building id)
/// because the building name is a per-row column. Occurrences are not
/// deduplicated: every (task, assignment) pair contributes a row.
pub fn build_rows(assignments: &[ExportAssignment]) -> ExportRows {
    let mut rows = ExportRows::default();
    let mut seen_instructions: HashSet<DbId> = HashSet::new();
    let mut seen_tasks: HashSet<(DbId, DbId)> = HashSet::new();

    for assignment in assignments {
        for task in &assignment.tasks {
            if let Some(instruction) = &task.instruction {
                if seen_instructions.insert(instruction.id) {
                    rows.instructions.push(InstructionRow {
                        name: instruction.name.clone(),
                        description: instruction.description.clone().unwrap_or_default(),
                        steps: instruction.steps.join("\n"),
                    });
                }
            }

            let building = &assignment.equipment.building;
            if seen_tasks.insert((task.id, building.id)) {
                rows.tasks
                    .push(task_row(task, &building.fmx_building_name));
            }

            rows.occurrences.push(OccurrenceRow {
                task_name: task.name.clone(),
                equipment_items: assignment.equipment.fmx_equipment_name.clone(),
                assigned_users: assignment.assigned_users.clone().unwrap_or_default(),
                outsourced: presence_marker(assignment.outsourced),
                remind_before_days_primary: opt_int(assignment.remind_before_days_primary),
                remind_before_days_secondary: opt_int(assignment.remind_before_days_secondary),
                remind_after_days: opt_int(assignment.remind_after_days),
            });
        }
    }

    rows
}

fn task_row(task: &ExportTask, fmx_building_name: &str) -> TaskRow {
    let repeat = task
        .repeat
        .as_deref()
        .and_then(|raw| raw.parse::<Repeat>().ok());
    let rec = &task.recurrence;

    // Frequency columns mirror the tagged union: only the active variant's
    // columns are populated, never two variants at once.
    let daily = matches!(repeat, Some(Repeat::Daily));
    let weekly = matches!(repeat, Some(Repeat::Weekly));
    let monthly = matches!(repeat, Some(Repeat::Monthly));
    let yearly = matches!(repeat, Some(Repeat::Yearly));

    let day_flag = |flag: Option<bool>| {
        if weekly {
            presence_marker(flag.unwrap_or(false))
        } else {
            String::new()
        }
    };

    TaskRow {
        instruction: task
            .instruction
            .as_ref()
            .map(|i| i.name.clone())
            .unwrap_or_default(),
        name: task.name.clone(),
        request_type: task
            .request_type
            .as_ref()
            .map(|rt| rt.name.clone())
            .unwrap_or_default(),
        buildings: fmx_building_name.to_string(),
        location: task.location.clone().unwrap_or_default(),
        first_due_date: task.first_due_date.map(iso_date).unwrap_or_default(),
        repeat: task.repeat.clone().unwrap_or_default(),
        daily_every_x_days: if daily {
            opt_int(rec.daily_every_x_days)
        } else {
            String::new()
        },
        weekly_days: [
            day_flag(rec.weekly_sun),
            day_flag(rec.weekly_mon),
            day_flag(rec.weekly_tues),
            day_flag(rec.weekly_wed),
            day_flag(rec.weekly_thur),
            day_flag(rec.weekly_fri),
            day_flag(rec.weekly_sat),
        ],
        weekly_every_x_weeks: if weekly {
            opt_int(rec.weekly_every_x_weeks)
        } else {
            String::new()
        },
        monthly_mode: if monthly {
            rec.monthly_mode.clone().unwrap_or_default()
        } else {
            String::new()
        },
        monthly_every_x_months: if monthly {
            opt_int(rec.monthly_every_x_months)
        } else {
            String::new()
        },
        yearly_every_x_years: if yearly {
            opt_int(rec.yearly_every_x_years)
        } else {
            String::new()
        },
        exclude_from: task.exclude_from.map(iso_date).unwrap_or_default(),
        exclude_thru: task.exclude_thru.map(iso_date).unwrap_or_default(),
        next_due_mode: task.next_due_mode.clone(),
        inventory_names: task.inventory_names.clone().unwrap_or_default(),
        inventory_quantities: task.inventory_quantities.clone().unwrap_or_default(),
        est_time_hours: task
            .est_time_hours
            .map(|h| h.to_string())
            .unwrap_or_default(),
        notes: task.notes.clone().unwrap_or_default(),
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn opt_int(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// FMX boolean columns use a presence marker, not a boolean literal.
fn presence_marker(value: bool) -> String {
    if value {
        "Y".to_string()
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Validate the assignment graph and serialize the workbook to an xlsx
/// buffer.
///
/// The validator runs unconditionally: even a caller that skipped the
/// pre-flight endpoint cannot generate a file from incomplete data.
pub fn build_workbook(assignments: &[ExportAssignment]) -> Result<Vec<u8>, ExportError> {
    let validation = validate_export(assignments)?;
    if !validation.is_valid {
        return Err(ExportError::Invalid {
            errors: validation.errors,
        });
    }

    let rows = build_rows(assignments);

    let title_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(COLOR_TITLE)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(COLOR_HEADER);

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    write_instructions_sheet(sheet, &rows, &title_format, &header_format)?;

    let sheet = workbook.add_worksheet();
    write_tasks_sheet(sheet, &rows)?;

    let sheet = workbook.add_worksheet();
    write_occurrences_sheet(sheet, &rows, &header_format)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_instructions_sheet(
    sheet: &mut Worksheet,
    rows: &ExportRows,
    title_format: &Format,
    header_format: &Format,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_INSTRUCTIONS)?;
    for (col, (_, width)) in INSTRUCTION_COLUMNS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    // Two-row merged title band over the full column span.
    sheet.merge_range(0, 0, 1, 2, "INSTRUCTIONS", title_format)?;
    for (col, (header, _)) in INSTRUCTION_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(2, col as u16, *header, header_format)?;
    }

    for (i, row) in rows.instructions.iter().enumerate() {
        let r = 3 + i as u32;
        sheet.write_string(r, 0, &row.name)?;
        sheet.write_string(r, 1, &row.description)?;
        sheet.write_string(r, 2, &row.steps)?;
    }
    Ok(())
}

fn write_tasks_sheet(sheet: &mut Worksheet, rows: &ExportRows) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_TASKS)?;
    for (col, (_, width)) in TASK_COLUMNS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    // Row 1: merged section bands, each with its own fill.
    for (title, first_col, last_col, color) in TASK_BANDS {
        let band_format = Format::new()
            .set_bold()
            .set_background_color(color)
            .set_align(FormatAlign::Center);
        if first_col == last_col {
            sheet.write_string_with_format(0, first_col, title, &band_format)?;
        } else {
            sheet.merge_range(0, first_col, 0, last_col, title, &band_format)?;
        }
    }

    // Row 2: column headers, filled with their band color.
    for (_, first_col, last_col, color) in TASK_BANDS {
        let column_format = Format::new().set_bold().set_background_color(color);
        for col in first_col..=last_col {
            sheet.write_string_with_format(
                1,
                col,
                TASK_COLUMNS[col as usize].0,
                &column_format,
            )?;
        }
    }

    for (i, row) in rows.tasks.iter().enumerate() {
        let r = 2 + i as u32;
        for (col, cell) in row.cells().into_iter().enumerate() {
            if !cell.is_empty() {
                sheet.write_string(r, col as u16, cell)?;
            }
        }
    }
    Ok(())
}

fn write_occurrences_sheet(
    sheet: &mut Worksheet,
    rows: &ExportRows,
    header_format: &Format,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_OCCURRENCES)?;
    for (col, (header, width)) in OCCURRENCE_COLUMNS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
        sheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    for (i, row) in rows.occurrences.iter().enumerate() {
        let r = 1 + i as u32;
        let cells = [
            &row.task_name,
            &row.equipment_items,
            &row.assigned_users,
            &row.outsourced,
            &row.remind_before_days_primary,
            &row.remind_before_days_secondary,
            &row.remind_after_days,
        ];
        for (col, cell) in cells.into_iter().enumerate() {
            if !cell.is_empty() {
                sheet.write_string(r, col as u16, cell)?;
            }
        }
    }
    Ok(())
}
