//! Recurrence rule model and validation for task templates.
//!
//! A task template's schedule is a tagged union: only the fields belonging
//! to the selected repeat mode are meaningful. The store flattens that union
//! into nullable columns, so this module owns both directions of the
//! translation — [`RecurrenceRule::resolve`] turns a candidate field bag
//! into a validated rule, and [`RecurrenceRule::to_fields`] produces the
//! canonical persisted set with every non-relevant column forced to NULL.
//!
//! No next-due-date computation happens here (or anywhere in this repo):
//! the rules are exported as raw configuration for FMX to interpret.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Repeat mode of a task template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Repeat {
    Never,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Repeat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Repeat::Never => "NEVER",
            Repeat::Daily => "DAILY",
            Repeat::Weekly => "WEEKLY",
            Repeat::Monthly => "MONTHLY",
            Repeat::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Repeat {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEVER" => Ok(Repeat::Never),
            "DAILY" => Ok(Repeat::Daily),
            "WEEKLY" => Ok(Repeat::Weekly),
            "MONTHLY" => Ok(Repeat::Monthly),
            "YEARLY" => Ok(Repeat::Yearly),
            _ => Err(RecurrenceError::InvalidRepeat),
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly recurrence interpretation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonthlyMode {
    DayOfMonth,
    DayOfWeek,
    WeekdayOfMonth,
    WeekendDayOfMonth,
}

impl MonthlyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthlyMode::DayOfMonth => "DAY_OF_MONTH",
            MonthlyMode::DayOfWeek => "DAY_OF_WEEK",
            MonthlyMode::WeekdayOfMonth => "WEEKDAY_OF_MONTH",
            MonthlyMode::WeekendDayOfMonth => "WEEKEND_DAY_OF_MONTH",
        }
    }
}

impl FromStr for MonthlyMode {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAY_OF_MONTH" => Ok(MonthlyMode::DayOfMonth),
            "DAY_OF_WEEK" => Ok(MonthlyMode::DayOfWeek),
            "WEEKDAY_OF_MONTH" => Ok(MonthlyMode::WeekdayOfMonth),
            "WEEKEND_DAY_OF_MONTH" => Ok(MonthlyMode::WeekendDayOfMonth),
            _ => Err(RecurrenceError::InvalidMonthlyMode),
        }
    }
}

impl fmt::Display for MonthlyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether FMX should anchor the next occurrence to the scheduled date
/// (FIXED) or the completion date (VARIABLE). Stored and exported as
/// opaque configuration; never evaluated here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextDueMode {
    #[default]
    Fixed,
    Variable,
}

impl NextDueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextDueMode::Fixed => "FIXED",
            NextDueMode::Variable => "VARIABLE",
        }
    }
}

impl FromStr for NextDueMode {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIXED" => Ok(NextDueMode::Fixed),
            "VARIABLE" => Ok(NextDueMode::Variable),
            _ => Err(RecurrenceError::InvalidNextDueMode),
        }
    }
}

/// The seven weekly day-of-week flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayFlags {
    pub sun: bool,
    pub mon: bool,
    pub tues: bool,
    pub wed: bool,
    pub thur: bool,
    pub fri: bool,
    pub sat: bool,
}

impl WeekdayFlags {
    /// True when at least one day is selected.
    pub fn any(&self) -> bool {
        self.sun || self.mon || self.tues || self.wed || self.thur || self.fri || self.sat
    }
}

/// Flattened nullable representation of the frequency-specific fields,
/// matching both the request payload and the `task_templates` columns.
///
/// Field names follow the external API contract (camelCase on the wire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrenceFields {
    pub daily_every_x_days: Option<i32>,
    pub weekly_sun: Option<bool>,
    pub weekly_mon: Option<bool>,
    pub weekly_tues: Option<bool>,
    pub weekly_wed: Option<bool>,
    pub weekly_thur: Option<bool>,
    pub weekly_fri: Option<bool>,
    pub weekly_sat: Option<bool>,
    pub weekly_every_x_weeks: Option<i32>,
    pub monthly_mode: Option<String>,
    pub monthly_every_x_months: Option<i32>,
    pub yearly_every_x_years: Option<i32>,
}

/// A frequency field failed validation. Messages are client-facing and name
/// the exact constraint that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    #[error("Invalid repeat frequency")]
    InvalidRepeat,
    #[error("Daily frequency must be between 1 and 365 days")]
    DailyOutOfRange,
    #[error("At least one day of the week must be selected for weekly tasks")]
    NoWeekdaySelected,
    #[error("Weekly frequency must be between 1 and 52 weeks")]
    WeeklyOutOfRange,
    #[error("Monthly mode is required for monthly tasks")]
    MissingMonthlyMode,
    #[error("Invalid monthly mode")]
    InvalidMonthlyMode,
    #[error("Monthly frequency must be between 1 and 12 months")]
    MonthlyOutOfRange,
    #[error("Yearly frequency must be between 1 and 10 years")]
    YearlyOutOfRange,
    #[error("Invalid next due date mode")]
    InvalidNextDueMode,
}

/// Validated recurrence rule: one variant per repeat mode, carrying only
/// the fields that mode defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    Never,
    Daily {
        every_x_days: i32,
    },
    Weekly {
        days: WeekdayFlags,
        every_x_weeks: i32,
    },
    Monthly {
        mode: MonthlyMode,
        every_x_months: i32,
    },
    Yearly {
        every_x_years: i32,
    },
}

impl RecurrenceRule {
    /// Validate a candidate field bag against the selected repeat mode.
    ///
    /// Fields belonging to other modes are ignored entirely. Missing counts
    /// default to 1; a count that is present but out of range is rejected,
    /// never silently clamped.
    pub fn resolve(repeat: Repeat, fields: &RecurrenceFields) -> Result<Self, RecurrenceError> {
        match repeat {
            Repeat::Never => Ok(RecurrenceRule::Never),
            Repeat::Daily => {
                let every_x_days = in_range(
                    fields.daily_every_x_days,
                    1..=365,
                    RecurrenceError::DailyOutOfRange,
                )?;
                Ok(RecurrenceRule::Daily { every_x_days })
            }
            Repeat::Weekly => {
                let days = WeekdayFlags {
                    sun: fields.weekly_sun.unwrap_or(false),
                    mon: fields.weekly_mon.unwrap_or(false),
                    tues: fields.weekly_tues.unwrap_or(false),
                    wed: fields.weekly_wed.unwrap_or(false),
                    thur: fields.weekly_thur.unwrap_or(false),
                    fri: fields.weekly_fri.unwrap_or(false),
                    sat: fields.weekly_sat.unwrap_or(false),
                };
                if !days.any() {
                    return Err(RecurrenceError::NoWeekdaySelected);
                }
                let every_x_weeks = in_range(
                    fields.weekly_every_x_weeks,
                    1..=52,
                    RecurrenceError::WeeklyOutOfRange,
                )?;
                Ok(RecurrenceRule::Weekly {
                    days,
                    every_x_weeks,
                })
            }
            Repeat::Monthly => {
                let mode = fields
                    .monthly_mode
                    .as_deref()
                    .ok_or(RecurrenceError::MissingMonthlyMode)?
                    .parse::<MonthlyMode>()?;
                let every_x_months = in_range(
                    fields.monthly_every_x_months,
                    1..=12,
                    RecurrenceError::MonthlyOutOfRange,
                )?;
                Ok(RecurrenceRule::Monthly {
                    mode,
                    every_x_months,
                })
            }
            Repeat::Yearly => {
                let every_x_years = in_range(
                    fields.yearly_every_x_years,
                    1..=10,
                    RecurrenceError::YearlyOutOfRange,
                )?;
                Ok(RecurrenceRule::Yearly { every_x_years })
            }
        }
    }

    /// The repeat mode tag of this rule.
    pub fn repeat(&self) -> Repeat {
        match self {
            RecurrenceRule::Never => Repeat::Never,
            RecurrenceRule::Daily { .. } => Repeat::Daily,
            RecurrenceRule::Weekly { .. } => Repeat::Weekly,
            RecurrenceRule::Monthly { .. } => Repeat::Monthly,
            RecurrenceRule::Yearly { .. } => Repeat::Yearly,
        }
    }

    /// Canonical persisted representation: the active variant's fields set,
    /// everything else NULL. Writing this over the existing row enforces
    /// the tagged-union exclusivity invariant at the storage layer.
    pub fn to_fields(&self) -> RecurrenceFields {
        let mut fields = RecurrenceFields::default();
        match *self {
            RecurrenceRule::Never => {}
            RecurrenceRule::Daily { every_x_days } => {
                fields.daily_every_x_days = Some(every_x_days);
            }
            RecurrenceRule::Weekly {
                days,
                every_x_weeks,
            } => {
                fields.weekly_sun = Some(days.sun);
                fields.weekly_mon = Some(days.mon);
                fields.weekly_tues = Some(days.tues);
                fields.weekly_wed = Some(days.wed);
                fields.weekly_thur = Some(days.thur);
                fields.weekly_fri = Some(days.fri);
                fields.weekly_sat = Some(days.sat);
                fields.weekly_every_x_weeks = Some(every_x_weeks);
            }
            RecurrenceRule::Monthly {
                mode,
                every_x_months,
            } => {
                fields.monthly_mode = Some(mode.as_str().to_string());
                fields.monthly_every_x_months = Some(every_x_months);
            }
            RecurrenceRule::Yearly { every_x_years } => {
                fields.yearly_every_x_years = Some(every_x_years);
            }
        }
        fields
    }
}

fn in_range(
    value: Option<i32>,
    range: std::ops::RangeInclusive<i32>,
    err: RecurrenceError,
) -> Result<i32, RecurrenceError> {
    match value {
        None => Ok(1),
        Some(v) if range.contains(&v) => Ok(v),
        Some(_) => Err(err),
    }
}
