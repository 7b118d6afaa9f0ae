//! Calendar-date helpers for project start/end dates.
//!
//! Dates arrive from HTML `<input type="date">` fields as `YYYY-MM-DD` and are
//! stored as PostgreSQL `DATE`. Listing queries coalesce a missing date to
//! [`sentinel_date`], so callers must check [`is_sentinel`] before treating a
//! listed date as real.

use chrono::NaiveDate;

use crate::error::CoreError;

/// Format accepted from form fields.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder date (`1970-01-01`) reported for projects without a date.
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::default()
}

/// Whether `date` is the "no date set" placeholder.
pub fn is_sentinel(date: NaiveDate) -> bool {
    date == sentinel_date()
}

/// Parse a required `YYYY-MM-DD` form value.
///
/// `field` is the form field name, used in the error message.
pub fn parse_form_date(field: &str, value: &str) -> Result<NaiveDate, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    NaiveDate::parse_from_str(value, FORM_DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!(
            "{field} must be a date in YYYY-MM-DD format, got '{value}'"
        ))
    })
}

/// Reject a range whose end falls before its start.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::Validation(
            "end-date must not be before start-date".into(),
        ));
    }
    Ok(())
}

/// Human-readable project duration, e.g. `"3 months"` or `"2 weeks"`.
///
/// Returns `None` when either date is missing or is the sentinel, or when the
/// range is inverted.
pub fn duration_label(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    let (start, end) = (start?, end?);
    if is_sentinel(start) || is_sentinel(end) || end < start {
        return None;
    }

    let days = (end - start).num_days();
    let (count, unit) = if days >= 365 {
        (days / 365, "year")
    } else if days >= 30 {
        (days / 30, "month")
    } else if days >= 7 {
        (days / 7, "week")
    } else {
        (days, "day")
    };

    let plural = if count == 1 { "" } else { "s" };
    Some(format!("{count} {unit}{plural}"))
}
