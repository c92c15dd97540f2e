//! Labels for the periods that transactions are aggregated over.
//!
//! The remote service computes the `Month` and `Week` formulas of each
//! transaction page with these same formats, so labels built here can be
//! used to filter on those formulas.

use time::{Date, Duration, macros::format_description};

/// The month label of `date`, e.g. `2024-03`.
pub fn month_label(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The label of the Monday to Sunday week containing `date`, e.g. `24-03-11 ~ 24-03-17`.
pub fn week_label(date: Date) -> String {
    let days_since_monday = i64::from(date.weekday().number_days_from_monday());
    let monday = date.saturating_sub(Duration::days(days_since_monday));
    let sunday = monday.saturating_add(Duration::days(6));

    format!("{} ~ {}", short_date(monday), short_date(sunday))
}

/// The ISO-8601 date of `date`, e.g. `2024-03-15`.
pub fn day_label(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parse the date part of an ISO-8601 date or date-time string.
///
/// Returns `None` if the string does not start with a `YYYY-MM-DD` date.
pub fn parse_day(iso: &str) -> Option<Date> {
    let day = iso.split('T').next()?;

    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

fn short_date(date: Date) -> String {
    format!(
        "{:02}-{:02}-{:02}",
        date.year().rem_euclid(100),
        u8::from(date.month()),
        date.day()
    )
}
