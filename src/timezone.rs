//! Works out the current date for a configured timezone.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in `canonical_timezone`, or in the system's local offset when
/// no timezone is configured.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
pub fn today(canonical_timezone: Option<&str>) -> Result<Date, Error> {
    let offset = match canonical_timezone {
        Some(timezone) => get_local_offset(timezone).ok_or_else(|| {
            tracing::error!("Could not get local timezone \"{timezone}\"");
            Error::InvalidTimezone(timezone.to_owned())
        })?,
        None => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
    };

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}
