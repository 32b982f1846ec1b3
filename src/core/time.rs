use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::core::{
    error::{Error, Result},
    period::Period,
    slot,
};

/// Parse an RFC 3339 timestamp, refusing the ones without an offset.
pub fn parse_aware(text: &str) -> Result<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
        Err(_) if text.parse::<NaiveDateTime>().is_ok() => Err(Error::InvalidInput(format!(
            "`{text}` has no UTC offset, specify one like `{text}Z` or `{text}+01:00`"
        ))),
        Err(error) => {
            Err(Error::InvalidInput(format!("`{text}` is not a valid timestamp: {error}")))
        }
    }
}

/// Parse `START/END` into the period covering every slot the interval touches.
pub fn parse_period(text: &str) -> Result<Period> {
    let (start, end) = text.split_once('/').ok_or_else(|| {
        Error::InvalidInput(format!("`{text}` is not a `START/END` pair of timestamps"))
    })?;
    Period::try_new(slot::floor(parse_aware(start)?), slot::ceil(parse_aware(end)?))
}

/// Nearest future instant with the given local time of day.
pub fn next_occurrence<Tz: TimeZone>(
    now: &DateTime<Tz>,
    time: NaiveTime,
) -> Result<DateTime<Utc>> {
    let today = now.date_naive();
    let date = if now.time() < time { Some(today) } else { today.checked_add_days(Days::new(1)) };
    date.and_then(|date| date.and_time(time).and_local_timezone(now.timezone()).earliest())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidInput(format!("`{time}` does not exist in the local time")))
}
