//! The half-hour grid every price, window, and period lives on.

use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};

use crate::core::error::{Error, Result};

/// Duration of a single pricing slot.
pub const SLOT: TimeDelta = TimeDelta::minutes(30);

/// Whether the timestamp falls exactly on a slot boundary.
pub fn is_aligned<Tz: TimeZone>(time: &DateTime<Tz>) -> bool {
    time.timestamp_subsec_nanos() == 0 && time.timestamp().rem_euclid(SLOT.num_seconds()) == 0
}

pub fn ensure_aligned<Tz: TimeZone>(time: &DateTime<Tz>) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    if is_aligned(time) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("`{time}` is not aligned to a half-hour boundary")))
    }
}

/// Start of the slot containing the timestamp.
pub fn floor(time: DateTime<Utc>) -> DateTime<Utc> {
    let excess = time.timestamp().rem_euclid(SLOT.num_seconds());
    time.with_nanosecond(0).unwrap_or(time) - TimeDelta::seconds(excess)
}

/// End of the slot containing the timestamp, or the timestamp itself when aligned.
pub fn ceil(time: DateTime<Utc>) -> DateTime<Utc> {
    if is_aligned(&time) { time } else { floor(time) + SLOT }
}

/// Non-zero number of consecutive slots.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Slots(usize);

impl Slots {
    pub fn try_new(n_slots: usize) -> Result<Self> {
        if n_slots == 0 {
            Err(Error::InvalidInput(String::from("at least one slot is required")))
        } else {
            Ok(Self(n_slots))
        }
    }

    /// Convert the caller-supplied hours, which must be a positive multiple of half an hour.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn try_from_hours(hours: f64) -> Result<Self> {
        let n_slots = hours * 2.0;
        if !n_slots.is_finite() || n_slots <= 0.0 || n_slots.fract() != 0.0 {
            return Err(Error::InvalidInput(format!(
                "{hours} hours is not a positive multiple of half an hour"
            )));
        }
        Self::try_new(n_slots as usize)
    }

    /// Convert an estimated duration, rounding up to whole slots.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn try_ceil_hours(hours: f64) -> Result<Self> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(Error::InvalidInput(format!("{hours} hours is not a valid duration")));
        }
        Self::try_new((hours * 2.0).ceil() as usize)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub fn duration(self) -> TimeDelta {
        SLOT * i32::try_from(self.0).unwrap_or(i32::MAX)
    }
}
