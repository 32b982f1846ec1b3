use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};

use crate::core::{error::Result, series::PriceSeries, slot};

/// Remote source of the slot prices.
pub trait PriceProvider {
    /// Fetch the published prices with `start <= period_start < end`.
    ///
    /// Slots which are not published yet are simply absent.
    fn fetch(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<PriceSeries>;

    /// Furthest instant the provider can currently answer for, if it knows.
    fn horizon(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Daily publication schedule: the next day prices appear at the cutoff local time.
#[derive(Copy, Clone, Debug)]
pub struct Publication<Tz> {
    pub cutoff: NaiveTime,

    /// Local end of the last published slot of a day, midnight meaning the whole day.
    pub until: NaiveTime,

    pub timezone: Tz,
}

impl<Tz: TimeZone> Publication<Tz> {
    /// Published end of today before the cutoff, of tomorrow after it.
    pub fn horizon_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = now.with_timezone(&self.timezone);
        let mut n_days = u64::from(local.time() >= self.cutoff);
        if self.until == NaiveTime::MIN {
            n_days += 1;
        }
        let horizon = local
            .date_naive()
            .checked_add_days(Days::new(n_days))?
            .and_time(self.until)
            .and_local_timezone(self.timezone.clone())
            .earliest()?
            .with_timezone(&Utc);
        Some(slot::ceil(horizon))
    }
}
