use std::fmt::{Display, Formatter};

use chrono::TimeZone;

use crate::core::period::Period;

/// Short local rendering like `Mon 05 2330-0100*`, the asterisk marking a stop on a later day.
pub struct ShortPeriod<Tz> {
    pub period: Period,
    pub timezone: Tz,
}

impl<Tz: TimeZone> Display for ShortPeriod<Tz>
where
    Tz::Offset: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let start = self.period.start().with_timezone(&self.timezone);
        let stop = self.period.stop().with_timezone(&self.timezone);
        write!(f, "{}-{}", start.format("%a %d %H%M"), stop.format("%H%M"))?;
        if stop.date_naive() != start.date_naive() {
            write!(f, "*")?;
        }
        Ok(())
    }
}
