use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::core::{
    error::Result,
    period::Period,
    slot::{self, SLOT},
};

impl<T> IntoPeriods for T where T: ?Sized {}

pub trait IntoPeriods {
    /// Collapse slot starts into the minimal ordered list of disjoint, non-adjacent periods.
    ///
    /// The input may be unordered and may contain duplicates.
    fn try_into_periods(self) -> Result<Vec<Period>>
    where
        Self: IntoIterator<Item = DateTime<Utc>> + Sized,
    {
        let mut slot_starts = self.into_iter().sorted_unstable().dedup();
        let Some(first) = slot_starts.next() else {
            return Ok(Vec::new());
        };
        slot::ensure_aligned(&first)?;

        let mut periods = Vec::new();
        let (mut start, mut last) = (first, first);
        for slot_start in slot_starts {
            slot::ensure_aligned(&slot_start)?;
            if slot_start != last + SLOT {
                periods.push(Period::try_new(start, last + SLOT)?);
                start = slot_start;
            }
            last = slot_start;
        }
        periods.push(Period::try_new(start, last + SLOT)?);

        Ok(periods)
    }
}
