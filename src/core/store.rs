use chrono::{DateTime, Utc};

use crate::core::{
    error::Result,
    series::{PricePoint, PriceSeries},
};

/// Persistent slot-keyed price storage.
pub trait PriceStore {
    /// Stored points with `start <= period_start < end`, the end being open when unset.
    fn read_range(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>)
    -> Result<PriceSeries>;

    /// Insert or overwrite the price of the slot.
    fn upsert(&self, point: PricePoint) -> Result<()>;

    fn upsert_all(&self, series: &PriceSeries) -> Result<()> {
        for point in series.points() {
            self.upsert(point)?;
        }
        Ok(())
    }
}
