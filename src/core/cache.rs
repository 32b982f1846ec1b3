use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::{
    core::{
        error::{Error, Result},
        provider::PriceProvider,
        series::PriceSeries,
        slot::{self, SLOT},
        store::PriceStore,
    },
    prelude::*,
};

/// Read-through price cache: serves what is stored and fetches only the holes.
pub struct TimeSeriesCache<P, S> {
    provider: P,
    store: S,
}

/// Uncached `[start, end)` sub-range, the end being open when unset.
type Gap = (DateTime<Utc>, Option<DateTime<Utc>>);

impl<P: PriceProvider, S: PriceStore> TimeSeriesCache<P, S> {
    pub const fn new(provider: P, store: S) -> Self {
        Self { provider, store }
    }

    /// Get the prices with `start <= period_start < end`, fetching whatever is missing.
    ///
    /// Slots that the provider does not have yet stay absent.
    #[instrument(skip_all, fields(%start, ?end))]
    pub fn get(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<PriceSeries> {
        slot::ensure_aligned(&start)?;
        if let Some(end) = end {
            slot::ensure_aligned(&end)?;
            if end <= start {
                return Err(Error::InvalidInput(format!("range `{start}..{end}` is empty")));
            }
        }

        let mut series = self.store.read_range(start, end)?;
        debug!(n_cached = series.len(), "read the cache");

        let horizon = self.provider.horizon();
        for (gap_start, gap_end) in Self::clip(Self::gaps(&series, start, end), horizon) {
            info!(%gap_start, ?gap_end, "fetching…");
            let fetched = self.provider.fetch(gap_start, gap_end)?.range(gap_start, gap_end);
            if fetched.is_empty() {
                info!(%gap_start, ?gap_end, "not published yet");
                continue;
            }
            info!(n_points = fetched.len(), "fetched");
            self.store.upsert_all(&fetched)?;
            series = series.merge(fetched);
        }

        Ok(series)
    }

    /// Leading, interior, and trailing holes of the cached series within the range.
    fn gaps(cached: &PriceSeries, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Vec<Gap> {
        let (Some(first), Some(last_end)) = (cached.first(), cached.end()) else {
            return vec![(start, end)];
        };

        let mut gaps = Vec::new();
        if first.period_start > start {
            gaps.push((start, Some(first.period_start)));
        }
        for (left, right) in cached.points().tuple_windows() {
            if left.period_start + SLOT < right.period_start {
                gaps.push((left.period_start + SLOT, Some(right.period_start)));
            }
        }
        if end.is_none_or(|end| end > last_end) {
            gaps.push((last_end, end));
        }
        gaps
    }

    /// Cut the gaps at the horizon, dropping those that lie entirely beyond it.
    fn clip(gaps: Vec<Gap>, horizon: Option<DateTime<Utc>>) -> Vec<Gap> {
        let Some(horizon) = horizon else {
            return gaps;
        };
        gaps.into_iter()
            .filter(|(start, _)| *start < horizon)
            .map(|(start, end)| (start, Some(end.map_or(horizon, |end| end.min(horizon)))))
            .collect()
    }
}
