use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    core::{
        error::Result,
        period::Period,
        slot::{self, SLOT},
    },
    quantity::rate::KilowattHourRate,
};

/// Price of a single slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Constructor)]
pub struct PricePoint {
    pub period_start: DateTime<Utc>,
    pub rate: KilowattHourRate,
}

/// Sparse half-hour price grid, keyed and ordered by the slot start.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct PriceSeries(BTreeMap<DateTime<Utc>, KilowattHourRate>);

impl PriceSeries {
    /// Build the series, failing on the first point that is off the half-hour grid.
    ///
    /// Later points win over earlier ones with the same start.
    pub fn try_from_points(points: impl IntoIterator<Item = PricePoint>) -> Result<Self> {
        let mut inner = BTreeMap::new();
        for point in points {
            slot::ensure_aligned(&point.period_start)?;
            inner.insert(point.period_start, point.rate);
        }
        Ok(Self(inner))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, period_start: DateTime<Utc>) -> Option<KilowattHourRate> {
        self.0.get(&period_start).copied()
    }

    pub fn points(&self) -> impl DoubleEndedIterator<Item = PricePoint> + '_ {
        self.0.iter().map(|(period_start, rate)| PricePoint::new(*period_start, *rate))
    }

    pub fn first(&self) -> Option<PricePoint> {
        self.points().next()
    }

    pub fn last(&self) -> Option<PricePoint> {
        self.points().next_back()
    }

    /// End of the last known slot.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.last().map(|point| point.period_start + SLOT)
    }

    /// Points with `start <= period_start < end`.
    pub fn range(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        match end {
            Some(end) if end <= start => Self::default(),
            Some(end) => Self(self.0.range(start..end).map(|(k, v)| (*k, *v)).collect()),
            None => Self(self.0.range(start..).map(|(k, v)| (*k, *v)).collect()),
        }
    }

    /// Ordered merge by the slot start: on identical keys the points from `other` win.
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Drop the slots that fall inside any of the periods.
    pub fn without(&self, periods: &[Period]) -> Self {
        let mut inner = self.0.clone();
        for slot_start in periods.iter().flat_map(|period| period.slots()) {
            inner.remove(&slot_start);
        }
        Self(inner)
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn average_rate(&self) -> Option<KilowattHourRate> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.values().copied().sum::<KilowattHourRate>() / self.len() as f64)
        }
    }

    /// Maximal runs of consecutive slots.
    pub fn runs(&self) -> Vec<Vec<PricePoint>> {
        let mut runs: Vec<Vec<PricePoint>> = Vec::new();
        for point in self.points() {
            if let Some(run) = runs.last_mut()
                && run.last().is_some_and(|last| last.period_start + SLOT == point.period_start)
            {
                run.push(point);
            } else {
                runs.push(vec![point]);
            }
        }
        runs
    }
}

#[cfg(test)]
pub mod tests {
    use chrono::{TimeDelta, TimeZone};
    use itertools::Itertools;

    use super::*;
    use crate::core::error::Error;

    pub fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    pub fn slot_at(index: i32) -> DateTime<Utc> {
        midnight() + SLOT * index
    }

    /// Build a series from `(slot index, rate)` pairs starting at [`midnight`].
    pub fn series_of(points: &[(i32, f64)]) -> PriceSeries {
        PriceSeries::try_from_points(
            points
                .iter()
                .map(|(index, rate)| PricePoint::new(slot_at(*index), KilowattHourRate(*rate))),
        )
        .unwrap()
    }

    /// Build a dense series starting at [`midnight`].
    pub fn dense_series(rates: &[f64]) -> PriceSeries {
        let points = rates
            .iter()
            .enumerate()
            .map(|(index, rate)| (i32::try_from(index).unwrap(), *rate))
            .collect_vec();
        series_of(&points)
    }

    #[test]
    fn test_try_from_points_rejects_misaligned() {
        let point = PricePoint::new(midnight() + TimeDelta::minutes(10), KilowattHourRate(1.0));
        assert!(matches!(PriceSeries::try_from_points([point]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_first_last_end() {
        let series = series_of(&[(3, 1.0), (1, 2.0)]);
        assert_eq!(series.first().unwrap().period_start, slot_at(1));
        assert_eq!(series.last().unwrap().period_start, slot_at(3));
        assert_eq!(series.end(), Some(slot_at(4)));
        assert_eq!(PriceSeries::default().end(), None);
    }

    #[test]
    fn test_range() {
        let series = dense_series(&[1.0, 2.0, 3.0, 4.0]);
        let range = series.range(slot_at(1), Some(slot_at(3)));
        assert_eq!(range, series_of(&[(1, 2.0), (2, 3.0)]));
        assert_eq!(series.range(slot_at(2), None).len(), 2);
        assert!(series.range(slot_at(3), Some(slot_at(1))).is_empty());
    }

    #[test]
    fn test_merge_last_write_wins() {
        let merged = series_of(&[(0, 1.0), (1, 2.0)]).merge(series_of(&[(1, 5.0), (2, 3.0)]));
        assert_eq!(merged, series_of(&[(0, 1.0), (1, 5.0), (2, 3.0)]));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let series = series_of(&[(0, 1.0), (4, 2.0)]);
        assert_eq!(series.clone().merge(series.clone()), series);
    }

    #[test]
    fn test_without() -> Result<()> {
        let series = dense_series(&[1.0, 2.0, 3.0, 4.0]);
        let excluded = [Period::try_new(slot_at(1), slot_at(3))?];
        assert_eq!(series.without(&excluded), series_of(&[(0, 1.0), (3, 4.0)]));
        Ok(())
    }

    #[test]
    fn test_average_rate() {
        let series = dense_series(&[1.0, 2.0, -3.0, 4.0]);
        assert_eq!(series.average_rate(), Some(KilowattHourRate(1.0)));
        assert_eq!(PriceSeries::default().average_rate(), None);
    }

    #[test]
    fn test_runs() {
        let runs = series_of(&[(0, 1.0), (1, 1.0), (3, 1.0), (5, 1.0), (6, 1.0)]).runs();
        let lengths = runs.iter().map(Vec::len).collect_vec();
        assert_eq!(lengths, vec![2, 1, 2]);
        assert_eq!(runs[2][0].period_start, slot_at(5));
    }
}
