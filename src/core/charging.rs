use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    core::{
        contiguous::IntoPeriods,
        error::{Error, Result},
        period::Period,
        series::PriceSeries,
        slot::{SLOT, Slots},
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Ordered charging periods, handed over to whatever actually switches the charger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[must_use]
pub struct ChargingPlan {
    pub periods: Vec<Period>,
    pub average_rate: KilowattHourRate,
    pub n_slots: usize,
    pub departure: Option<DateTime<Utc>>,
}

/// Pick the cheapest slots.
///
/// A slot is eligible when it ends no later than the departure and its rate does not exceed
/// the ceiling. Among eligible slots, cheaper wins, then earlier.
#[bon::builder]
#[instrument(skip_all, fields(n_slots = n_slots.get(), ?departure, ?max_rate))]
pub fn plan_charging(
    series: &PriceSeries,
    n_slots: Slots,
    departure: Option<DateTime<Utc>>,
    max_rate: Option<KilowattHourRate>,
) -> Result<ChargingPlan> {
    let (Some(first), Some(data_end)) = (series.first(), series.end()) else {
        return Err(Error::DataUnavailable(String::from("no prices are known yet")));
    };
    if let Some(departure) = departure {
        if departure <= first.period_start {
            return Err(Error::InvalidInput(format!(
                "departure `{departure}` is not after the earliest known price at `{}`",
                first.period_start,
            )));
        }
        if departure > data_end {
            return Err(Error::DataUnavailable(format!(
                "departure `{departure}` is beyond the last known price, which ends at `{data_end}`",
            )));
        }
    } else {
        warn!(%data_end, "no departure specified, using the end of the known prices");
    }

    let eligible = series
        .points()
        .filter(|point| departure.is_none_or(|departure| point.period_start + SLOT <= departure))
        .filter(|point| max_rate.is_none_or(|max_rate| point.rate <= max_rate))
        .collect_vec();
    let required = n_slots.get();
    if eligible.len() < required {
        return Err(Error::NoSolution { required, eligible: eligible.len() });
    }

    let chosen = eligible
        .into_iter()
        .sorted_by_key(|point| (point.rate, point.period_start))
        .take(required)
        .collect_vec();
    #[expect(clippy::cast_precision_loss)]
    let average_rate =
        chosen.iter().map(|point| point.rate).sum::<KilowattHourRate>() / required as f64;
    let periods = chosen.into_iter().map(|point| point.period_start).try_into_periods()?;
    info!(n_periods = periods.len(), %average_rate, "planned");

    Ok(ChargingPlan { periods, average_rate, n_slots: required, departure })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::series::tests::{dense_series, series_of, slot_at};

    #[test]
    fn test_merges_cheapest_slots() -> Result<()> {
        let series = dense_series(&[20.0, 5.0, 5.0, 20.0]);
        let plan = plan_charging().series(&series).n_slots(Slots::try_new(2)?).call()?;
        assert_eq!(plan.periods, vec![Period::try_new(slot_at(1), slot_at(3))?]);
        assert_abs_diff_eq!(plan.average_rate.0, 5.0);
        assert_eq!(plan.n_slots, 2);
        Ok(())
    }

    #[test]
    fn test_splits_into_multiple_periods() -> Result<()> {
        let series = dense_series(&[1.0, 9.0, 2.0, 2.0, 9.0, 0.5]);
        let plan = plan_charging().series(&series).n_slots(Slots::try_from_hours(2.0)?).call()?;
        assert_eq!(
            plan.periods,
            vec![
                Period::try_new(slot_at(0), slot_at(1))?,
                Period::try_new(slot_at(2), slot_at(4))?,
                Period::try_new(slot_at(5), slot_at(6))?,
            ]
        );
        assert_abs_diff_eq!(plan.average_rate.0, 1.375);
        Ok(())
    }

    #[test]
    fn test_ties_prefer_earlier_slots() -> Result<()> {
        let series = dense_series(&[3.0, 3.0, 3.0, 3.0]);
        let plan = plan_charging().series(&series).n_slots(Slots::try_new(1)?).call()?;
        assert_eq!(plan.periods, vec![Period::try_new(slot_at(0), slot_at(1))?]);
        Ok(())
    }

    #[test]
    fn test_departure_excludes_later_slots() -> Result<()> {
        let series = dense_series(&[9.0, 8.0, 7.0, 1.0, 1.0]);
        let plan = plan_charging()
            .series(&series)
            .n_slots(Slots::try_new(2)?)
            .departure(slot_at(3))
            .call()?;
        assert_eq!(plan.periods, vec![Period::try_new(slot_at(1), slot_at(3))?]);
        Ok(())
    }

    #[test]
    fn test_unaligned_departure_excludes_the_slot_in_progress() -> Result<()> {
        let series = dense_series(&[9.0, 1.0, 8.0, 1.0]);
        let departure = slot_at(3) + chrono::TimeDelta::minutes(10);
        let plan = plan_charging()
            .series(&series)
            .n_slots(Slots::try_new(1)?)
            .departure(departure)
            .call()?;
        assert_eq!(plan.periods, vec![Period::try_new(slot_at(1), slot_at(2))?]);
        Ok(())
    }

    #[test]
    fn test_ceiling_below_minimum() -> Result<()> {
        let series = dense_series(&[20.0, 5.0, 5.0, 20.0]);
        let result = plan_charging()
            .series(&series)
            .n_slots(Slots::try_new(2)?)
            .max_rate(KilowattHourRate(4.99))
            .call();
        assert!(matches!(result, Err(Error::NoSolution { required: 2, eligible: 0 })));
        Ok(())
    }

    #[test]
    fn test_never_returns_a_shorter_plan() -> Result<()> {
        let series = dense_series(&[20.0, 5.0, 5.0, 20.0]);
        let result = plan_charging()
            .series(&series)
            .n_slots(Slots::try_new(3)?)
            .max_rate(KilowattHourRate(5.0))
            .call();
        assert!(matches!(result, Err(Error::NoSolution { required: 3, eligible: 2 })));
        Ok(())
    }

    #[test]
    fn test_departure_before_data() -> Result<()> {
        let series = series_of(&[(2, 1.0), (3, 1.0)]);
        let result = plan_charging()
            .series(&series)
            .n_slots(Slots::try_new(1)?)
            .departure(slot_at(1))
            .call();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        Ok(())
    }

    #[test]
    fn test_departure_beyond_known_prices() -> Result<()> {
        let series = dense_series(&[1.0, 1.0]);
        let result = plan_charging()
            .series(&series)
            .n_slots(Slots::try_new(1)?)
            .departure(slot_at(5))
            .call();
        assert!(matches!(result, Err(Error::DataUnavailable(_))));
        Ok(())
    }

    #[test]
    fn test_empty_series() -> Result<()> {
        let result =
            plan_charging().series(&PriceSeries::default()).n_slots(Slots::try_new(1)?).call();
        assert!(matches!(result, Err(Error::DataUnavailable(_))));
        Ok(())
    }
}
