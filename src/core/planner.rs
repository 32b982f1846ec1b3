use bon::Builder;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};

use crate::{
    core::{
        cache::TimeSeriesCache,
        charging::{ChargingPlan, plan_charging},
        error::{Error, Result},
        period::Period,
        provider::PriceProvider,
        series::PriceSeries,
        slot::{self, Slots},
        store::PriceStore,
        summary::Summary,
        vehicle::TargetHours,
        window::{Extremes, UsageMode, Window},
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

#[derive(Copy, Clone, Debug, Builder)]
pub struct ChargingRequest {
    /// Explicit charging duration, otherwise asked from the vehicle.
    pub hours: Option<f64>,

    pub departure: Option<DateTime<Utc>>,
    pub max_rate: Option<KilowattHourRate>,
}

/// Everything a single run needs, passed around explicitly.
pub struct Planner<P, S> {
    cache: TimeSeriesCache<P, S>,
    vehicle: Option<Box<dyn TargetHours>>,
}

impl<P: PriceProvider, S: PriceStore> Planner<P, S> {
    pub fn new(cache: TimeSeriesCache<P, S>) -> Self {
        Self { cache, vehicle: None }
    }

    #[must_use]
    pub fn with_vehicle(mut self, vehicle: Box<dyn TargetHours>) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    pub fn prices(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<PriceSeries> {
        self.cache.get(start, Some(end))
    }

    pub fn prices_from(&self, start: DateTime<Utc>) -> Result<PriceSeries> {
        self.cache.get(start, None)
    }

    /// Known prices starting from the slot in progress.
    pub fn upcoming_prices(&self, now: DateTime<Utc>) -> Result<PriceSeries> {
        self.prices_from(slot::floor(now))
    }

    /// Rolling window over the upcoming prices, never touching the excluded periods.
    #[instrument(skip_all, fields(hours = hours, ?mode, n_excluded = excluded.len()))]
    pub fn plan_usage(
        &self,
        now: DateTime<Utc>,
        hours: f64,
        mode: UsageMode,
        excluded: &[Period],
    ) -> Result<Window> {
        let n_slots = Slots::try_from_hours(hours)?;
        let series = self.upcoming_prices(now)?.without(excluded);
        Ok(Extremes::find(&series, n_slots)?.get(mode))
    }

    #[instrument(skip_all, fields(?request))]
    pub fn plan_charging(
        &self,
        now: DateTime<Utc>,
        request: &ChargingRequest,
    ) -> Result<ChargingPlan> {
        let n_slots = match (request.hours, &self.vehicle) {
            (Some(hours), _) => Slots::try_from_hours(hours)?,
            (None, Some(vehicle)) => {
                let hours = vehicle.hours_to_target()?;
                info!(hours, "estimated the charging time");
                if hours <= 0.0 {
                    return Err(Error::InvalidInput(String::from(
                        "the vehicle is already charged up to the limit",
                    )));
                }
                Slots::try_ceil_hours(hours)?
            }
            (None, None) => {
                return Err(Error::InvalidInput(String::from(
                    "either the charging hours or the vehicle state is required",
                )));
            }
        };
        plan_charging()
            .series(&self.upcoming_prices(now)?)
            .n_slots(n_slots)
            .maybe_departure(request.departure)
            .maybe_max_rate(request.max_rate)
            .call()
    }

    pub fn summarize(&self, now: DateTime<Utc>, hours: f64) -> Result<Summary> {
        let n_slots = Slots::try_from_hours(hours)?;
        Summary::try_new(&self.upcoming_prices(now)?, now, n_slots)
    }

    /// Whether the known prices extend past the end of the local day.
    pub fn has_prices_for_tomorrow<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<bool> {
        let end_of_day = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .and_then(|date| {
                date.and_time(NaiveTime::MIN).and_local_timezone(now.timezone()).earliest()
            })
            .ok_or_else(|| Error::InvalidInput(format!("`{now:?}` has no end of the day")))?
            .with_timezone(&Utc);
        let series = self.upcoming_prices(now.with_timezone(&Utc))?;
        Ok(series.end().is_some_and(|end| end > end_of_day))
    }
}
