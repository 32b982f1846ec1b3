use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    core::{
        error::{Error, Result},
        series::{PricePoint, PriceSeries},
        slot::{self, Slots},
        window::{Extremes, Window},
    },
    quantity::rate::KilowattHourRate,
};

/// Daily price digest.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Summary {
    /// Price of the slot in progress, if known.
    pub current: Option<PricePoint>,

    pub best: Window,
    pub peak: Window,
    pub average_rate: KilowattHourRate,

    /// Mean rate with the peak window excluded, unless the peak covers everything.
    pub average_rate_outside_peak: Option<KilowattHourRate>,
}

impl Summary {
    pub fn try_new(series: &PriceSeries, now: DateTime<Utc>, n_slots: Slots) -> Result<Self> {
        let Extremes { best, peak } = Extremes::find(series, n_slots)?;
        let average_rate = series
            .average_rate()
            .ok_or_else(|| Error::DataUnavailable(String::from("no prices are known yet")))?;
        let current_start = slot::floor(now);
        Ok(Self {
            current: series.get(current_start).map(|rate| PricePoint::new(current_start, rate)),
            best,
            peak,
            average_rate,
            average_rate_outside_peak: series.without(&[peak.period]).average_rate(),
        })
    }
}
