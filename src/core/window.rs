use serde::Serialize;

use crate::{
    core::{
        error::{Error, Result},
        period::Period,
        series::PriceSeries,
        slot::Slots,
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum UsageMode {
    /// Lowest average rate.
    Best,

    /// Highest average rate.
    Peak,
}

/// Contiguous run of slots and its mean rate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Window {
    pub period: Period,
    pub average_rate: KilowattHourRate,
}

const MICROS: f64 = 1_000_000.0;

#[expect(clippy::cast_possible_truncation)]
fn to_micros(rate: KilowattHourRate) -> i64 {
    (rate.0 * MICROS).round() as i64
}

#[derive(Copy, Clone, Debug)]
pub struct Extremes {
    pub best: Window,
    pub peak: Window,
}

impl Extremes {
    /// Find the cheapest and the most expensive fully-priced windows of the given length.
    ///
    /// Single pass with a running sum over every run of consecutive slots. A window may
    /// only start where all of its slots are priced. The earliest window wins a tie.
    ///
    /// The sum is accumulated in micro-pence, so equal windows compare exactly equal.
    #[instrument(skip_all, fields(n_slots = n_slots.get()))]
    #[expect(clippy::cast_precision_loss)]
    pub fn find(series: &PriceSeries, n_slots: Slots) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::DataUnavailable(String::from("no prices are known yet")));
        }
        let length = n_slots.get();

        let mut best: Option<(i64, Window)> = None;
        let mut peak: Option<(i64, Window)> = None;
        let mut longest_run = 0;

        for run in series.runs() {
            longest_run = longest_run.max(run.len());
            if run.len() < length {
                continue;
            }
            let mut sum: i64 = run[..length].iter().map(|point| to_micros(point.rate)).sum();
            for offset in 0..=(run.len() - length) {
                if offset != 0 {
                    sum += to_micros(run[offset + length - 1].rate)
                        - to_micros(run[offset - 1].rate);
                }
                let window = Window {
                    period: Period::try_new(
                        run[offset].period_start,
                        run[offset].period_start + n_slots.duration(),
                    )?,
                    average_rate: KilowattHourRate(sum as f64 / MICROS / length as f64),
                };
                if best.is_none_or(|(best_sum, _)| sum < best_sum) {
                    best = Some((sum, window));
                }
                if peak.is_none_or(|(peak_sum, _)| sum > peak_sum) {
                    peak = Some((sum, window));
                }
            }
        }

        match (best, peak) {
            (Some((_, best)), Some((_, peak))) => {
                debug!(?best, ?peak, "found");
                Ok(Self { best, peak })
            }
            _ => Err(Error::InsufficientData { required: length, available: longest_run }),
        }
    }

    pub const fn get(self, mode: UsageMode) -> Window {
        match mode {
            UsageMode::Best => self.best,
            UsageMode::Peak => self.peak,
        }
    }
}
