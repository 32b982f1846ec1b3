use std::fmt::Display;

use chrono::TimeZone;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        charging::ChargingPlan,
        series::PriceSeries,
        slot::SLOT,
        summary::Summary,
        window::Window,
    },
    fmt::ShortPeriod,
    quantity::rate::KilowattHourRate,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn rate_cell(rate: KilowattHourRate, average_rate: KilowattHourRate) -> Cell {
    Cell::new(format!("{rate:.2}"))
        .set_alignment(CellAlignment::Right)
        .fg(if rate >= average_rate { Color::Red } else { Color::Green })
}

pub fn build_prices_table<Tz: TimeZone>(series: &PriceSeries, timezone: &Tz) -> Table
where
    Tz::Offset: Display,
{
    let average_rate = series.average_rate().unwrap_or(KilowattHourRate(0.0));
    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Rate"]);
    for point in series.points() {
        let start = point.period_start.with_timezone(timezone);
        let end = (point.period_start + SLOT).with_timezone(timezone);
        table.add_row(vec![
            Cell::new(start.format("%a %d")).add_attribute(Attribute::Dim),
            Cell::new(start.format("%H:%M")),
            Cell::new(end.format("%H:%M")).add_attribute(Attribute::Dim),
            rate_cell(point.rate, average_rate),
        ]);
    }
    table
}

pub fn build_window_table<Tz: TimeZone>(windows: &[(&str, Window)], timezone: &Tz) -> Table
where
    Tz::Offset: Display,
{
    let mut table = new_table();
    table.set_header(vec!["", "Period", "Average rate"]);
    for (name, window) in windows {
        table.add_row(vec![
            Cell::new(name).add_attribute(Attribute::Bold),
            Cell::new(ShortPeriod { period: window.period, timezone: timezone.clone() }),
            Cell::new(format!("{:.2}", window.average_rate)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_plan_table<Tz: TimeZone>(plan: &ChargingPlan, timezone: &Tz) -> Table
where
    Tz::Offset: Display,
{
    let mut table = new_table();
    table.set_header(vec!["Period", "Slots"]);
    for period in &plan.periods {
        table.add_row(vec![
            Cell::new(ShortPeriod { period: *period, timezone: timezone.clone() }),
            Cell::new(period.n_slots()).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new(format!("Average {:.2}", plan.average_rate)).add_attribute(Attribute::Bold),
        Cell::new(plan.n_slots).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn build_summary_table<Tz: TimeZone>(summary: &Summary, timezone: &Tz) -> Table
where
    Tz::Offset: Display,
{
    let mut table = build_window_table(&[("Best", summary.best), ("Peak", summary.peak)], timezone);
    if let Some(current) = summary.current {
        table.add_row(vec![
            Cell::new("Now").add_attribute(Attribute::Bold),
            Cell::new(current.period_start.with_timezone(timezone).format("%a %d %H%M")),
            rate_cell(current.rate, summary.average_rate),
        ]);
    }
    table.add_row(vec![
        Cell::new("Average").add_attribute(Attribute::Bold),
        Cell::new("all known slots").add_attribute(Attribute::Dim),
        Cell::new(format!("{:.2}", summary.average_rate)).set_alignment(CellAlignment::Right),
    ]);
    if let Some(average_rate) = summary.average_rate_outside_peak {
        table.add_row(vec![
            Cell::new("Off-peak").add_attribute(Attribute::Bold),
            Cell::new("outside the peak").add_attribute(Attribute::Dim),
            Cell::new(format!("{average_rate:.2}")).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::core::{
        error::Result,
        series::tests::{dense_series, slot_at},
        slot::Slots,
    };

    #[test]
    fn test_build_prices_table() {
        let table = build_prices_table(&dense_series(&[1.0, 20.0, 3.5]), &Utc);
        assert_eq!(table.row_iter().count(), 3);
        assert!(table.to_string().contains("20.00 p/kWh"));
    }

    #[test]
    fn test_build_summary_table() -> Result<()> {
        let series = dense_series(&[4.0, 30.0, 40.0, 2.0]);
        let summary = Summary::try_new(&series, slot_at(0), Slots::try_new(2)?)?;
        let table = build_summary_table(&summary, &Utc);
        assert_eq!(table.row_iter().count(), 5);
        assert!(table.to_string().contains("Fri 01 0030-0130"));
        Ok(())
    }
}
