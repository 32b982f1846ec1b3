use chrono::{Local, NaiveTime, Utc};
use clap::Parser;

use crate::{
    cli::PlannerArgs,
    core::{
        planner::ChargingRequest,
        time::{next_occurrence, parse_aware},
        vehicle::ChargeState,
    },
    prelude::*,
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts, rate::KilowattHourRate},
    tables::build_plan_table,
};

#[derive(Parser)]
pub struct ChargeArgs {
    #[clap(flatten)]
    pub planner: PlannerArgs,

    /// Charging duration, a multiple of half an hour. Estimated from the vehicle state when unset.
    #[clap(long)]
    pub hours: Option<f64>,

    #[clap(flatten)]
    pub vehicle: VehicleArgs,

    /// Departure as an RFC 3339 timestamp with an offset.
    #[clap(long, conflicts_with = "departure_hour")]
    pub departure: Option<String>,

    /// Departure as the next occurrence of the local time of day, for example `07:30`.
    #[clap(long = "departure-hour", env = "DEPARTURE_HOUR")]
    pub departure_hour: Option<NaiveTime>,

    /// Skip slots priced above the ceiling, p/kWh.
    #[clap(long = "max-rate", env = "MAX_RATE")]
    pub max_rate: Option<KilowattHourRate>,

    /// Print the plan as JSON for the scheduler instead of the table.
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct VehicleArgs {
    /// Current battery level, percent.
    #[clap(long = "battery-level", env = "BATTERY_LEVEL")]
    pub battery_level: Option<Percent>,

    /// Charge limit, percent.
    #[clap(long = "charge-limit", env = "CHARGE_LIMIT")]
    pub charge_limit: Option<Percent>,

    /// Usable battery capacity, kilowatt-hours.
    #[clap(long = "battery-capacity", env = "BATTERY_CAPACITY")]
    pub battery_capacity: Option<KilowattHours>,

    /// Charger power, kilowatts.
    #[clap(long = "charging-power", env = "CHARGING_POWER")]
    pub charging_power: Option<Kilowatts>,
}

impl VehicleArgs {
    /// Vehicle state when it is fully specified.
    fn charge_state(&self) -> Result<Option<ChargeState>> {
        match (self.battery_level, self.charge_limit, self.battery_capacity, self.charging_power) {
            (Some(battery_level), Some(charge_limit), Some(capacity), Some(charging_power)) => {
                Ok(Some(ChargeState { battery_level, charge_limit, capacity, charging_power }))
            }
            (None, None, None, None) => Ok(None),
            _ => bail!(
                "battery level, charge limit, battery capacity, and charging power go together"
            ),
        }
    }
}

#[instrument(skip_all)]
pub fn charge(args: &ChargeArgs) -> Result {
    let departure = match (&args.departure, args.departure_hour) {
        (Some(departure), _) => Some(parse_aware(departure)?),
        (None, Some(hour)) => Some(next_occurrence(&Local::now(), hour)?),
        (None, None) => None,
    };
    let request = ChargingRequest::builder()
        .maybe_hours(args.hours)
        .maybe_departure(departure)
        .maybe_max_rate(args.max_rate)
        .build();

    let mut planner = args.planner.new_planner()?;
    if let Some(charge_state) = args.vehicle.charge_state()? {
        planner = planner.with_vehicle(Box::new(charge_state));
    }
    let plan = planner.plan_charging(Utc::now(), &request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{}", build_plan_table(&plan, &Local));
    }
    Ok(())
}
