use bon::Builder;

use crate::{
    core::error::{Error, Result},
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
};

/// Anything that can estimate how long it needs to charge.
pub trait TargetHours {
    /// Hours of charging left to reach the target, possibly fractional.
    fn hours_to_target(&self) -> Result<f64>;
}

/// Vehicle battery snapshot.
#[derive(Copy, Clone, Debug, Builder)]
pub struct ChargeState {
    pub battery_level: Percent,
    pub charge_limit: Percent,
    pub capacity: KilowattHours,
    pub charging_power: Kilowatts,
}

impl TargetHours for ChargeState {
    fn hours_to_target(&self) -> Result<f64> {
        for percent in [self.battery_level, self.charge_limit] {
            if percent > Percent(100) {
                return Err(Error::InvalidInput(format!("{percent} is not a valid charge level")));
            }
        }
        if !self.charging_power.0.is_finite() || self.charging_power.0 <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "charging power must be positive, got {}",
                self.charging_power,
            )));
        }
        if !self.capacity.0.is_finite() || self.capacity.0 < 0.0 {
            return Err(Error::InvalidInput(format!(
                "battery capacity must not be negative, got {}",
                self.capacity,
            )));
        }
        let missing = self.charge_limit.to_proportion() - self.battery_level.to_proportion();
        let hours = KilowattHours(self.capacity.0 * missing) / self.charging_power;
        Ok(hours.max(0.0))
    }
}
