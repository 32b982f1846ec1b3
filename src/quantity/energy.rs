use std::ops::Div;

use crate::quantity::power::Kilowatts;

quantity!(KilowattHours, "kWh");

impl Div<Kilowatts> for KilowattHours {
    type Output = f64;

    /// Hours needed to transfer the energy at the specified power.
    fn div(self, rhs: Kilowatts) -> Self::Output {
        self.0 / rhs.0
    }
}
