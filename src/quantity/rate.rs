quantity!(KilowattHourRate, "p/kWh");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_with_negative_rates() {
        let mut rates = vec![KilowattHourRate(5.0), KilowattHourRate(-1.5), KilowattHourRate(0.0)];
        rates.sort();
        assert_eq!(rates, vec![KilowattHourRate(-1.5), KilowattHourRate(0.0), KilowattHourRate(5.0)]);
    }

    #[test]
    fn test_display_respects_precision() {
        assert_eq!(format!("{:.2}", KilowattHourRate(15.456)), "15.46 p/kWh");
    }

    #[test]
    fn test_average() {
        let total: KilowattHourRate = [1.0, 2.0, 6.0].into_iter().map(KilowattHourRate).sum();
        assert_eq!(total / 3.0, KilowattHourRate(3.0));
    }
}
