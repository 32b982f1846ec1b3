//! [Octopus Energy](https://developer.octopus.energy/rest/) unit rates client.

use std::time::Duration;

use bon::bon;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Deserialize;
use ureq::Agent;

use crate::{
    core::{
        error::{Error, Result},
        provider::{PriceProvider, Publication},
        series::{PricePoint, PriceSeries},
        slot::SLOT,
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

pub struct Api {
    client: Agent,
    url: String,
    publication: Publication<Local>,
}

#[bon]
impl Api {
    #[builder]
    pub fn new(
        base_url: &str,
        product: &str,
        region: &str,
        publication: Publication<Local>,
    ) -> Self {
        let client =
            Agent::config_builder().timeout_global(Some(Duration::from_secs(10))).build().into();
        let url = format!(
            "{}/v1/products/{product}/electricity-tariffs/E-1R-{product}-{region}/standard-unit-rates/",
            base_url.trim_end_matches('/'),
        );
        Self { client, url, publication }
    }
}

impl PriceProvider for Api {
    #[instrument(skip_all, fields(%start, ?end))]
    fn fetch(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<PriceSeries> {
        info!("fetching…");
        let mut request = self
            .client
            .get(&self.url)
            .query("period_from", start.to_rfc3339_opts(SecondsFormat::Secs, true));
        if let Some(end) = end {
            request = request.query("period_to", end.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let mut page = request.call()?.body_mut().read_json::<Page>()?;
        let mut rates = Vec::new();
        loop {
            rates.extend(page.results);
            let Some(next) = page.next else {
                break;
            };
            debug!(%next, "following the next page…");
            page = self.client.get(&next).call()?.body_mut().read_json::<Page>()?;
        }
        info!(n_rates = rates.len(), "fetched");
        Rate::try_into_series(rates)
    }

    fn horizon(&self) -> Option<DateTime<Utc>> {
        self.publication.horizon_at(Utc::now())
    }
}

#[derive(Deserialize)]
struct Page {
    next: Option<String>,
    results: Vec<Rate>,
}

#[derive(Deserialize)]
struct Rate {
    value_inc_vat: KilowattHourRate,
    valid_from: DateTime<Utc>,
    valid_to: Option<DateTime<Utc>>,
}

impl Rate {
    /// Validate that every rate spans exactly one slot, nothing is returned otherwise.
    fn try_into_series(rates: Vec<Self>) -> Result<PriceSeries> {
        for rate in &rates {
            if rate.valid_to.is_none_or(|valid_to| valid_to - rate.valid_from != SLOT) {
                return Err(Error::InvalidInput(format!(
                    "rate from `{}` to `{:?}` does not span exactly 30 minutes",
                    rate.valid_from, rate.valid_to,
                )));
            }
        }
        PriceSeries::try_from_points(
            rates.into_iter().map(|rate| PricePoint::new(rate.valid_from, rate.value_inc_vat)),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, TimeZone};

    use super::*;

    // language=json
    const PAGE: &str = r#"{
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {
                "value_exc_vat": 21.7,
                "value_inc_vat": 22.785,
                "valid_from": "2024-03-01T00:30:00Z",
                "valid_to": "2024-03-01T01:00:00Z",
                "payment_method": null
            },
            {
                "value_exc_vat": -1.1,
                "value_inc_vat": -1.155,
                "valid_from": "2024-03-01T00:00:00Z",
                "valid_to": "2024-03-01T00:30:00Z",
                "payment_method": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_page() -> Result<()> {
        let page = serde_json::from_str::<Page>(PAGE).unwrap();
        assert!(page.next.is_none());

        let series = Rate::try_into_series(page.results)?;
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first(), Some(PricePoint::new(midnight, KilowattHourRate(-1.155))));
        assert_eq!(series.end(), Some(midnight + SLOT * 2));
        Ok(())
    }

    #[test]
    fn test_rejects_hourly_rate() {
        let rates = vec![Rate {
            value_inc_vat: KilowattHourRate(20.0),
            valid_from: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            valid_to: Some(Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap()),
        }];
        assert!(matches!(Rate::try_into_series(rates), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_open_ended_rate() {
        let rates = vec![Rate {
            value_inc_vat: KilowattHourRate(20.0),
            valid_from: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            valid_to: None,
        }];
        assert!(matches!(Rate::try_into_series(rates), Err(Error::InvalidInput(_))));
    }

    #[test]
    #[ignore = "makes the API request"]
    fn test_fetch_ok() -> Result<()> {
        let api = Api::builder()
            .base_url("https://api.octopus.energy")
            .product("AGILE-24-10-01")
            .region("H")
            .publication(Publication {
                cutoff: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                until: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
                timezone: Local,
            })
            .build();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let series = api.fetch(start, Some(start + SLOT * 48))?;
        assert_eq!(series.len(), 48);
        assert_eq!(series.first().unwrap().period_start, start);
        Ok(())
    }
}
