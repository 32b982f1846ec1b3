use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::{
    core::{
        error::{Error, Result},
        series::{PricePoint, PriceSeries},
        store::PriceStore,
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

// language=sqlite
const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS prices (
        period_start INTEGER PRIMARY KEY,
        rate REAL NOT NULL
    ) STRICT;
";

// language=sqlite
const UPSERT: &str = "
    INSERT INTO prices (period_start, rate) VALUES (?1, ?2)
    ON CONFLICT (period_start) DO UPDATE SET rate = excluded.rate
";

// language=sqlite
const SELECT_RANGE: &str = "
    SELECT period_start, rate FROM prices
    WHERE period_start >= ?1 AND period_start < ?2
    ORDER BY period_start
";

// language=sqlite
const DELETE_BEFORE: &str = "DELETE FROM prices WHERE period_start < ?1";

/// SQLite-backed price store, shareable between processes through the same file.
#[must_use]
pub struct Db(Connection);

impl Db {
    /// Open the database and create the schema if needed. `:memory:` opens a private in-memory one.
    #[instrument(skip_all, fields(path = path))]
    pub fn connect(path: &str) -> Result<Self> {
        debug!("connecting…");
        let connection = Connection::open(path)?;
        connection.busy_timeout(Duration::from_secs(5))?;
        connection.execute_batch(CREATE_SCHEMA)?;
        Ok(Self(connection))
    }

    /// Delete the prices of the slots starting before the timestamp.
    #[instrument(skip_all, fields(%before))]
    pub fn purge_before(&self, before: DateTime<Utc>) -> Result<usize> {
        let n_deleted = self.0.prepare_cached(DELETE_BEFORE)?.execute([before.timestamp()])?;
        info!(n_deleted, "purged");
        Ok(n_deleted)
    }

    fn upsert_with(connection: &Connection, point: PricePoint) -> Result<()> {
        connection
            .prepare_cached(UPSERT)?
            .execute(params![point.period_start.timestamp(), point.rate.0])?;
        Ok(())
    }
}

impl PriceStore for Db {
    fn read_range(
        &self,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<PriceSeries> {
        let mut statement = self.0.prepare_cached(SELECT_RANGE)?;
        let rows = statement
            .query_map(
                [start.timestamp(), end.map_or(i64::MAX, |end| end.timestamp())],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        let points = rows
            .into_iter()
            .map(|(timestamp, rate)| {
                DateTime::from_timestamp(timestamp, 0)
                    .map(|period_start| PricePoint::new(period_start, KilowattHourRate(rate)))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!("stored timestamp `{timestamp}` is invalid"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        PriceSeries::try_from_points(points)
    }

    fn upsert(&self, point: PricePoint) -> Result<()> {
        Self::upsert_with(&self.0, point)
    }

    /// Upsert the whole batch in a single transaction.
    fn upsert_all(&self, series: &PriceSeries) -> Result<()> {
        let transaction = self.0.unchecked_transaction()?;
        for point in series.points() {
            Self::upsert_with(&transaction, point)?;
        }
        transaction.commit()?;
        debug!(n_points = series.len(), "upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::tests::{dense_series, series_of, slot_at};

    #[test]
    fn test_upsert_and_read_range() -> Result<()> {
        let db = Db::connect(":memory:")?;
        db.upsert_all(&dense_series(&[1.0, 2.0, 3.0, 4.0]))?;

        assert_eq!(db.read_range(slot_at(1), Some(slot_at(3)))?, series_of(&[(1, 2.0), (2, 3.0)]));
        assert_eq!(db.read_range(slot_at(2), None)?.len(), 2);
        assert!(db.read_range(slot_at(4), None)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_upsert_overwrites() -> Result<()> {
        let db = Db::connect(":memory:")?;
        db.upsert(PricePoint::new(slot_at(0), KilowattHourRate(1.0)))?;
        db.upsert(PricePoint::new(slot_at(0), KilowattHourRate(-2.5)))?;
        assert_eq!(db.read_range(slot_at(0), None)?, series_of(&[(0, -2.5)]));
        Ok(())
    }

    #[test]
    fn test_purge_before() -> Result<()> {
        let db = Db::connect(":memory:")?;
        db.upsert_all(&dense_series(&[1.0, 2.0, 3.0]))?;
        assert_eq!(db.purge_before(slot_at(2))?, 2);
        assert_eq!(db.read_range(slot_at(0), None)?, series_of(&[(2, 3.0)]));
        Ok(())
    }

    #[test]
    fn test_concurrent_upserts_same_slot() -> Result<()> {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let first = Db::connect(path)?;
        let second = Db::connect(path)?;

        first.upsert(PricePoint::new(slot_at(0), KilowattHourRate(12.5)))?;
        second.upsert_all(&series_of(&[(0, 14.0), (1, 15.0)]))?;
        first.upsert(PricePoint::new(slot_at(0), KilowattHourRate(13.25)))?;

        let n_rows: i64 = second.0.query_row(
            "SELECT COUNT(*) FROM prices WHERE period_start = ?1",
            [slot_at(0).timestamp()],
            |row| row.get(0),
        )?;
        assert_eq!(n_rows, 1);
        assert_eq!(second.read_range(slot_at(0), None)?, series_of(&[(0, 13.25), (1, 15.0)]));
        Ok(())
    }

    #[test]
    fn test_rejects_misaligned_rows() -> Result<()> {
        let db = Db::connect(":memory:")?;
        db.0.execute(UPSERT, params![slot_at(0).timestamp() + 60, 1.0])?;
        assert!(matches!(db.read_range(slot_at(0), None), Err(Error::InvalidInput(_))));
        Ok(())
    }
}
