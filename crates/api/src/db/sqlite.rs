use async_trait::async_trait;
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use time::Date;

use super::{
    format_date, parse_date, ClimateData, DateBounds, DateWindow, Error, PrecipitationReading,
    TemperatureSummary,
};

const REQUIRED_TABLES: [&str; 2] = ["station", "measurement"];

/// Read-only access to the station/measurement dataset.
///
/// Every query checks a connection out of the pool for its own duration; the
/// connection goes back to the pool when the guard drops.
pub struct ClimateAccess {
    pool: SqlitePool,
}

impl ClimateAccess {
    pub async fn open(path: &str, max_connections: u32) -> Result<Self, Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .read_only(true)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-16000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let access = Self::from_pool(pool);
        access.health_check().await?;
        info!("SQLite dataset opened read-only at: {}", path);

        Ok(access)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check connectivity and that both dataset tables are present.
    pub async fn health_check(&self) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query("SELECT 1").fetch_one(&mut *conn).await?;

        for table in REQUIRED_TABLES {
            let found: Option<String> = sqlx::query_scalar(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_optional(&mut *conn)
            .await?;
            if found.is_none() {
                return Err(Error::MissingTable(table.to_string()));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn latest_date(&self) -> Result<Option<Date>, Error> {
        let mut conn = self.pool.acquire().await?;
        let latest: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(&mut *conn)
            .await?;

        latest.as_deref().map(parse_date).transpose()
    }

    async fn most_active_station(&self) -> Result<Option<String>, Error> {
        let mut conn = self.pool.acquire().await?;
        // COUNT(prcp) skips NULL readings; MIN(rowid) keeps storage order on ties
        let station: Option<String> = sqlx::query_scalar(
            "SELECT station FROM measurement
             GROUP BY station
             ORDER BY COUNT(prcp) DESC, MIN(rowid) ASC
             LIMIT 1",
        )
        .fetch_optional(&mut *conn)
        .await?;

        debug!("most active station: {:?}", station);
        Ok(station)
    }

    async fn precipitation(&self, window: &DateWindow) -> Result<Vec<PrecipitationReading>, Error> {
        let start = format_date(window.start);
        let end = format_date(window.end);

        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(String, Option<f64>)> = sqlx::query_as(
            "SELECT date, CAST(prcp AS REAL)
             FROM measurement
             WHERE date >= ? AND date <= ?
             ORDER BY rowid",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, prcp)| PrecipitationReading { date, prcp })
            .collect())
    }

    async fn stations(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.pool.acquire().await?;
        let stations = sqlx::query_scalar("SELECT station FROM station ORDER BY rowid")
            .fetch_all(&mut *conn)
            .await?;
        Ok(stations)
    }

    async fn temperature_observations(
        &self,
        station: &str,
        window: &DateWindow,
    ) -> Result<Vec<f64>, Error> {
        let start = format_date(window.start);
        let end = format_date(window.end);

        let mut conn = self.pool.acquire().await?;
        let tobs = sqlx::query_scalar(
            "SELECT CAST(tobs AS REAL)
             FROM measurement
             WHERE station = ? AND date >= ? AND date <= ?
             ORDER BY rowid",
        )
        .bind(station)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;
        Ok(tobs)
    }

    async fn temperature_summary(&self, bounds: &DateBounds) -> Result<TemperatureSummary, Error> {
        let start = format_date(bounds.start);

        let mut conn = self.pool.acquire().await?;
        // Aggregates over zero rows come back as NULL, which maps to None
        let (min, avg, max): (Option<f64>, Option<f64>, Option<f64>) = match bounds.end {
            Some(end) => {
                sqlx::query_as(
                    "SELECT CAST(MIN(tobs) AS REAL), AVG(tobs), CAST(MAX(tobs) AS REAL)
                     FROM measurement
                     WHERE date >= ? AND date <= ?",
                )
                .bind(start)
                .bind(format_date(end))
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT CAST(MIN(tobs) AS REAL), AVG(tobs), CAST(MAX(tobs) AS REAL)
                     FROM measurement
                     WHERE date >= ?",
                )
                .bind(start)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(TemperatureSummary::rounded(min, avg, max))
    }
}
