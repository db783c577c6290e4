//! Pooled SQLite candle store.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::limit::QueryLimit;
use crate::schema;
use candela_types::{BucketDuration, Candle, CandleSeries};
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};

type DbPool = Pool<SqliteConnectionManager>;

/// Opens the candle database described by `config`, creating its directory
/// and schema as needed.
///
/// The returned handle is cheap to clone; clones share one connection pool.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the database cannot
/// be opened, or the schema cannot be applied.
pub fn initialize_store(config: &StoreConfig) -> Result<CandleStore> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let busy_timeout = config.busy_timeout;
    let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
    });
    let pool = Pool::builder()
        .max_size(config.pool_size.max(1))
        .build(manager)?;

    schema::ensure(&*pool.get()?)?;
    tracing::info!(path = %config.path.display(), pool_size = pool.max_size(), "candle store ready");

    Ok(CandleStore {
        pool,
        path: config.path.clone(),
    })
}

/// Durable candle storage keyed by `(product_code, duration, bucket start)`.
///
/// Writes of the same key are serialized by SQLite; the store holds no
/// application-level locks.
#[derive(Debug, Clone)]
pub struct CandleStore {
    pool: DbPool,
    path: PathBuf,
}

/// A candle row before it is tied to its key.
struct StoredRow {
    time_ms: i64,
    open: f64,
    close: f64,
    high: f64,
    low: f64,
    volume: f64,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            time_ms: row.get(0)?,
            open: row.get(1)?,
            close: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            volume: row.get(5)?,
        })
    }

    fn into_candle(self, product_code: &str, duration: BucketDuration) -> Result<Candle> {
        let time = DateTime::<Utc>::from_timestamp_millis(self.time_ms).ok_or_else(|| {
            StoreError::CorruptRow {
                product_code: product_code.to_string(),
                time_ms: self.time_ms,
                reason: "bucket start out of range",
            }
        })?;
        Ok(Candle {
            product_code: product_code.to_string(),
            duration,
            time,
            open: self.open,
            close: self.close,
            high: self.high,
            low: self.low,
            volume: self.volume,
        })
    }
}

fn duration_key(duration: BucketDuration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

impl CandleStore {
    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts `candle`, or overwrites the stored candle with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert(&self, candle: &Candle) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            schema::UPSERT,
            params![
                candle.product_code,
                duration_key(candle.duration),
                candle.time.timestamp_millis(),
                candle.open,
                candle.close,
                candle.high,
                candle.low,
                candle.volume,
            ],
        )?;
        tracing::trace!(
            product_code = %candle.product_code,
            duration = %candle.duration,
            time = %candle.time,
            close = candle.close,
            "candle upserted"
        );
        Ok(())
    }

    /// Returns the candle starting at `time`, if stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the row is corrupt.
    pub fn find(
        &self,
        product_code: &str,
        duration: BucketDuration,
        time: DateTime<Utc>,
    ) -> Result<Option<Candle>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                schema::SELECT_ONE,
                params![product_code, duration_key(duration), time.timestamp_millis()],
                StoredRow::from_row,
            )
            .optional()?;
        row.map(|r| r.into_candle(product_code, duration)).transpose()
    }

    /// Returns the most recent stored candle, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the row is corrupt.
    pub fn latest(&self, product_code: &str, duration: BucketDuration) -> Result<Option<Candle>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                schema::SELECT_LATEST,
                params![product_code, duration_key(duration)],
                StoredRow::from_row,
            )
            .optional()?;
        row.map(|r| r.into_candle(product_code, duration)).transpose()
    }

    /// Returns the most recent `limit` candles, ordered ascending by bucket
    /// start.
    ///
    /// An unknown instrument or duration yields an empty series.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or a row is corrupt.
    pub fn query_range(
        &self,
        product_code: &str,
        duration: BucketDuration,
        limit: QueryLimit,
    ) -> Result<CandleSeries> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare_cached(schema::SELECT_RECENT)?;
        let rows = stmt
            .query_map(
                params![product_code, duration_key(duration), limit.get()],
                StoredRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // Fetched newest first; reverse to chronological order.
        let mut candles = rows
            .into_iter()
            .map(|r| r.into_candle(product_code, duration))
            .collect::<Result<Vec<_>>>()?;
        candles.reverse();

        Ok(CandleSeries::new(product_code, duration, candles))
    }

    /// Returns the number of stored candles for one timeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn count(&self, product_code: &str, duration: BucketDuration) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM candles WHERE product_code = ?1 AND duration_ms = ?2",
            params![product_code, duration_key(duration)],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
