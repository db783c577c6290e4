//! Schema and statements.

use rusqlite::Connection;

/// Candle table. Bucket start and duration are epoch/span milliseconds.
pub(crate) const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS candles (
    product_code TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    time_ms INTEGER NOT NULL,
    open REAL NOT NULL,
    close REAL NOT NULL,
    high REAL NOT NULL,
    low REAL NOT NULL,
    volume REAL NOT NULL,
    PRIMARY KEY (product_code, duration_ms, time_ms)
);
";

pub(crate) const UPSERT: &str = "
INSERT INTO candles (product_code, duration_ms, time_ms, open, close, high, low, volume)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
ON CONFLICT(product_code, duration_ms, time_ms) DO UPDATE SET
    open = excluded.open,
    close = excluded.close,
    high = excluded.high,
    low = excluded.low,
    volume = excluded.volume
";

pub(crate) const SELECT_ONE: &str = "
SELECT time_ms, open, close, high, low, volume
FROM candles
WHERE product_code = ?1 AND duration_ms = ?2 AND time_ms = ?3
";

pub(crate) const SELECT_LATEST: &str = "
SELECT time_ms, open, close, high, low, volume
FROM candles
WHERE product_code = ?1 AND duration_ms = ?2
ORDER BY time_ms DESC
LIMIT 1
";

pub(crate) const SELECT_RECENT: &str = "
SELECT time_ms, open, close, high, low, volume
FROM candles
WHERE product_code = ?1 AND duration_ms = ?2
ORDER BY time_ms DESC
LIMIT ?3
";

/// Creates the candle table if it does not exist.
pub(crate) fn ensure(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)
}
