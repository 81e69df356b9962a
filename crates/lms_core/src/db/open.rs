//! Opening store connections.
//!
//! Each open logs one `store_open` line with its outcome and duration.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the store file at `path`, migrated to the latest schema.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    timed_open("file", || prepare(Connection::open(path)?))
}

/// In-memory connection with the same schema as a file store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    timed_open("memory", || prepare(Connection::open_in_memory()?))
}

fn prepare(mut conn: Connection) -> DbResult<Connection> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let report = apply_migrations(&mut conn)?;
    if report.changed() {
        info!(
            "event=store_schema module=db status=ok from={} to={}",
            report.from, report.to
        );
    }
    Ok(conn)
}

fn timed_open(
    mode: &'static str,
    open: impl FnOnce() -> DbResult<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = open();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=store_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=store_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
        ),
    }
    result
}
