//! Ordered schema steps for the key-value store file.
//!
//! The applied step is mirrored to `PRAGMA user_version`; steps only ever
//! append, so a file written by a newer binary is refused rather than guessed at.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// `(version, sql)` pairs, strictly increasing.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_kv_entries.sql"))];

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Versions before and after an [`apply_migrations`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: u32,
    pub to: u32,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Brings `conn` up to [`latest_version`] inside one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::SchemaTooNew {
            found: from,
            supported: latest,
        });
    }

    let pending = STEPS
        .iter()
        .filter(|(version, _)| *version > from)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(MigrationReport { from, to: from });
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    Ok(MigrationReport { from, to: latest })
}

/// Current `PRAGMA user_version`; 0 for a fresh file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version};
    use rusqlite::Connection;

    #[test]
    fn fresh_connection_migrates_once() {
        let mut conn = Connection::open_in_memory().unwrap();

        let first = apply_migrations(&mut conn).unwrap();
        assert_eq!(first.from, 0);
        assert_eq!(first.to, latest_version());
        assert!(first.changed());

        let second = apply_migrations(&mut conn).unwrap();
        assert!(!second.changed());
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }
}
