//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection`
//! argument. Callers can obtain a connection from a pool, or open a transaction and pass `&mut tx` through, without any
//! other changes.
//!
//! SQLite has no `SELECT ... FOR UPDATE`. Callers that need to read-then-write consistently must make a *write* the
//! first statement of their transaction, which takes the database write lock up front. See [`rides::lock_ride`] and
//! [`rides::lock_unmatched_rides`].
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod chair_locations;
pub mod chairs;
pub mod ride_statuses;
pub mod rides;
pub mod users;

const SQLITE_DB_URL: &str = "sqlite://data/ride_dispatch.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("RDS_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ RDS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
