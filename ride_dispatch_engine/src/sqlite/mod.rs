//! SQLite backend for the ride dispatch engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
