//! Storage layer for medassist
//!
//! PostgreSQL backend (sqlx) for the hosted database plus an in-memory
//! backend for tests and database-less runs, unified behind
//! [`StorageBackend`].

mod backend;
pub mod error;
mod memory;
mod pg_migrations;
mod pg_storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::{MemorySeed, MemoryStorage, PharmacyRecord, SavingsOptionRecord, StrategyRecord};
pub use pg_migrations::run_pg_migrations;
pub use pg_storage::PgStorage;
