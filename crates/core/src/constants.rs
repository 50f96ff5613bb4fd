//! Shared constants for medassist.
//!
//! Centralizes limits that the server, the clients and the local fallback
//! store must agree on.

/// Maximum number of individual price reports returned for one
/// (medication, source) pair, and the per-key cap of the local store.
pub const PRICE_REPORT_HISTORY_LIMIT: usize = 50;

/// Reports newer than this many days count towards `count` in price stats.
pub const RECENT_REPORT_WINDOW_DAYS: i64 = 90;

/// Upper bound (inclusive) for a submitted price.
pub const MAX_REPORTED_PRICE: f64 = 100_000.0;

/// Maximum length of any free-text field in a price report submission.
pub const MAX_REPORT_FIELD_LEN: usize = 200;

/// Number of hex characters kept from the submitter address digest.
pub const IP_HASH_LEN: usize = 16;

/// Lifetime of a cached medication strategy on the client, in seconds.
pub const STRATEGY_CACHE_TTL_SECS: i64 = 300;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Display string for a zero-cost price.
pub const FREE_LABEL: &str = "FREE";

/// Default port for `medassist serve`.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Base URL the API clients use when `MEDASSIST_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Request timeout for the API clients, in seconds.
pub const CLIENT_TIMEOUT_SECS: u64 = 10;
