//! Storage backend trait abstraction
//!
//! Async domain traits implemented by the PostgreSQL and in-memory backends.

pub mod price_report;
pub mod strategy;

pub use price_report::PriceReportStore;
pub use strategy::StrategyStore;
