//! Core types and helpers for medassist
//!
//! Domain types and JSON response shapes shared by the server, the storage
//! backends and the API clients.

mod clock;
mod constants;
mod env_config;
mod error;
mod medication;
mod price_report;
mod pricing;
pub mod reporting;

pub use clock::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use medication::*;
pub use price_report::*;
pub use pricing::*;
