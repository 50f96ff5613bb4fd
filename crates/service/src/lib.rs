//! Service layer for medassist
//!
//! Centralizes business logic between the HTTP handlers and storage.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

pub mod error;
mod price_report_service;
mod strategy_service;

pub use error::ServiceError;
pub use price_report_service::PriceReportService;
pub use strategy_service::StrategyService;
