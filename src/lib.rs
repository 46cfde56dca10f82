#![forbid(unsafe_code)]

//! `remindd`: reminder scheduling and alert-detection engine.
//!
//! The core is a concurrency-safe [`store::ReminderStore`] of timed
//! reminders with write-through JSON snapshot persistence, a pure
//! [`detector`] that decides when an alert is newly due, and one
//! background [`monitor`] task per active reminder. A thin axum
//! [`http`] adapter exposes the engine as a JSON API.

pub mod config;
pub mod detector;
pub mod errors;
pub mod http;
pub mod models;
pub mod monitor;
pub mod store;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
