//! `hostwatch-core` -- pure domain logic for the host monitor.
//!
//! Nothing in this crate performs network or filesystem I/O. The agent
//! crate measures samples and delivers alerts; this crate decides what a
//! sample means.

pub mod alert;
pub mod config;
pub mod error;
pub mod metric_names;
pub mod sample;
pub mod thresholds;
