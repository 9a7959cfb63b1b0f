//! `crash-data` library crate.
//!
//! Fetches the Chicago traffic crash dataset into a local cache and loads it as
//! an enriched, read-only table (parsed timestamps, calendar fields,
//! zero-filled injury counts). The `crashes` binary is a thin wrapper around
//! this library so that:
//!
//! - core logic is testable without spawning processes or touching the network
//! - chart and dashboard front-ends can reuse the same loaded table

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
