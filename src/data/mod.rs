//! Dataset configuration and acquisition.

pub mod config;
pub mod fetch;

pub use config::*;
pub use fetch::*;
