//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - crash table enrichment (`enrich`)
//! - red-light camera table enrichment (`cameras`)
//! - enriched CSV export (`export`)

pub mod cameras;
pub mod enrich;
pub mod export;
pub mod ingest;

pub use cameras::*;
pub use enrich::*;
pub use export::*;
pub use ingest::*;
