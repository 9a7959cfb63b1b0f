//! Domain types shared by ingest, enrichment and reporting.
//!
//! This module defines:
//!
//! - the injury measures carried by the crash dataset (`InjuryMeasure`)
//! - calendar attributes derived from a timestamp (`CalendarFields`)
//! - enriched record sets (`EnrichedRecordSet`, `CameraDataset`)

pub mod types;

pub use types::*;
