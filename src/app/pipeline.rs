//! Shared "load" logic used by every command.
//!
//! fetch (cache-aware) -> ingest -> enrich
//!
//! Commands then work on the returned in-memory table only.

use crate::data::{DatasetConfig, FetchOutcome, Transport, ensure_dataset};
use crate::domain::{CameraDataset, EnrichedRecordSet};
use crate::error::PipelineError;
use crate::io::{load_camera_violations, load_enriched};

/// A loaded dataset plus how its local copy was obtained.
#[derive(Debug)]
pub struct Loaded<T> {
    pub fetch: FetchOutcome,
    pub data: T,
}

/// Ensure the crash CSV is cached, then load and enrich it.
pub fn load_crashes(
    transport: &dyn Transport,
    config: &DatasetConfig,
    force: bool,
) -> Result<Loaded<EnrichedRecordSet>, PipelineError> {
    let fetch = ensure_dataset(transport, config, force)?;
    let data = load_enriched(&fetch.path)?;
    Ok(Loaded { fetch, data })
}

/// Ensure the red-light camera CSV is cached, then load and enrich it.
pub fn load_cameras(
    transport: &dyn Transport,
    config: &DatasetConfig,
    force: bool,
) -> Result<Loaded<CameraDataset>, PipelineError> {
    let fetch = ensure_dataset(transport, config, force)?;
    let data = load_camera_violations(&fetch.path)?;
    Ok(Loaded { fetch, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CacheStatus;
    use crate::data::fetch::tests::FakeTransport;
    use crate::io::enrich::tests::three_rows;
    use crate::report::year_counts;

    #[test]
    fn load_fetches_once_then_reads_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig::new("https://example.test/crashes.csv", dir.path().join("crashes.csv"));
        let transport = FakeTransport::new(vec![Ok(three_rows().into_bytes())]);

        let first = load_crashes(&transport, &config, false).unwrap();
        let second = load_crashes(&transport, &config, false).unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first.fetch.status, CacheStatus::Downloaded);
        assert_eq!(second.fetch.status, CacheStatus::Cached);
        assert_eq!(first.data, second.data);

        let all: Vec<_> = second.data.records().iter().collect();
        let counts: Vec<(i32, usize)> = year_counts(&all).into_iter().collect();
        assert_eq!(counts, vec![(2023, 2), (2024, 1)]);
    }

    #[test]
    fn bad_download_is_cached_but_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig::new("https://example.test/crashes.csv", dir.path().join("crashes.csv"));
        let transport = FakeTransport::new(vec![Ok(b"<html>maintenance</html>\n".to_vec())]);

        let err = load_crashes(&transport, &config, false).unwrap_err();

        assert!(matches!(err, PipelineError::Schema { .. }));
        assert!(config.cache_path.exists());
    }
}
