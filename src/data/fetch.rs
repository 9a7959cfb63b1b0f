//! Fetch-and-cache for remote CSV datasets.
//!
//! `ensure_local` guarantees a local copy exists at the cache path, downloading
//! it only when absent (or when a refresh is forced). A download is staged in a
//! temp file next to the cache path and renamed into place, so a reader never
//! observes a partial file and a failed download leaves nothing behind.
//!
//! There is no locking: two callers racing on the same empty cache path may
//! both download. Serialize per path if that matters.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};
use reqwest::blocking::Client;
use tempfile::NamedTempFile;

use crate::data::DatasetConfig;
use crate::error::{CacheEvictionError, PipelineError};

/// Issues a single GET and returns the full response body.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>, PipelineError>;
}

/// Blocking HTTP(S) transport. No timeout and no retries.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, PipelineError> {
        // The blocking client otherwise applies a 30s total timeout.
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| fetch_error("", format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(url, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(fetch_error(url, format!("status {}", resp.status())));
        }

        let body = resp
            .bytes()
            .map_err(|e| fetch_error(url, format!("failed to read response body: {e}")))?;
        Ok(body.to_vec())
    }
}

/// How the local copy came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fetched from the network during this call.
    Downloaded,
    /// An existing file was accepted as-is; no network access.
    Cached,
}

/// Result of [`ensure_local`].
#[derive(Debug)]
pub struct FetchOutcome {
    pub path: PathBuf,
    pub status: CacheStatus,
    /// Set when a forced refresh could not remove the stale file. The stale
    /// file is kept and `status` is `Cached`.
    pub eviction_error: Option<CacheEvictionError>,
}

impl FetchOutcome {
    /// The local path, treating a failed eviction as fatal.
    pub fn strict(self) -> Result<PathBuf, PipelineError> {
        match self.eviction_error {
            Some(err) => Err(err.into()),
            None => Ok(self.path),
        }
    }
}

/// Make sure a copy of `url` exists at `cache_path`.
///
/// With `force`, an existing file is deleted first. If that deletion fails the
/// old file stays and no download happens. When the file is absent exactly one
/// request is made; on failure no file is left at `cache_path`.
pub fn ensure_local(
    transport: &dyn Transport,
    url: &str,
    cache_path: &Path,
    force: bool,
) -> Result<FetchOutcome, PipelineError> {
    let mut eviction_error = None;

    if force && cache_path.exists() {
        match fs::remove_file(cache_path) {
            Ok(()) => info!("evicted cached file {}", cache_path.display()),
            Err(source) => {
                let err = CacheEvictionError {
                    path: cache_path.to_path_buf(),
                    source,
                };
                warn!("{err}; keeping the existing file");
                eviction_error = Some(err);
            }
        }
    }

    if cache_path.exists() {
        info!("using cached {}", cache_path.display());
        return Ok(FetchOutcome {
            path: cache_path.to_path_buf(),
            status: CacheStatus::Cached,
            eviction_error,
        });
    }

    if url.trim().is_empty() {
        return Err(fetch_error(url, "empty URL".to_string()));
    }

    let body = transport.get(url)?;
    write_atomically(cache_path, &body)?;
    info!("saved {} bytes from {url} to {}", body.len(), cache_path.display());

    Ok(FetchOutcome {
        path: cache_path.to_path_buf(),
        status: CacheStatus::Downloaded,
        eviction_error,
    })
}

/// [`ensure_local`] for a configured dataset.
pub fn ensure_dataset(
    transport: &dyn Transport,
    config: &DatasetConfig,
    force: bool,
) -> Result<FetchOutcome, PipelineError> {
    ensure_local(transport, &config.url, &config.cache_path, force)
}

fn write_atomically(path: &Path, body: &[u8]) -> Result<(), PipelineError> {
    let cache_write = |source: std::io::Error| PipelineError::CacheWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(cache_write)?;
    tmp.write_all(body).map_err(cache_write)?;
    tmp.as_file().sync_all().map_err(cache_write)?;
    tmp.persist(path).map_err(|e| cache_write(e.error))?;
    Ok(())
}

fn fetch_error(url: &str, reason: String) -> PipelineError {
    PipelineError::Fetch {
        url: url.to_string(),
        reason,
    }
}
