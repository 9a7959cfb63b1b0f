//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs the logger
//! - parses CLI arguments and resolves the dataset configuration
//! - prepares the cache directory
//! - runs the load pipeline and prints or exports the result

use std::fs;

use clap::Parser;

use crate::cli::{CamerasArgs, Cli, Command, ExportArgs, RankBy, SourceArgs, SummaryArgs};
use crate::data::{DatasetConfig, HttpTransport};
use crate::error::AppError;
use crate::report::{
    CameraKey, CrashFilter, camera_top_n, camera_years, format_camera_years, format_crash_summary,
    format_monthly_violations, format_violation_ranking, format_weekday_violations, monthly_violations,
    summarize, violations_by_weekday,
};

pub mod pipeline;

/// Entry point for the `crashes` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let transport = HttpTransport::new()?;

    match cli.command {
        Command::Fetch => handle_fetch(&transport, &cli.source),
        Command::Summary(args) => handle_summary(&transport, &cli.source, &args),
        Command::Export(args) => handle_export(&transport, &cli.source, &args),
        Command::Cameras(args) => handle_cameras(&transport, &cli.source, &args),
    }
}

fn handle_fetch(transport: &HttpTransport, source: &SourceArgs) -> Result<(), AppError> {
    let config = resolve_config(source, DatasetConfig::from_env(DatasetConfig::crashes()))?;
    let outcome = crate::data::ensure_dataset(transport, &config, source.force)?;
    println!("{} ({:?})", outcome.path.display(), outcome.status);
    Ok(())
}

fn handle_summary(transport: &HttpTransport, source: &SourceArgs, args: &SummaryArgs) -> Result<(), AppError> {
    let config = resolve_config(source, DatasetConfig::from_env(DatasetConfig::crashes()))?;
    let loaded = pipeline::load_crashes(transport, &config, source.force)?;

    let filter = CrashFilter {
        year: args.year,
        min_injuries: args.min_injuries,
    };
    let summary = summarize(&loaded.data, &filter);

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::new(2, format!("Failed to serialize summary: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", format_crash_summary(&summary));
    }
    Ok(())
}

fn handle_export(transport: &HttpTransport, source: &SourceArgs, args: &ExportArgs) -> Result<(), AppError> {
    let config = resolve_config(source, DatasetConfig::from_env(DatasetConfig::crashes()))?;
    let loaded = pipeline::load_crashes(transport, &config, source.force)?;
    crate::io::export::write_enriched_csv(&args.out, &loaded.data)?;
    println!("Wrote {} rows to {}", loaded.data.len(), args.out.display());
    Ok(())
}

fn handle_cameras(transport: &HttpTransport, source: &SourceArgs, args: &CamerasArgs) -> Result<(), AppError> {
    let config = resolve_config(source, DatasetConfig::red_light_cameras())?;
    let loaded = pipeline::load_cameras(transport, &config, source.force)?;
    let set = &loaded.data;

    let key = match args.by {
        RankBy::Intersection => CameraKey::Intersection,
        RankBy::Camera => CameraKey::Camera,
    };
    let ranking = camera_top_n(set, key, args.top, args.ascending)?;

    print!("{}", format_camera_years(&camera_years(set)));
    print!("{}", format_violation_ranking(key, args.ascending, &ranking));
    print!("{}", format_monthly_violations(&monthly_violations(set)));
    print!("{}", format_weekday_violations(&violations_by_weekday(set)));
    Ok(())
}

/// Apply CLI overrides and create the cache directory.
fn resolve_config(source: &SourceArgs, defaults: DatasetConfig) -> Result<DatasetConfig, AppError> {
    let mut config = defaults;
    if let Some(url) = &source.url {
        config.url = url.clone();
    }
    if let Some(path) = &source.cache {
        config.cache_path = path.clone();
    }

    if let Some(dir) = config.cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::new(4, format!("Failed to create cache directory '{}': {e}", dir.display()))
        })?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncreatable_cache_directory_is_a_cache_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let source = SourceArgs {
            url: None,
            cache: Some(blocker.join("sub").join("crashes.csv")),
            force: false,
        };
        let err = resolve_config(&source, DatasetConfig::crashes()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("cache directory"));
    }

    #[test]
    fn cli_overrides_replace_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("nested").join("crashes.csv");
        let source = SourceArgs {
            url: Some("https://example.test/c.csv".to_string()),
            cache: Some(cache.clone()),
            force: false,
        };
        let config = resolve_config(&source, DatasetConfig::crashes()).unwrap();
        assert_eq!(config.url, "https://example.test/c.csv");
        assert_eq!(config.cache_path, cache);
        assert!(dir.path().join("nested").is_dir());
    }
}
