//! Command-line parsing for the `crashes` binary.
//!
//! Parsing stays here; the library modules never see clap types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "crashes", version, about = "Chicago traffic crash data: fetch, cache, enrich, summarize")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Make sure the crash dataset is cached locally.
    Fetch,
    /// Print year/weekday/month breakdowns and injury statistics.
    Summary(SummaryArgs),
    /// Write the enriched crash table to CSV.
    Export(ExportArgs),
    /// Summarize the red-light camera violations dataset.
    Cameras(CamerasArgs),
}

/// Where the dataset comes from. Overrides `CRASH_DATA_URL` / `CRASH_DATA_CACHE`.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Dataset URL.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Local cache file.
    #[arg(long, global = true, value_name = "CSV")]
    pub cache: Option<PathBuf>,

    /// Delete the cached file and download again.
    #[arg(long, global = true)]
    pub force: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    /// Only include crashes from this year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Only include crashes with at least this many total injuries.
    #[arg(long)]
    pub min_injuries: Option<f64>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct CamerasArgs {
    /// How many groups to rank.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Rank by intersection or by camera id.
    #[arg(long, value_enum, default_value_t = RankBy::Intersection)]
    pub by: RankBy,

    /// Rank the fewest violations first.
    #[arg(long)]
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankBy {
    Intersection,
    Camera,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["crashes", "summary", "--year", "2024", "--force", "--cache", "/tmp/c.csv"]);
        assert!(cli.source.force);
        assert_eq!(cli.source.cache, Some(PathBuf::from("/tmp/c.csv")));
        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.year, Some(2024));
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cameras_ranking_options() {
        let cli = Cli::parse_from(["crashes", "cameras"]);
        match cli.command {
            Command::Cameras(args) => {
                assert_eq!(args.top, 10);
                assert_eq!(args.by, RankBy::Intersection);
                assert!(!args.ascending);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::parse_from(["crashes", "cameras", "--by", "camera", "--top", "3", "--ascending"]);
        match cli.command {
            Command::Cameras(args) => {
                assert_eq!((args.top, args.by, args.ascending), (3, RankBy::Camera, true));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
