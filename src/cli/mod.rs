//! CLI argument parsing for textreuse
//!
//! Global flags: --config, --format, --quiet, --verbose, --log-level, --log-json

pub mod args;
pub mod output;
pub mod parse;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{CorpusArgs, DetectArgs, IndexArgs, InitArgs, NeighborsArgs, TuningArgs};
pub use output::OutputFormat;

/// Textreuse - detect text reuse and influence across a corpus
#[derive(Parser, Debug)]
#[command(name = "textreuse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./textreuse.toml when present)
    #[arg(long, global = true, env = "TEXTREUSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log phase timings and progress to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directives (e.g. `info`, `textreuse_core=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level textreuse commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Run the full pipeline and export alignments and influence
    Detect(DetectArgs),

    /// Print each segment's nearest segments for inspection
    Neighbors(NeighborsArgs),

    /// Build the neighbor index and save it for later runs
    Index(IndexArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use textreuse_core::config::IndexMode;
    use textreuse_core::index::Metric;

    #[test]
    fn test_parse_cli_help() {
        let result = Cli::try_parse_from(["textreuse", "--help"]);
        assert!(result.is_err()); // --help exits
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["textreuse", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init(_))));
    }

    #[test]
    fn test_parse_detect_with_overrides() {
        let cli = Cli::try_parse_from([
            "textreuse",
            "detect",
            "texts/",
            "--metadata",
            "meta.tsv",
            "--out",
            "public",
            "--trees",
            "20",
            "--knn",
            "5",
            "--min-similarity",
            "0.65",
            "--index-mode",
            "save",
            "--metric",
            "euclidean",
        ])
        .unwrap();
        let Some(Commands::Detect(args)) = cli.command else {
            panic!("Expected Detect command");
        };
        assert_eq!(args.corpus.inputs, vec![PathBuf::from("texts/")]);
        assert_eq!(args.corpus.metadata, Some(PathBuf::from("meta.tsv")));
        assert_eq!(args.out, PathBuf::from("public"));
        assert_eq!(args.tuning.trees, Some(20));
        assert_eq!(args.tuning.knn, Some(5));
        assert_eq!(args.tuning.min_similarity, Some(0.65));
        assert_eq!(args.tuning.index_mode, Some(IndexMode::Save));
        assert_eq!(args.tuning.metric, Some(Metric::Euclidean));
    }

    #[test]
    fn test_rejects_out_of_range_similarity() {
        let result = Cli::try_parse_from([
            "textreuse",
            "detect",
            "a.txt",
            "--min-similarity",
            "1.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_detect_requires_inputs() {
        assert!(Cli::try_parse_from(["textreuse", "detect"]).is_err());
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["textreuse", "index", "a.txt", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
