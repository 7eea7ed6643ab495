//! Command trait and context for dispatching commands

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::{Cli, CorpusArgs, TuningArgs};
use textreuse_core::config::{ReuseConfig, CONFIG_FILE};
use textreuse_core::corpus::{self, Corpus, Metadata};
use textreuse_core::error::Result;
use textreuse_core::pipeline::STAGE_CORPUS;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Self {
        Self { cli, start }
    }

    /// Configuration file this run reads and `init` writes
    pub fn config_path(&self) -> PathBuf {
        self.cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load the configuration and overlay command-line overrides.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    pub fn load_config(&self, tuning: &TuningArgs) -> Result<ReuseConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ReuseConfig::load(path)?,
            None => ReuseConfig::load_or_default(Path::new(CONFIG_FILE))?,
        };
        tuning.apply(&mut config);
        config.validate()?;
        tracing::debug!(elapsed = ?self.start.elapsed(), "load_config");
        Ok(config)
    }

    /// Resolve inputs and metadata into a corpus.
    pub fn load_corpus(&self, args: &CorpusArgs) -> Result<Corpus> {
        let load = || -> Result<Corpus> {
            let paths = corpus::discover(&args.inputs)?;
            let metadata = match &args.metadata {
                Some(path) => Metadata::load(path)?,
                None => Metadata::new(),
            };
            Corpus::from_paths(&paths, &metadata)
        };
        let corpus = load().map_err(|e| e.in_stage(STAGE_CORPUS))?;
        tracing::debug!(
            elapsed = ?self.start.elapsed(),
            documents = corpus.len(),
            "load_corpus"
        );
        Ok(corpus)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("textreuse {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Detect text reuse and influence across a corpus.");
        println!();
        println!("Run `textreuse --help` for usage information.");
        Ok(())
    }
}
