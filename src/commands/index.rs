//! `textreuse index` command - build the neighbor index and save it
//!
//! Later `detect` or `neighbors` runs over the same inputs can pass
//! `--index-mode load` to skip vectorization and tree building.

use serde_json::json;

use crate::cli::{IndexArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::format::print_json_status;
use textreuse_core::error::Result;
use textreuse_core::index::persist;
use textreuse_core::pipeline::{Pipeline, STAGE_INDEX};

/// Execute the index command
pub fn execute(ctx: &CommandContext, args: &IndexArgs) -> Result<()> {
    let config = ctx.load_config(&args.tuning)?;
    let corpus = ctx.load_corpus(&args.corpus)?;
    let pipeline = Pipeline::new(config)?;

    let (index, labels) = pipeline.build_index(&corpus)?;
    let dir = &pipeline.config().index.dir;
    persist::save(dir, &index, &labels).map_err(|e| e.in_stage(STAGE_INDEX))?;

    match ctx.cli.format {
        OutputFormat::Json => print_json_status(
            "ok",
            Some("Index saved"),
            &[
                ("dir", json!(dir.display().to_string())),
                ("documents", json!(corpus.len())),
                ("segments", json!(labels.len())),
                ("trees", json!(index.n_trees())),
            ],
        )?,
        OutputFormat::Human => {
            if !ctx.cli.quiet {
                println!(
                    "Indexed {} segments from {} documents ({} trees) into {}",
                    labels.len(),
                    corpus.len(),
                    index.n_trees(),
                    dir.display()
                );
            }
        }
    }
    Ok(())
}
