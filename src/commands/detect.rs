//! `textreuse detect` command - full pipeline plus artifact export

use serde_json::json;

use crate::cli::{DetectArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::export::write_artifacts;
use crate::commands::format::{format_influence_line, print_json_status};
use textreuse_core::error::Result;
use textreuse_core::pipeline::Pipeline;

/// Execute the detect command
pub fn execute(ctx: &CommandContext, args: &DetectArgs) -> Result<()> {
    let config = ctx.load_config(&args.tuning)?;
    let corpus = ctx.load_corpus(&args.corpus)?;
    let pipeline = Pipeline::new(config)?;

    let output = pipeline.run(&corpus)?;
    let exported =
        write_artifacts(&args.out, &corpus, &output).map_err(|e| e.in_stage("export"))?;

    match ctx.cli.format {
        OutputFormat::Json => {
            let influence: Vec<_> = output.influence.iter().map(|s| s.rounded()).collect();
            print_json_status(
                "ok",
                None,
                &[
                    ("out", json!(exported.dir.display().to_string())),
                    ("documents", json!(corpus.len())),
                    ("segments", json!(output.labels.len())),
                    ("records", json!(exported.records)),
                    ("skipped", json!(output.scored.skipped)),
                    ("influence", json!(influence)),
                ],
            )?;
        }
        OutputFormat::Human => {
            if !ctx.cli.quiet {
                println!(
                    "Found {} matches among {} segments in {} documents",
                    exported.records,
                    output.labels.len(),
                    corpus.len()
                );
                if output.scored.skipped > 0 {
                    println!(
                        "{} segments could not be scored (see log)",
                        output.scored.skipped
                    );
                }
                println!();
                for (doc, summary) in corpus.documents().iter().zip(&output.influence) {
                    println!("{}", format_influence_line(summary, doc.display_name()));
                }
                println!();
                println!("Wrote artifacts to {}", exported.dir.display());
            }
        }
    }
    Ok(())
}
