//! `textreuse init` command - write a default configuration file

use serde_json::json;

use crate::cli::{InitArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::format::print_json_status;
use textreuse_core::bail_usage;
use textreuse_core::config::ReuseConfig;
use textreuse_core::error::Result;

/// Execute the init command
pub fn execute(ctx: &CommandContext, args: &InitArgs) -> Result<()> {
    let path = ctx.config_path();
    if path.exists() && !args.force {
        bail_usage!(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    ReuseConfig::default().save(&path)?;

    match ctx.cli.format {
        OutputFormat::Json => print_json_status(
            "ok",
            Some("Configuration written"),
            &[("config", json!(path.display().to_string()))],
        )?,
        OutputFormat::Human => {
            if !ctx.cli.quiet {
                println!("Wrote default configuration to {}", path.display());
            }
        }
    }
    Ok(())
}
