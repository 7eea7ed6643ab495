//! Status message formatting helpers

use serde_json::json;
use textreuse_core::error::Result;
use textreuse_core::influence::InfluenceSummary;

/// Print a JSON status message with optional fields
///
/// # Examples
/// ```ignore
/// print_json_status("ok", Some("Index saved"), &[("items", json!(120))])?;
/// ```
pub fn print_json_status(
    status: &str,
    message: Option<&str>,
    extra_fields: &[(&str, serde_json::Value)],
) -> Result<()> {
    let mut output = json!({ "status": status });

    if let Some(obj) = output.as_object_mut() {
        if let Some(msg) = message {
            obj.insert("message".to_string(), json!(msg));
        }
        for (key, value) in extra_fields {
            obj.insert(key.to_string(), value.clone());
        }
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// One human-readable influence row, values rounded to three decimals
pub fn format_influence_line(summary: &InfluenceSummary, name: &str) -> String {
    let rounded = summary.rounded();
    let year = rounded
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".to_string());
    format!(
        "{:>4}  {}  all={:.3} earlier={:.3} later={:.3}  {}",
        rounded.doc_id, year, rounded.all, rounded.earlier, rounded.later, name
    )
}
