use textreuse_core::config::IndexMode;
use textreuse_core::index::Metric;

/// Parse index mode from string
pub fn parse_index_mode(s: &str) -> std::result::Result<IndexMode, String> {
    s.parse::<IndexMode>().map_err(|e| e.to_string())
}

/// Parse distance metric from string
pub fn parse_metric(s: &str) -> std::result::Result<Metric, String> {
    s.parse::<Metric>().map_err(|e| e.to_string())
}

/// Parse a similarity threshold in [0, 1]
pub fn parse_similarity(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("invalid similarity: {s}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("similarity must be between 0 and 1, got {value}"))
    }
}
