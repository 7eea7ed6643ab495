//! Shared output formatting helpers for commands

pub mod status;

pub use status::{format_influence_line, print_json_status};
