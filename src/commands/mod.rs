//! CLI commands for textreuse

pub mod detect;
pub mod dispatch;
pub mod export;
pub mod format;
pub mod index;
pub mod init;
pub mod neighbors;
