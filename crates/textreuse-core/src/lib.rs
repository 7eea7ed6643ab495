//! Textreuse Core Library
//!
//! Text reuse detection: segment documents, hash segments to character
//! trigram vectors, find candidate neighbors with a random projection
//! forest, rescore candidates exactly, and summarize influence per document.

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod influence;
pub mod label;
pub mod logging;
pub mod matcher;
pub mod neighbors;
pub mod pipeline;
pub mod pool;
pub mod score;
pub mod segment;
pub mod vectorize;
