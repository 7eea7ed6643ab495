use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};

/// Get a Command for textreuse
pub fn textreuse() -> Command {
    cargo_bin_cmd!("textreuse")
}

/// Parse a command's stdout as JSON
#[allow(dead_code)]
pub fn stdout_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout should be JSON")
}

/// Write a small dated corpus under `root/texts` plus `root/meta.tsv`.
///
/// `early.txt` (1750) and `late.txt` (1850) share their first paragraph;
/// `other.txt` (1800) shares nothing with either.
pub fn write_corpus(root: &Path) -> (PathBuf, PathBuf) {
    let texts = root.join("texts");
    fs::create_dir_all(&texts).unwrap();
    fs::write(
        texts.join("early.txt"),
        "It was the best of times, it was the worst of times.\n\n\
         Quoth the raven, nevermore, over the quiet chamber door.",
    )
    .unwrap();
    fs::write(
        texts.join("late.txt"),
        "It was the best of times, it was the worst of times.\n\n\
         Zebras graze quickly beyond jagged volcanic hills.",
    )
    .unwrap();
    fs::write(
        texts.join("other.txt"),
        "Call me Ishmael. Some years ago, never mind how long precisely.",
    )
    .unwrap();

    let metadata = root.join("meta.tsv");
    fs::write(
        &metadata,
        "early.txt\tEarly Work\t1750\t0\tAnon\n\
         late.txt\tLate Work\t1850\t1\tAnon\n\
         other.txt\tOther Work\t1800\t2\n",
    )
    .unwrap();
    (texts, metadata)
}
