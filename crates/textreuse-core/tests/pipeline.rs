//! End-to-end runs of the detection pipeline on small corpora

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use textreuse_core::config::ReuseConfig;
use textreuse_core::corpus::{Corpus, Metadata};
use textreuse_core::influence::Bucket;
use textreuse_core::pipeline::Pipeline;
use textreuse_core::vectorize::{Alphabet, Vectorizer};

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn config(knn: usize) -> ReuseConfig {
    let mut config = ReuseConfig::default();
    config.index.trees = 5;
    config.index.leaf_size = 8;
    config.query.knn = knn;
    config.query.search_k = Some(200);
    config.runtime.max_workers = 2;
    config
}

#[test]
fn test_identical_documents_fully_influence_each_other() {
    let dir = tempdir().unwrap();
    let text = "It was the best of times, it was the worst of times.";
    let paths = vec![
        write(dir.path(), "early.txt", text),
        write(dir.path(), "late.txt", text),
    ];
    let metadata = Metadata::parse("early.txt\tEarly\t1850\t0\nlate.txt\tLate\t1900\t1\n");
    let corpus = Corpus::from_paths(&paths, &metadata).unwrap();

    let vectorizer = Vectorizer::new(Alphabet::default());
    assert_eq!(vectorizer.vectorize(text), vectorizer.vectorize(text));

    let output = Pipeline::new(config(1)).unwrap().run(&corpus).unwrap();

    assert_eq!(output.neighbors.get(0), Some(&[1][..]));
    assert_eq!(output.neighbors.get(1), Some(&[0][..]));

    let early = output.scored.records_for(0);
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].rounded_similarity(), 1.0);

    let early = output.influence[0].rounded();
    assert_eq!(early.all, 1.0);
    assert_eq!(early.later, 1.0);
    assert_eq!(early.earlier, 0.0);

    let late = output.influence[1].rounded();
    assert_eq!(late.all, 1.0);
    assert_eq!(late.earlier, 1.0);
    assert_eq!(late.later, 0.0);
}

#[test]
fn test_partial_reuse_is_averaged_over_all_segments() {
    let dir = tempdir().unwrap();
    let paths = vec![
        write(dir.path(), "source.txt", "qqqq\n\nabcde\n\nwwww"),
        write(dir.path(), "target.txt", "abxde"),
    ];
    let metadata = Metadata::parse("source.txt\tSource\t1800\t0\ntarget.txt\tTarget\t1750\t1\n");
    let corpus = Corpus::from_paths(&paths, &metadata).unwrap();

    let output = Pipeline::new(config(4)).unwrap().run(&corpus).unwrap();

    let records = output.scored.records_for(0);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source.segment, 1);
    assert!((records[0].similarity - 0.8).abs() < 1e-12);

    let source = output.influence[0].rounded();
    assert_eq!(source.all, 0.267);
    assert_eq!(source.earlier, 0.267);
    assert_eq!(source.later, 0.0);
    assert_eq!(source.title.as_deref(), Some("Source"));

    let target = output.influence[1].rounded();
    assert_eq!(target.all, 0.8);
    assert_eq!(target.later, 0.8);
}

#[test]
fn test_output_invariants_on_mixed_corpus() {
    let dir = tempdir().unwrap();
    let passages = [
        "In the beginning was the word, and the word was with the reader.",
        "All happy families are alike; each unhappy family is unhappy in its own way.",
        "Call me Ishmael. Some years ago, never mind how long precisely.",
        "It is a truth universally acknowledged that a single man must want a wife.",
    ];
    let mut paths = Vec::new();
    let mut tsv = String::new();
    for i in 0..6 {
        // Each document borrows two passages and adds one of its own
        let text = format!(
            "{}\n\n{}\n\nDocument {} has its own closing remarks about chapter {}.",
            passages[i % 4],
            passages[(i + 1) % 4],
            i,
            i * 7
        );
        let name = format!("doc{i}.txt");
        paths.push(write(dir.path(), &name, &text));
        tsv.push_str(&format!("{name}\tDoc {i}\t{}\t{i}\n", 1800 + (i as i32 % 3) * 10));
    }
    let corpus = Corpus::from_paths(&paths, &Metadata::parse(&tsv)).unwrap();

    let mut cfg = config(5);
    cfg.scoring.min_similarity = 0.6;
    let output = Pipeline::new(cfg).unwrap().run(&corpus).unwrap();

    assert_eq!(output.labels.len(), 18);
    assert_eq!(output.neighbors.len(), 18);
    assert_eq!(output.scored.skipped, 0);
    assert!(output.scored.total_records() > 0);

    for (doc, records) in output.scored.iter() {
        for r in records {
            assert_eq!(r.source.doc_id, doc);
            assert_ne!(r.source.doc_id, r.target.doc_id);
            assert!(r.similarity >= 0.6);
        }
    }

    assert_eq!(output.influence.len(), 6);
    for summary in &output.influence {
        for bucket in [Bucket::All, Bucket::Earlier, Bucket::Later] {
            assert!((0.0..=1.0).contains(&summary.get(bucket)));
        }
        assert!(summary.all >= summary.earlier);
        assert!(summary.all >= summary.later);
    }
}

#[test]
fn test_runs_are_independent_of_worker_count() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| {
            write(
                dir.path(),
                &format!("d{i}.txt"),
                &format!("shared opening line\n\nunique text number {i}\n\nshared closing line"),
            )
        })
        .collect();
    let corpus = Corpus::from_paths(&paths, &Metadata::new()).unwrap();

    let mut single = config(3);
    single.runtime.max_workers = 1;
    let mut many = config(3);
    many.runtime.max_workers = 4;

    let a = Pipeline::new(single).unwrap().run(&corpus).unwrap();
    let b = Pipeline::new(many).unwrap().run(&corpus).unwrap();
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.neighbors, b.neighbors);
    assert_eq!(a.scored, b.scored);
    assert_eq!(a.influence, b.influence);
}
