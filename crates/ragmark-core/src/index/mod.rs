//! Incremental indexing
//!
//! Walks a folder, chunks each matching file and embeds only chunks the
//! store does not already hold with identical content. One commit per run.

mod scanner;

pub use scanner::scan_files;

use crate::chunker::{anchor, chunk};
use crate::db::{Database, NewEmbedding, OverwritePolicy};
use crate::error::Result;
use crate::llm::Encoder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Indexing run options
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// File extension to index, with or without the leading dot
    pub extension: String,
    /// What to do when a key already holds different content
    pub policy: OverwritePolicy,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            policy: OverwritePolicy::Overwrite,
        }
    }
}

/// A chunk whose embedding could not be produced
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    pub anchor: String,
    pub reason: String,
}

/// Per-file indexing outcome
#[derive(Debug)]
pub struct FileReport {
    pub file: PathBuf,
    pub total_chunks: usize,
    pub unchanged: usize,
    pub embedded: usize,
    pub failures: Vec<ChunkFailure>,
    pub duration: Duration,
}

impl FileReport {
    /// Chunks accounted for without failure
    pub fn succeeded(&self) -> usize {
        self.unchanged + self.embedded
    }
}

/// Whole-run indexing outcome
#[derive(Debug, Default)]
pub struct IndexReport {
    pub files: Vec<FileReport>,
    pub duration: Duration,
}

impl IndexReport {
    pub fn total_chunks(&self) -> usize {
        self.files.iter().map(|f| f.total_chunks).sum()
    }

    pub fn embedded(&self) -> usize {
        self.files.iter().map(|f| f.embedded).sum()
    }

    pub fn unchanged(&self) -> usize {
        self.files.iter().map(|f| f.unchanged).sum()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().map(|f| f.failures.len()).sum()
    }
}

/// Progress callback, invoked after each file completes
pub type ProgressFn = Box<dyn Fn(&FileReport, usize, usize) + Send + Sync>;

/// Index every matching file under `folder`.
///
/// The encoder is probed before any write; an unreachable model aborts the
/// run with zero writes. Individual encode failures are recorded in the
/// report and do not stop the run. Writes become durable with the single
/// commit at the end.
pub async fn index_folder(
    db: &Database,
    encoder: &dyn Encoder,
    folder: &Path,
    options: &IndexOptions,
    progress: Option<ProgressFn>,
) -> Result<IndexReport> {
    let start = Instant::now();

    encoder.probe().await?;

    let folder = std::fs::canonicalize(folder)?;
    let files = scan_files(&folder, &options.extension)?;
    let total_files = files.len();
    tracing::info!(
        folder = %folder.display(),
        files = total_files,
        model = encoder.model_name(),
        "starting index run"
    );

    db.begin()?;
    let mut report = IndexReport::default();

    for (i, file) in files.iter().enumerate() {
        let file_report = match index_file(db, encoder, file, &folder, options).await {
            Ok(r) => r,
            Err(e) => {
                let _ = db.rollback();
                return Err(e);
            }
        };

        if let Some(ref cb) = progress {
            cb(&file_report, i + 1, total_files);
        }
        report.files.push(file_report);
    }

    db.commit()?;
    report.duration = start.elapsed();

    tracing::info!(
        embedded = report.embedded(),
        unchanged = report.unchanged(),
        failed = report.failed(),
        "index run complete"
    );

    Ok(report)
}

async fn index_file(
    db: &Database,
    encoder: &dyn Encoder,
    file: &Path,
    folder: &Path,
    options: &IndexOptions,
) -> Result<FileReport> {
    let start = Instant::now();
    let content = std::fs::read_to_string(file)?;
    let chunks = chunk(&content);

    let file_key = file.to_string_lossy().to_string();
    let folder_key = folder.to_string_lossy().to_string();
    let model = encoder.model_name();

    let mut report = FileReport {
        file: file.to_path_buf(),
        total_chunks: chunks.len(),
        unchanged: 0,
        embedded: 0,
        failures: Vec::new(),
        duration: Duration::ZERO,
    };

    // Repeated headings within one file collide on the same slug; later
    // occurrences are disambiguated by position so every chunk keeps a
    // distinct key.
    let mut seen_anchors: HashMap<String, usize> = HashMap::new();

    for piece in &chunks {
        let base = anchor(piece);
        let occurrence = seen_anchors.entry(base.clone()).or_insert(0);
        *occurrence += 1;
        let slug = if *occurrence == 1 {
            base
        } else {
            format!("{}-{}", base, occurrence)
        };

        if let Some(stored) = db.exists(&slug, &file_key, model)? {
            if stored == *piece {
                report.unchanged += 1;
                continue;
            }
        }

        match encoder.embed(piece).await {
            Ok(embedding) => {
                db.store(
                    NewEmbedding {
                        anchor: &slug,
                        chunk: piece,
                        embedding: &embedding,
                        file: &file_key,
                        folder: &folder_key,
                        model,
                    },
                    options.policy,
                )?;
                report.embedded += 1;
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), anchor = %slug, error = %e, "chunk embed failed");
                report.failures.push(ChunkFailure {
                    anchor: slug,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.duration = start.elapsed();
    Ok(report)
}
