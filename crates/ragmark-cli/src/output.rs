//! Terminal output formatting

use ragmark_core::{FileReport, IndexReport, RankedChunk};
use std::path::Path;

/// Print one line per indexed file: position, path, outcome counts
pub fn print_file_progress(report: &FileReport, i: usize, total: usize) {
    let mark = if report.failures.is_empty() {
        "ok".to_string()
    } else {
        format!("{}/{}", report.succeeded(), report.total_chunks)
    };

    println!(
        " {:3}/{} {} [{}] {:.2}s",
        i,
        total,
        display_path(&report.file),
        mark,
        report.duration.as_secs_f64()
    );

    for failure in &report.failures {
        eprintln!("      failed #{}: {}", failure.anchor, failure.reason);
    }
}

/// Print the run summary line
pub fn print_run_summary(report: &IndexReport) {
    println!(
        "Indexing complete: {} embedded, {} unchanged, {} failed in {:.2}s",
        report.embedded(),
        report.unchanged(),
        report.failed(),
        report.duration.as_secs_f64()
    );
}

/// Print ranked references below an answer: file#anchor and score
pub fn print_references(ranked: &[RankedChunk]) {
    println!("\nReferences:");
    for (i, chunk) in ranked.iter().enumerate() {
        println!(
            "{}. {}#{} · {:.4}",
            i + 1,
            display_path(Path::new(&chunk.file)),
            chunk.anchor,
            chunk.similarity
        );
    }
    println!();
}

/// Render a path relative to the working directory when it is inside it,
/// absolute otherwise.
fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}
