//! Index command

use crate::app::IndexArgs;
use crate::output;
use anyhow::Result;
use ragmark_core::{
    index_folder, Config, Database, IndexOptions, OllamaClient, OverwritePolicy,
};
use std::path::Path;

pub async fn run(args: IndexArgs, db_path: &Path, config: &Config) -> Result<()> {
    let model = args.model.unwrap_or_else(|| config.encoder_model.clone());
    let encoder = OllamaClient::new(&config.ollama_url, &model, config.timeout_secs)?;

    let db = Database::open(db_path)?;
    db.initialize()?;

    let options = IndexOptions {
        extension: args.extension,
        policy: if args.versioned {
            OverwritePolicy::AppendVersioned
        } else {
            OverwritePolicy::Overwrite
        },
    };

    println!(
        "Indexing {} files in {} with {}",
        options.extension,
        args.folder.display(),
        model
    );

    let progress = Box::new(|report: &ragmark_core::FileReport, i: usize, total: usize| {
        output::print_file_progress(report, i, total);
    });

    let report = index_folder(&db, &encoder, &args.folder, &options, Some(progress)).await?;

    output::print_run_summary(&report);
    Ok(())
}
