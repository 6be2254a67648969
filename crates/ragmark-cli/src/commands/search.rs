//! Interactive search command

use crate::app::SearchArgs;
use crate::output;
use anyhow::Result;
use ragmark_core::{
    synthesize, Config, Database, Generator, OllamaClient, SearchOptions, SearchSession,
};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub async fn run(args: SearchArgs, db_path: &Path, config: &Config) -> Result<()> {
    let encoder_model = args
        .model_encoder
        .unwrap_or_else(|| config.encoder_model.clone());
    let searcher_model = args
        .model_searcher
        .unwrap_or_else(|| config.searcher_model.clone());

    let encoder = OllamaClient::new(&config.ollama_url, &encoder_model, config.timeout_secs)?;

    let generator = if args.no_answer {
        None
    } else {
        let client = OllamaClient::new(&config.ollama_url, &searcher_model, config.timeout_secs)?;
        Generator::probe(&client).await?;
        Some(client)
    };

    let db = Database::open(db_path)?;
    db.initialize()?;

    let folder = match args.folder {
        Some(f) => Some(
            std::fs::canonicalize(&f)?
                .to_string_lossy()
                .to_string(),
        ),
        None => None,
    };

    let options = SearchOptions {
        threshold: args.threshold.unwrap_or(config.similarity_threshold),
        limit: args.limit.unwrap_or(config.top_k),
        folder,
    };

    let session = SearchSession::open(&db, &encoder, options).await?;
    println!(
        "Loaded {} chunks for {}. Enter q to quit.",
        session.snapshot_len(),
        encoder_model
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        if query == "q" {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let ranked = session.query(query).await?;
        if ranked.is_empty() {
            println!("  No results found.\n");
            continue;
        }

        if let Some(ref generator) = generator {
            stream_answer(generator, query, &ranked).await?;
        }

        output::print_references(&ranked);
    }

    Ok(())
}

/// Print answer tokens as they arrive, without buffering the stream
async fn stream_answer(
    generator: &dyn Generator,
    query: &str,
    ranked: &[ragmark_core::RankedChunk],
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<String>(32);

    let printer = tokio::spawn(async move {
        while let Some(token) = rx.recv().await {
            print!("{token}");
            let _ = std::io::stdout().flush();
        }
        println!();
    });

    let result = synthesize(generator, query, ranked, tx).await;
    let _ = printer.await;
    result?;

    Ok(())
}
