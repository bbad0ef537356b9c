//! Builds the dengue knowledge collection from extracted plain-text files.
//!
//! Usage:
//!   index-knowledge --input manual.txt [--input outro.txt] [--reset]
//!
//! Index location, chunking and embedding model come from the same
//! `DENGUE_ASSISTANT__*` environment as the server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dengue_assistant::adapters::knowledge::FileVectorIndex;
use dengue_assistant::application::{KnowledgeIndexer, SourceDocument};
use dengue_assistant::bootstrap::embedding_provider;
use dengue_assistant::config::AppConfig;
use dengue_assistant::domain::knowledge::TextSplitter;
use dengue_assistant::ports::EmbeddingProvider;

#[derive(Parser, Debug)]
#[command(
    name = "index-knowledge",
    version,
    about = "Split, embed and store text files in the knowledge index"
)]
struct Args {
    /// Plain-text file to index (repeatable)
    #[arg(long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Start from an empty collection instead of appending
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.knowledge.validate()?;

    let mut documents = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let text = tokio::fs::read_to_string(path).await?;
        documents.push(SourceDocument::new(path.display().to_string(), text));
    }

    let embedder = embedding_provider(&config)?;
    let knowledge = &config.knowledge;
    let index = if args.reset {
        FileVectorIndex::create(&knowledge.index_dir, &knowledge.collection)
    } else {
        FileVectorIndex::open_or_create(&knowledge.index_dir, &knowledge.collection).await?
    };
    index.set_model(embedder.model()).await;
    let path = index.path().to_path_buf();

    let splitter = TextSplitter::new(knowledge.chunk_size, knowledge.chunk_overlap)?;
    let indexer = KnowledgeIndexer::new(splitter, embedder, Arc::new(index));
    let report = indexer.index(&documents).await?;

    if report.chunks == 0 {
        println!("No text found in {} input file(s); index left unchanged", report.documents);
    } else {
        println!(
            "Indexed {} chunk(s) from {} file(s); {} now holds {} chunk(s)",
            report.chunks,
            report.documents,
            path.display(),
            report.total_chunks
        );
    }

    Ok(())
}
