//! Command execution for the Loupe CLI.

use std::sync::Arc;

use anyhow::Context;

use crate::cli::args::{BuildArgs, Command, LoupeArgs, OutputFormat, SearchArgs};
use crate::document::DirectorySource;
use crate::embedding::{EmbeddingCache, HttpEmbeddingProvider};
use crate::query::QueryExpander;
use crate::scoring::HttpPairwiseScorer;
use crate::search::{IndexBuilder, IndexHandle, RetrievalPipeline, SearchOptions, SearchResult};
use crate::vector::VectorIndex;

/// Execute the parsed command.
pub fn execute_command(args: LoupeArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    match args.command.clone() {
        Command::Build(build) => runtime.block_on(execute_build(build)),
        Command::Search(search) => runtime.block_on(execute_search(search, args.output_format)),
    }
}

async fn execute_build(args: BuildArgs) -> anyhow::Result<()> {
    let source = Arc::new(DirectorySource::new(&args.docs_dir));
    let provider = Arc::new(HttpEmbeddingProvider::new(
        &args.model.embed_endpoint,
        &args.model.embed_model,
        args.model.embed_dimension,
    ));
    let cache = Arc::new(
        EmbeddingCache::open(&args.cache_path)
            .with_context(|| format!("opening embedding cache {:?}", args.cache_path))?,
    );

    let builder = IndexBuilder::new(source, provider, cache);
    let (_, stats) = builder
        .build_and_save(&args.index_path)
        .await
        .context("index build failed")?;

    println!(
        "Indexed {} documents (dimension {}): {} embeddings from cache, {} computed",
        stats.documents, stats.dimension, stats.cache_hits, stats.cache_misses
    );
    Ok(())
}

async fn execute_search(args: SearchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let index = VectorIndex::load(&args.index_path)
        .with_context(|| format!("loading index {:?}", args.index_path))?;

    let source = Arc::new(DirectorySource::new(&args.docs_dir));
    let provider = Arc::new(HttpEmbeddingProvider::new(
        &args.model.embed_endpoint,
        &args.model.embed_model,
        args.model.embed_dimension,
    ));
    let scorer = Arc::new(HttpPairwiseScorer::new(
        &args.rerank_endpoint,
        &args.rerank_model,
    ));
    let expander = args
        .synonyms
        .as_ref()
        .map(|path| QueryExpander::from_file_or_passthrough(&path.to_string_lossy()));

    let pipeline = RetrievalPipeline::new(
        source,
        provider,
        scorer,
        expander,
        Arc::new(IndexHandle::with_index(index)),
    );

    let options = SearchOptions {
        top_k: args.top_k,
        use_expansion: !args.no_expansion,
        rerank_multiplier: args.rerank_multiplier,
    };
    let results = pipeline.search(&args.query, &options).await?;

    print_results(&results, format)?;
    Ok(())
}

fn print_results(results: &[SearchResult], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Human => {
            if results.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (rank, result) in results.iter().enumerate() {
                println!("{}. {} (score {:.4})", rank + 1, result.doc_id, result.score);
                if !result.preview.is_empty() {
                    println!("   {}", result.preview);
                }
                let keywords: Vec<&str> = result
                    .explanation
                    .overlapping_keywords
                    .iter()
                    .map(String::as_str)
                    .collect();
                println!(
                    "   overlap {:.0}% [{}]",
                    result.explanation.overlap_ratio * 100.0,
                    keywords.join(", ")
                );
            }
        }
    }
    Ok(())
}
