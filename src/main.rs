use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docshard::{
    load_documents, ChunkConfig, Chunker, HttpEmbedder, Strategy, VectorStore, WordTokenizer,
    DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, DEFAULT_SEMANTIC_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "docshard")]
#[command(version)]
#[command(about = "Chunk plain-text documents and store them for vector retrieval")]
struct Cli {
    /// Embedding server endpoint
    #[arg(long, default_value = "http://localhost:8000", global = true)]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a directory of .txt files, embed them, and build the store
    Build {
        /// Directory containing source documents
        docs: String,

        /// Database file path
        #[arg(long, default_value = "docshard.db")]
        db: String,

        /// Chunking strategy: fixed, recursive, token, semantic, external
        #[arg(long, default_value = "recursive")]
        strategy: Strategy,

        /// Maximum chunk size in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Overlap between adjacent chunks in characters
        #[arg(long, default_value_t = DEFAULT_OVERLAP)]
        overlap: usize,

        /// Semantic breakpoint threshold in [0, 1]
        #[arg(long, default_value_t = DEFAULT_SEMANTIC_THRESHOLD)]
        threshold: f32,
    },

    /// Query the store for the chunks nearest to a text
    Query {
        /// Query text
        text: String,

        /// Database file path
        #[arg(long, default_value = "docshard.db")]
        db: String,

        /// Number of results
        #[arg(short, long, default_value_t = 3)]
        n: usize,
    },

    /// Run every strategy over the same documents and report chunk statistics
    Compare {
        /// Directory containing source documents
        docs: String,

        /// Maximum chunk size in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Overlap between adjacent chunks in characters
        #[arg(long, default_value_t = DEFAULT_OVERLAP)]
        overlap: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            docs,
            db,
            strategy,
            chunk_size,
            overlap,
            threshold,
        } => build(&docs, &db, &cli.endpoint, strategy, chunk_size, overlap, threshold),
        Commands::Query { text, db, n } => query(&text, &db, &cli.endpoint, n),
        Commands::Compare {
            docs,
            chunk_size,
            overlap,
        } => compare(&docs, &cli.endpoint, chunk_size, overlap),
    }
}

fn build(
    docs_dir: &str,
    db_path: &str,
    endpoint: &str,
    strategy: Strategy,
    chunk_size: usize,
    overlap: usize,
    threshold: f32,
) -> Result<()> {
    let start_time = Instant::now();
    println!("=== docshard: Building vector store ===\n");

    // Step 1: Load documents
    let step1_start = Instant::now();
    println!("Step 1: Loading documents from {}...", docs_dir);
    let documents = load_documents(docs_dir)?;
    println!(
        "✓ Loaded {} documents [{:.2}s]\n",
        documents.len(),
        step1_start.elapsed().as_secs_f64()
    );

    // Step 2: Chunk
    let step2_start = Instant::now();
    println!("Step 2: Chunking ({} strategy)...", strategy);
    let embedder = Arc::new(HttpEmbedder::new(endpoint)?);
    let chunker = Chunker::builder(ChunkConfig {
        strategy,
        chunk_size,
        overlap,
        semantic_threshold: threshold,
    })
    .tokenizer(Arc::new(WordTokenizer::new()))
    .embedder(embedder.clone())
    .build()?;

    if chunker.effective_strategy() != strategy {
        println!(
            "  (degraded to {} strategy)",
            chunker.effective_strategy()
        );
    }

    let batch = chunker.chunk_batch(&documents);
    println!(
        "✓ Produced {} chunks [{:.2}s]\n",
        batch.len(),
        step2_start.elapsed().as_secs_f64()
    );

    // Step 3: Embed and store
    let step3_start = Instant::now();
    println!("Step 3: Embedding and storing...");
    let mut store = VectorStore::open(db_path, embedder)?;
    let inserted = store.add(&batch)?;
    println!(
        "✓ Stored {} chunks in {} [{:.2}s]\n",
        inserted,
        db_path,
        step3_start.elapsed().as_secs_f64()
    );

    println!("=== Summary ===");
    println!("Documents:     {}", documents.len());
    println!("Chunks:        {}", inserted);
    println!("Store total:   {}", store.count()?);
    println!("Total time:    {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

fn query(text: &str, db_path: &str, endpoint: &str, n: usize) -> Result<()> {
    let embedder = Arc::new(HttpEmbedder::new(endpoint)?);
    let store = VectorStore::open(db_path, embedder)?;

    let matches = store.query(text, n)?;
    if matches.is_empty() {
        println!("No chunks stored.");
        return Ok(());
    }

    println!("Top {} matches for: {}\n", matches.len(), text);
    for (rank, m) in matches.iter().enumerate() {
        println!(
            "{}. [{}] {} (chunk {}/{}, distance {:.4})",
            rank + 1,
            m.id,
            m.metadata.source,
            m.metadata.chunk_index + 1,
            m.metadata.total_chunks,
            m.distance
        );
        println!("   {}\n", preview(&m.text, 160));
    }

    Ok(())
}

fn compare(docs_dir: &str, endpoint: &str, chunk_size: usize, overlap: usize) -> Result<()> {
    let documents = load_documents(docs_dir)?;
    println!(
        "Comparing strategies over {} documents (chunk_size={}, overlap={})\n",
        documents.len(),
        chunk_size,
        overlap
    );

    let embedder = Arc::new(HttpEmbedder::new(endpoint)?);

    for strategy in [
        Strategy::Fixed,
        Strategy::Recursive,
        Strategy::Token,
        Strategy::Semantic,
    ] {
        let chunker = Chunker::builder(ChunkConfig {
            strategy,
            chunk_size,
            overlap,
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
        })
        .tokenizer(Arc::new(WordTokenizer::new()))
        .embedder(embedder.clone())
        .build()?;

        let batch = chunker.chunk_batch(&documents);
        let lengths: Vec<usize> = batch.texts.iter().map(|t| t.chars().count()).collect();

        println!("--- {} ---", strategy);
        if lengths.is_empty() {
            println!("  chunks: 0\n");
            continue;
        }

        let total: usize = lengths.iter().sum();
        let min = lengths.iter().min().copied().unwrap_or(0);
        let max = lengths.iter().max().copied().unwrap_or(0);
        println!("  chunks:    {}", lengths.len());
        println!("  avg chars: {:.1}", total as f64 / lengths.len() as f64);
        println!("  min chars: {}", min);
        println!("  max chars: {}", max);
        println!("  sample:    {}\n", preview(&batch.texts[0], 80));
    }

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let chars: Vec<char> = flat.chars().collect();
    if chars.len() <= max_chars {
        flat
    } else {
        let mut s: String = chars[..max_chars].iter().collect();
        s.push('…');
        s
    }
}
