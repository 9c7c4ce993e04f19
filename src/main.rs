use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use issuescope::analysis::{AnalysisRequest, Analyzer, validate_repo};
use issuescope::cache::InMemoryAnalysisCache;
use issuescope::clock::{Clock, SystemClock};
use issuescope::config::Config;
use issuescope::embedding::{FingerprintEmbeddingProvider, cosine_similarity, generate};
use issuescope::ingest::{IngestPipeline, RawIssue};
use issuescope::logging;
use issuescope::server::IssueScopeService;
use issuescope::store::RepositoryInfo;
use issuescope::store::memory::InMemoryIssueStore;
use rmcp::ServiceExt;

#[derive(Parser)]
#[command(name = "issuescope", version, about = "Prompt-driven GitHub issue ranking over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank issues from a JSON file of raw GitHub issues and print the result
    Analyze {
        /// Repository in "owner/name" form
        #[arg(long)]
        repo: String,
        /// Path to a JSON array of issues as returned by the GitHub issues API
        #[arg(long)]
        issues: PathBuf,
        /// What to look for, e.g. "fix open bugs"
        #[arg(long)]
        prompt: String,
        /// 1-based page number
        #[arg(long)]
        page: Option<i64>,
        /// Issues per page
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Print the fingerprint cosine similarity of two texts
    Similarity {
        a: String,
        b: String,
    },
}

async fn run_analyze(
    config: &Config,
    repo: String,
    issues_path: PathBuf,
    prompt: String,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<()> {
    validate_repo(&repo)?;
    let raw = std::fs::read_to_string(&issues_path)
        .with_context(|| format!("Failed to read {}", issues_path.display()))?;
    let raw_issues: Vec<RawIssue> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} as a JSON array of issues", issues_path.display()))?;

    let store = Arc::new(InMemoryIssueStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let now = clock.now();

    let pipeline = IngestPipeline::new(Arc::new(FingerprintEmbeddingProvider::new()), store.clone());
    let scan = pipeline
        .ingest(RepositoryInfo::from_full_name(&repo, now), &raw_issues, now)
        .await?;
    tracing::info!(
        stored = scan.total_issues,
        pull_requests = scan.filtered_pull_requests,
        "Loaded issues from file"
    );

    let analyzer = Analyzer::new(
        store,
        Arc::new(InMemoryAnalysisCache::new()),
        clock,
        config.ranking.clone(),
        config.analysis.clone(),
    );
    let response = analyzer
        .analyze(AnalysisRequest { repo, prompt, page, limit })
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // 3. Initialize logging before any other output; stdout is reserved for JSON-RPC
    logging::init_logging(&config);

    match cli.command {
        Some(Commands::Analyze { repo, issues, prompt, page, limit }) => {
            run_analyze(&config, repo, issues, prompt, page, limit).await?;
        }

        Some(Commands::Similarity { a, b }) => {
            let similarity = cosine_similarity(&generate(&a), &generate(&b))?;
            println!("{:.6}", similarity);
        }

        None => {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "issuescope server starting"
            );

            let service = IssueScopeService::in_memory(&config);

            let (stdin, stdout) = rmcp::transport::io::stdio();
            let server = service.serve((stdin, stdout)).await?;

            tracing::info!("issuescope server running, awaiting tool calls via stdio");

            server.waiting().await?;

            tracing::info!("issuescope server stopped");
        }
    }

    Ok(())
}
