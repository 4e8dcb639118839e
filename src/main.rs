//! Ads Quality Rater - CLI entry point

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ads_quality_rater::adapters::{HttpAnalysisClient, InMemoryConversationStore};
use ads_quality_rater::application::{AnalysisSessionController, SessionOutcome};
use ads_quality_rater::config::{AppConfig, LoggingConfig};
use ads_quality_rater::domain::analysis::{AdInput, AnalysisRequest};
use ads_quality_rater::domain::conversation::ConversationChange;
use ads_quality_rater::domain::foundation::Timestamp;
use ads_quality_rater::ports::{AnalysisService, ConversationObserver, ConversationStore};

#[derive(Parser)]
#[command(name = "ads-rater")]
#[command(about = "Rate an ad creative against its landing page")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis and print its progress and verdict
    Analyze(AnalyzeArgs),

    /// Show the analysis service health report
    Health,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Local ad image (jpg, png, gif, webp, bmp, svg)
    #[arg(long, required_unless_present = "ad_url", conflicts_with = "ad_url")]
    ad_file: Option<PathBuf>,

    /// Public URL of the ad image
    #[arg(long)]
    ad_url: Option<String>,

    /// Landing page the ad points to
    #[arg(long)]
    landing_page: String,

    /// Target audience description
    #[arg(long)]
    target_audience: Option<String>,

    /// Campaign goal description
    #[arg(long)]
    campaign_goal: Option<String>,

    /// Brand guidelines as JSON text
    #[arg(long, conflicts_with = "guidelines_file")]
    guidelines: Option<String>,

    /// File containing brand guidelines JSON
    #[arg(long)]
    guidelines_file: Option<PathBuf>,
}

/// Prints agent progress to stdout as it arrives.
struct TerminalObserver;

impl ConversationObserver for TerminalObserver {
    fn on_change(&self, change: &ConversationChange) {
        match change {
            ConversationChange::LoadingStarted { .. } => println!("\n⏳ Analyzing..."),
            ConversationChange::LogAppended { line, .. } => {
                println!("  [{}] {}", Timestamp::now().to_clock_string(), line)
            }
            ConversationChange::UserAppended { .. } | ConversationChange::Finalized { .. } => {}
        }
    }
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_request(args: AnalyzeArgs) -> Result<AnalysisRequest> {
    let ad = match (args.ad_file, args.ad_url) {
        (Some(path), _) => AdInput::from_path(&path)
            .await
            .with_context(|| format!("Failed to load ad file {}", path.display()))?,
        (None, Some(url)) => AdInput::url(url),
        (None, None) => anyhow::bail!("either --ad-file or --ad-url is required"),
    };

    let guidelines = match (args.guidelines, args.guidelines_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read guidelines {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let mut request = AnalysisRequest::new(ad, args.landing_page);
    if let Some(audience) = args.target_audience {
        request = request.with_target_audience(audience);
    }
    if let Some(goal) = args.campaign_goal {
        request = request.with_campaign_goal(goal);
    }
    if let Some(guidelines) = guidelines {
        request = request.with_guidelines(guidelines);
    }
    Ok(request)
}

async fn analyze(config: &AppConfig, args: AnalyzeArgs) -> Result<ExitCode> {
    let request = build_request(args).await?;

    let service = Arc::new(HttpAnalysisClient::new(&config.client)?);
    let store = Arc::new(InMemoryConversationStore::new());
    store.subscribe(Arc::new(TerminalObserver)).await;

    let controller = Arc::new(
        AnalysisSessionController::new(service, store.clone())
            .with_max_ad_file_bytes(config.client.max_ad_file_bytes),
    );

    let interrupt = tokio::spawn({
        let controller = controller.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling analysis");
                controller.cancel();
            }
        }
    });

    println!("{}", request.summary());
    let outcome = controller.submit(request).await;
    interrupt.abort();
    let outcome = outcome?;

    let conversation = store.snapshot().await;
    if let Some(last) = conversation.last() {
        println!("\n{}", last.content());
    }

    Ok(match outcome {
        SessionOutcome::Completed { .. } => ExitCode::SUCCESS,
        SessionOutcome::Failed { .. } => ExitCode::FAILURE,
    })
}

async fn health(config: &AppConfig) -> Result<ExitCode> {
    let client = HttpAnalysisClient::new(&config.client)?;
    let report = client
        .health()
        .await
        .with_context(|| format!("Health check against {} failed", client.base_url()))?;

    println!("status: {}", report.status);
    if let Some(timestamp) = &report.timestamp {
        println!("timestamp: {}", timestamp);
    }
    let mut services: Vec<_> = report.services.iter().collect();
    services.sort_by(|a, b| a.0.cmp(b.0));
    for (name, status) in services {
        println!("  {}: {}", name, status);
    }
    if let Some(error) = &report.error {
        println!("error: {}", error);
    }

    Ok(if report.status.is_available() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Analyze(args) => analyze(&config, args).await,
        Commands::Health => health(&config).await,
    }
}
