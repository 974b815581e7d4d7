use std::sync::Arc;
use std::time::Duration;

use chronicle_core::{AssistantBackend, ChatCompletionsClient, ChatConfig, ChronicleConfig};
use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use chronicle_server::{http, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chronicle.toml")]
    config: String,

    /// Load and validate the data tables, print a summary, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience, production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match ChronicleConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let dataset = match chronicle_ingest::load_dataset(&config.data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to load data tables: {}", e);
            std::process::exit(1);
        }
    };

    if args.check {
        println!("✅ Events loaded:       {}", dataset.events.len());
        println!("⚠️  Events dropped:      {}", dataset.events.dropped().len());
        for row in dataset.events.dropped() {
            println!("   row {}: {} (year {:?})", row.index + 1, row.name, row.raw_year.to_string());
        }
        println!("✅ Trivia questions:    {}", dataset.trivia.questions.len());
        println!("⚠️  Trivia rejected:     {}", dataset.trivia.rejected.len());
        for rejected in &dataset.trivia.rejected {
            println!("   row {}: {}", rejected.row, rejected.error);
        }
        if let Some((min, max)) = dataset.events.year_span() {
            println!("📅 Years covered:       {} to {}", min, max);
        }
        return Ok(());
    }

    let assistant: Option<Arc<dyn AssistantBackend>> =
        match ChatCompletionsClient::new(ChatConfig::from(&config.assistant)) {
            Ok(client) => {
                tracing::info!(model = client.model(), "Historical assistant enabled");
                Some(Arc::new(client) as Arc<dyn AssistantBackend>)
            }
            Err(e) => {
                tracing::warn!("Historical assistant disabled: {}", e);
                None
            }
        };

    if dataset.trivia.questions.len() < config.quiz.size {
        tracing::warn!(
            pool = dataset.trivia.questions.len(),
            quiz_size = config.quiz.size,
            "Quiz pool is smaller than the quiz size; quiz starts will fail"
        );
    }

    let state = Arc::new(
        AppState::new(dataset, config.quiz.size, assistant).with_session_limits(
            Duration::from_secs(config.quiz.session_ttl_secs),
            config.quiz.max_sessions,
        ),
    );

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(state, &config.http, tx.subscribe()).await?;

    Ok(())
}
