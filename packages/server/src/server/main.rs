// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use policy_core::domains::policies::sources::builtin_profiles;
use policy_core::kernel::{
    start_scheduler, AnswerSettings, BaseSearchService, HttpPageFetcher, OpenAIAdapter,
    ServerDeps, TavilyClient,
};
use policy_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,policy_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Campus Policy Assistant API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // External services
    let ai = Arc::new(OpenAIAdapter::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    ));
    let fetcher = Arc::new(HttpPageFetcher::new()?);
    let web_searcher = match &config.tavily_api_key {
        Some(key) => {
            tracing::info!("Web search fallback enabled");
            Some(Arc::new(TavilyClient::new(key.clone())?) as Arc<dyn BaseSearchService>)
        }
        None => {
            tracing::info!("TAVILY_API_KEY not set, web search fallback disabled");
            None
        }
    };

    let deps = ServerDeps::new(pool, ai, fetcher, web_searcher)
        .with_scrape_delay(Duration::from_millis(config.scrape_delay_ms))
        .with_answer_settings(AnswerSettings {
            context_limit: config.answer_context_limit,
            site_domain: config.site_domain(),
            ..Default::default()
        });

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = if config.scrape_on_schedule {
        let profiles = builtin_profiles(&config.policy_site_url)?;
        Some(
            start_scheduler(deps.clone(), profiles, &config.scrape_schedule)
                .await
                .context("Failed to start scrape scheduler")?,
        )
    } else {
        tracing::info!("SCRAPE_ON_SCHEDULE not set, scheduled scraping disabled");
        None
    };

    let app = build_app(deps, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
