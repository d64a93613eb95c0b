use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub tavily_api_key: Option<String>,
    /// Root of the university site the built-in profiles scrape
    pub policy_site_url: String,
    /// Six-field cron expression (seconds first)
    pub scrape_schedule: String,
    pub scrape_on_schedule: bool,
    pub scrape_delay_ms: u64,
    pub answer_context_limit: i64,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|v| !v.is_empty()),
            tavily_api_key: env::var("TAVILY_API_KEY").ok().filter(|v| !v.is_empty()),
            policy_site_url: env::var("POLICY_SITE_URL")
                .unwrap_or_else(|_| "https://www.example.edu".to_string()),
            scrape_schedule: env::var("SCRAPE_SCHEDULE")
                .unwrap_or_else(|_| "0 0 3 * * *".to_string()),
            scrape_on_schedule: env::var("SCRAPE_ON_SCHEDULE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            scrape_delay_ms: env::var("SCRAPE_DELAY_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .context("SCRAPE_DELAY_MS must be a valid number")?,
            answer_context_limit: env::var("ANSWER_CONTEXT_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("ANSWER_CONTEXT_LIMIT must be a valid number")?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Host of `policy_site_url`, used to scope web searches
    pub fn site_domain(&self) -> Option<String> {
        Url::parse(&self.policy_site_url)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.to_string()))
    }
}

/// Subset of configuration the scrape CLI needs (no LLM credentials)
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub database_url: String,
    pub policy_site_url: String,
    pub scrape_delay_ms: u64,
}

impl ScrapeConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            policy_site_url: env::var("POLICY_SITE_URL")
                .unwrap_or_else(|_| "https://www.example.edu".to_string()),
            scrape_delay_ms: env::var("SCRAPE_DELAY_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .context("SCRAPE_DELAY_MS must be a valid number")?,
        })
    }
}
