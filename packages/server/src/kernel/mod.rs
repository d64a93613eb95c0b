//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod deps;
pub mod page_fetcher;
pub mod scheduled_tasks;
pub mod tavily_client;
pub mod test_dependencies;
pub mod traits;

pub use ai::{OpenAIAdapter, DEFAULT_MODEL};
pub use deps::{AnswerSettings, ServerDeps};
pub use page_fetcher::HttpPageFetcher;
pub use scheduled_tasks::start_scheduler;
pub use tavily_client::TavilyClient;
pub use test_dependencies::TestDependencies;
pub use traits::*;
