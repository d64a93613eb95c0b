// Campus Policy Assistant - Core
//
// Scrapes policy pages from a university site into Postgres and answers
// questions about them through an LLM, citing the policies it used.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
