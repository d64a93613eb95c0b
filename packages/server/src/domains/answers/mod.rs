//! Question answering over stored policies, with a web search fallback

pub mod actions;
pub mod data;
pub mod prompts;

pub use actions::{ask, ask_web, AnswerError};
pub use data::{Answer, AnswerSource, Citation};
