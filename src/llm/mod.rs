//! LLM access for abstract annotation.

pub mod answer;

pub use answer::{Answerer, DryRunAnswerer, LlmAnswerer, DRY_RUN_RESPONSES};
