pub mod client;
pub mod extractor;
pub mod orchestrator;
pub mod overview;
pub mod prompt;
pub mod sources;

pub use client::{AnalysisClient, GeminiClient};
pub use orchestrator::AnalysisOrchestrator;
