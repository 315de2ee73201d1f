pub mod config;
pub mod errors;
pub mod holders;
pub mod models;
pub mod routers;
pub mod services;

pub use config::AppConfig;
pub use errors::{Result, SentinelError};
pub use holders::ResultsHolder;
pub use models::{
    AnalysisEvent, AnalysisResult, GroundingCitation, MarketOverview, RawAnalysis, Recommendation,
    RunState, Sentiment, Source,
};
pub use services::{AnalysisClient, AnalysisOrchestrator, GeminiClient};
pub use config::load_config;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: AnalysisOrchestrator,
    pub results: ResultsHolder,
    pub config: AppConfig,
}
