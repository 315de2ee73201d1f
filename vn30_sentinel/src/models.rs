use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
    /// Наблюдать; значение по умолчанию, если модель не дала явного сигнала
    Watch,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
            Recommendation::Watch => "WATCH",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Источник, как его вернула модель (поля могут отсутствовать)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingCitation {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl GroundingCitation {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        GroundingCitation {
            title: Some(title.into()),
            url: Some(url.into()),
        }
    }
}

/// Сырой ответ модели по одному тикеру
#[derive(Debug, Clone, Default)]
pub struct RawAnalysis {
    pub text: String,
    pub citations: Vec<GroundingCitation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ticker: String,
    pub summary: String,
    pub current_price: String,
    pub pe: String,
    pub eps: String,
    pub roe: String,
    pub trend: String,
    pub support: String,
    pub resistance: String,
    pub technical_analysis: String,
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
    pub recommendation: Recommendation,
    pub sources: Vec<Source>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Result(AnalysisResult),
    /// Доля выполненных тикеров в диапазоне [0, 1]
    Progress(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running { completed: usize, total: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketOverview {
    pub total_analyzed: usize,
    pub sentiment_distribution: Vec<DistributionEntry>,
    pub recommendation_distribution: Vec<DistributionEntry>,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}
