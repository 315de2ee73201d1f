use crate::models::{AnalysisResult, DistributionEntry, MarketOverview, Recommendation, Sentiment};

const SENTIMENT_ORDER: [Sentiment; 4] = [
    Sentiment::Positive,
    Sentiment::Neutral,
    Sentiment::Negative,
    Sentiment::Unknown,
];

const RECOMMENDATION_ORDER: [Recommendation; 4] = [
    Recommendation::Buy,
    Recommendation::Hold,
    Recommendation::Watch,
    Recommendation::Sell,
];

impl MarketOverview {
    /// Сводка по прогону: распределение настроений и рекомендаций.
    /// Пустые группы не попадают в распределение.
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        let total_analyzed = results.len();

        let sentiment_distribution = SENTIMENT_ORDER
            .iter()
            .map(|sentiment| DistributionEntry {
                label: sentiment.to_string(),
                count: results.iter().filter(|r| r.sentiment == *sentiment).count(),
            })
            .filter(|entry| entry.count > 0)
            .collect();

        let recommendation_distribution = RECOMMENDATION_ORDER
            .iter()
            .map(|recommendation| DistributionEntry {
                label: recommendation.to_string(),
                count: results.iter().filter(|r| r.recommendation == *recommendation).count(),
            })
            .filter(|entry| entry.count > 0)
            .collect();

        let positive_count = results.iter().filter(|r| r.sentiment == Sentiment::Positive).count();
        let negative_count = results.iter().filter(|r| r.sentiment == Sentiment::Negative).count();

        let (positive_percentage, negative_percentage) = if total_analyzed > 0 {
            (
                positive_count as f64 / total_analyzed as f64 * 100.0,
                negative_count as f64 / total_analyzed as f64 * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        MarketOverview {
            total_analyzed,
            sentiment_distribution,
            recommendation_distribution,
            positive_percentage,
            negative_percentage,
        }
    }
}
