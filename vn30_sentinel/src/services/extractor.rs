use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{AnalysisResult, RawAnalysis, Recommendation, Sentiment};
use crate::services::sources::dedupe_sources;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_TREND: &str = "Unknown";
pub const MAX_KEY_POINTS: usize = 3;
pub const FAILED_SUMMARY: &str = "Lỗi phân tích.";
pub const FAILED_TECH_ANALYSIS: &str = "Không thể lấy dữ liệu kỹ thuật.";

/// Теги секций, которые модель обязана расставить в ответе
pub const SECTION_TAGS: [&str; 11] = [
    "SUMMARY",
    "PRICE",
    "PE",
    "EPS",
    "ROE",
    "TREND",
    "SUPPORT",
    "RESISTANCE",
    "TECH_ANALYSIS",
    "KEY_POINTS",
    "VERDICT",
];

const BULLET_MARKERS: [char; 2] = ['•', '-'];

fn section_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        let pattern = format!(r"\[(?:{})\]", SECTION_TAGS.join("|"));
        Regex::new(&pattern).expect("section marker pattern is valid")
    })
}

/// Возвращает содержимое секции `[tag]` до следующего известного тега или конца текста.
/// Если тега нет, возвращает "N/A".
pub fn extract_tagged_section(text: &str, tag: &str) -> String {
    let opening = format!("[{}]", tag);
    let Some(position) = text.find(&opening) else {
        return NOT_AVAILABLE.to_string();
    };

    let rest = &text[position + opening.len()..];
    let end = section_marker()
        .find(rest)
        .map_or(rest.len(), |marker| marker.start());

    rest[..end].trim().to_string()
}

pub fn extract_key_points(text: &str) -> Vec<String> {
    // Берем только секцию KEY_POINTS, чтобы не захватить списки из других секций
    let section = extract_tagged_section(text, "KEY_POINTS");

    section
        .lines()
        .filter_map(|line| line.trim().strip_prefix(BULLET_MARKERS))
        .map(|point| point.trim().to_string())
        .take(MAX_KEY_POINTS)
        .collect()
}

pub fn extract_sentiment(text: &str) -> Sentiment {
    if text.contains("SENTIMENT: POSITIVE") {
        Sentiment::Positive
    } else if text.contains("SENTIMENT: NEGATIVE") {
        Sentiment::Negative
    } else if text.contains("SENTIMENT: NEUTRAL") {
        Sentiment::Neutral
    } else {
        Sentiment::Unknown
    }
}

pub fn extract_recommendation(text: &str) -> Recommendation {
    if text.contains("RECOMMENDATION: BUY") {
        Recommendation::Buy
    } else if text.contains("RECOMMENDATION: SELL") {
        Recommendation::Sell
    } else if text.contains("RECOMMENDATION: HOLD") {
        Recommendation::Hold
    } else {
        Recommendation::Watch
    }
}

/// Собирает структурированный результат из сырого ответа модели
pub fn build_result(ticker: &str, raw: &RawAnalysis) -> AnalysisResult {
    let text = raw.text.as_str();

    AnalysisResult {
        ticker: ticker.to_string(),
        summary: extract_tagged_section(text, "SUMMARY"),
        current_price: extract_tagged_section(text, "PRICE"),
        pe: extract_tagged_section(text, "PE"),
        eps: extract_tagged_section(text, "EPS"),
        roe: extract_tagged_section(text, "ROE"),
        trend: extract_tagged_section(text, "TREND"),
        support: extract_tagged_section(text, "SUPPORT"),
        resistance: extract_tagged_section(text, "RESISTANCE"),
        technical_analysis: extract_tagged_section(text, "TECH_ANALYSIS"),
        key_points: extract_key_points(text),
        sentiment: extract_sentiment(text),
        recommendation: extract_recommendation(text),
        sources: dedupe_sources(&raw.citations),
        last_updated: Utc::now(),
    }
}

/// Результат-заглушка для тикера, по которому не удалось получить анализ
pub fn fallback_result(ticker: &str) -> AnalysisResult {
    AnalysisResult {
        ticker: ticker.to_string(),
        summary: FAILED_SUMMARY.to_string(),
        current_price: NOT_AVAILABLE.to_string(),
        pe: NOT_AVAILABLE.to_string(),
        eps: NOT_AVAILABLE.to_string(),
        roe: NOT_AVAILABLE.to_string(),
        trend: UNKNOWN_TREND.to_string(),
        support: NOT_AVAILABLE.to_string(),
        resistance: NOT_AVAILABLE.to_string(),
        technical_analysis: FAILED_TECH_ANALYSIS.to_string(),
        key_points: Vec::new(),
        sentiment: Sentiment::Unknown,
        recommendation: Recommendation::Watch,
        sources: Vec::new(),
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroundingCitation;

    const SAMPLE: &str = "\
[SUMMARY]
Lợi nhuận quý tăng mạnh.
Dòng tiền khối ngoại quay lại.

[PRICE]
95,400
[PE]12.5
[EPS]3,500
[ROE]18%
[TREND]Tăng ngắn hạn
[SUPPORT]92,000
[RESISTANCE]99,000
[TECH_ANALYSIS]
Mẫu hình cốc tay cầm, RSI 62.
- không phải điểm nhấn
[KEY_POINTS]
• Kết quả kinh doanh vượt kỳ vọng
- Thanh khoản cải thiện
• Rủi ro tỷ giá
• Điểm thứ tư
[VERDICT]
SENTIMENT: POSITIVE
RECOMMENDATION: BUY
";

    #[test]
    fn test_extract_pe_stops_at_next_tag() {
        let text = "Phân tích...[PE]12.5\n[EPS]3,500...";
        assert_eq!(extract_tagged_section(text, "PE"), "12.5");
        assert_eq!(extract_tagged_section(text, "EPS"), "3,500...");
    }

    #[test]
    fn test_extract_multiline_section() {
        assert_eq!(
            extract_tagged_section(SAMPLE, "SUMMARY"),
            "Lợi nhuận quý tăng mạnh.\nDòng tiền khối ngoại quay lại."
        );
        assert_eq!(extract_tagged_section(SAMPLE, "PRICE"), "95,400");
    }

    #[test]
    fn test_extract_missing_tag_returns_placeholder() {
        assert_eq!(extract_tagged_section(SAMPLE, "DIVIDEND"), "N/A");
        assert_eq!(extract_tagged_section("", "PE"), "N/A");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let first = extract_tagged_section(SAMPLE, "TECH_ANALYSIS");
        let second = extract_tagged_section(SAMPLE, "TECH_ANALYSIS");
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_keeps_non_tag_brackets() {
        let text = "[SUMMARY]Theo báo cáo [1] và [2]\n[PRICE]10";
        assert_eq!(extract_tagged_section(text, "SUMMARY"), "Theo báo cáo [1] và [2]");
    }

    #[test]
    fn test_key_points_capped_and_scoped() {
        let text = "[KEY_POINTS]\n• A\n- B\n• C\n• D\n[VERDICT]\n- E";
        assert_eq!(extract_key_points(text), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_key_points_ignore_other_sections() {
        let points = extract_key_points(SAMPLE);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], "Kết quả kinh doanh vượt kỳ vọng");
        assert!(!points.iter().any(|p| p.contains("không phải")));
    }

    #[test]
    fn test_key_points_absent() {
        assert!(extract_key_points("[SUMMARY]\n• A").is_empty());
        assert!(extract_key_points("[KEY_POINTS]\nkhông có gạch đầu dòng").is_empty());
    }

    #[test]
    fn test_sentiment_markers() {
        assert_eq!(extract_sentiment("...SENTIMENT: NEGATIVE..."), Sentiment::Negative);
        assert_eq!(extract_sentiment("no verdict"), Sentiment::Unknown);
        // При нескольких маркерах побеждает приоритетный
        assert_eq!(
            extract_sentiment("SENTIMENT: NEUTRAL\nSENTIMENT: POSITIVE"),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_recommendation_defaults_to_watch() {
        assert_eq!(extract_recommendation("SENTIMENT: POSITIVE"), Recommendation::Watch);
        assert_eq!(extract_recommendation("RECOMMENDATION: HOLD"), Recommendation::Hold);
        assert_eq!(
            extract_recommendation("RECOMMENDATION: HOLD RECOMMENDATION: SELL"),
            Recommendation::Sell
        );
    }

    #[test]
    fn test_build_result_from_sample() {
        let raw = RawAnalysis {
            text: SAMPLE.to_string(),
            citations: vec![
                GroundingCitation::new("CafeF", "https://cafef.vn/fpt"),
                GroundingCitation::new("CafeF copy", "https://cafef.vn/fpt"),
            ],
        };

        let result = build_result("FPT", &raw);
        assert_eq!(result.ticker, "FPT");
        assert_eq!(result.pe, "12.5");
        assert_eq!(result.roe, "18%");
        assert_eq!(result.trend, "Tăng ngắn hạn");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.recommendation, Recommendation::Buy);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].title, "CafeF");
    }

    #[test]
    fn test_build_result_from_empty_text() {
        let result = build_result("VIC", &RawAnalysis::default());
        assert_eq!(result.summary, "N/A");
        assert!(result.key_points.is_empty());
        assert_eq!(result.sentiment, Sentiment::Unknown);
        assert_eq!(result.recommendation, Recommendation::Watch);
    }

    #[test]
    fn test_fallback_result() {
        let result = fallback_result("XYZ");
        assert_eq!(result.ticker, "XYZ");
        assert_eq!(result.summary, "Lỗi phân tích.");
        assert_eq!(result.technical_analysis, "Không thể lấy dữ liệu kỹ thuật.");
        assert_eq!(result.trend, "Unknown");
        assert_eq!(result.pe, "N/A");
        assert_eq!(result.sentiment, Sentiment::Unknown);
        assert_eq!(result.recommendation, Recommendation::Watch);
        assert!(result.sources.is_empty());
    }
}
