/// Формирует запрос к модели для одного тикера.
/// Модель должна вернуть ответ строго в формате тегов, который понимает extractor.
pub fn build_prompt(ticker: &str) -> String {
    format!(
        r#"You are a senior financial analyst and securities trader (CFA/CMT) specialising in the Vietnamese VN30 market.
Produce an in-depth analysis of the stock {ticker}.

Use Google Search to find the LATEST data (within the last 7 days) on:
1. Financial health: the current or most recent P/E, EPS and ROE.
2. Technicals: price data, volume and indicators.

Analysis requirements:
- FUNDAMENTAL: judge whether the stock is expensive or cheap based on P/E and growth potential.
- TECHNICAL: go beyond the trend and look for chart patterns such as head-and-shoulders, cup-and-handle,
  double top/bottom, Wyckoff accumulation/distribution, or signals from RSI (divergence), MACD and Bollinger Bands.

Answer in Vietnamese, using exactly these data tags:

[SUMMARY]
2-3 sentences on the fundamental story (catalyst) and current market sentiment.

[PRICE]
Current price (VND).

[PE]
P/E ratio (e.g. 12.5). If no exact figure is found, estimate it from the latest report.

[EPS]
EPS (e.g. 3,500).

[ROE]
ROE (e.g. 18%).

[TREND]
Primary trend (e.g. short-term uptrend, sideways accumulation, downtrend).

[SUPPORT]
Key support zone.

[RESISTANCE]
Key resistance zone.

[TECH_ANALYSIS]
Detailed price action analysis. Identify the candlestick or chart pattern that is forming. Comment on volume (money flow).

[KEY_POINTS]
• Highlight 1 (fundamentals/news)
• Highlight 2 (technicals/money flow)
• Highlight 3 (risk or opportunity)

[VERDICT]
SENTIMENT: POSITIVE or NEGATIVE or NEUTRAL
RECOMMENDATION: BUY or SELL or HOLD or WATCH
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extractor::SECTION_TAGS;

    #[test]
    fn test_prompt_mentions_ticker_and_every_tag() {
        let prompt = build_prompt("HPG");
        assert!(prompt.contains("HPG"));
        for tag in SECTION_TAGS {
            assert!(prompt.contains(&format!("[{}]", tag)), "missing tag {}", tag);
        }
    }
}
