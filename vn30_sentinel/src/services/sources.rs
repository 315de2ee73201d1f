use std::collections::HashSet;

use crate::models::{GroundingCitation, Source};

pub const MAX_SOURCES: usize = 5;

/// Отбрасывает источники без URL, убирает дубликаты по URL (остается первый заголовок)
/// и ограничивает список первыми MAX_SOURCES элементами.
pub fn dedupe_sources(citations: &[GroundingCitation]) -> Vec<Source> {
    let mut seen = HashSet::new();

    citations
        .iter()
        .filter_map(|citation| {
            let url = citation.url.as_deref().filter(|url| !url.trim().is_empty())?;
            let title = citation
                .title
                .as_deref()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or(url);
            Some(Source {
                title: title.to_string(),
                url: url.to_string(),
            })
        })
        .filter(|source| seen.insert(source.url.clone()))
        .take(MAX_SOURCES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_title_wins() {
        let citations = vec![
            GroundingCitation::new("X", "a"),
            GroundingCitation::new("Y", "a"),
            GroundingCitation::new("Z", "b"),
        ];

        let sources = dedupe_sources(&citations);
        assert_eq!(
            sources,
            vec![
                Source { title: "X".to_string(), url: "a".to_string() },
                Source { title: "Z".to_string(), url: "b".to_string() },
            ]
        );
    }

    #[test]
    fn test_entries_without_url_are_dropped() {
        let citations = vec![
            GroundingCitation { title: Some("no url".to_string()), url: None },
            GroundingCitation { title: Some("blank".to_string()), url: Some("  ".to_string()) },
            GroundingCitation { title: None, url: Some("https://vneconomy.vn".to_string()) },
        ];

        let sources = dedupe_sources(&citations);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "https://vneconomy.vn");
    }

    #[test]
    fn test_truncated_to_five_in_order() {
        let citations: Vec<_> = (0..8)
            .flat_map(|i| {
                let url = format!("https://example.com/{}", i);
                vec![
                    GroundingCitation::new(format!("title {}", i), url.clone()),
                    GroundingCitation::new("dup", url),
                ]
            })
            .collect();

        let sources = dedupe_sources(&citations);
        assert_eq!(sources.len(), MAX_SOURCES);
        let urls: Vec<_> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/0",
                "https://example.com/1",
                "https://example.com/2",
                "https://example.com/3",
                "https://example.com/4",
            ]
        );
        assert!(sources.iter().all(|s| s.title != "dup"));
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_sources(&[]).is_empty());
    }
}
