use serde::{Deserialize, Serialize};

use super::vocabulary::{count_occurrences, matched_terms, normalize, word_count};
use crate::settings::{Quality, Vocabulary};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub has_technical_terms: bool,
    pub word_count: usize,
    pub technical_hits: usize,
    /// Words covered by term hits, so a four-character term weighs four.
    pub technical_words: usize,
    pub technical_terms: Vec<String>,
    pub technical_density: f32,
    pub confidence_score: f32,
}

fn saturate(value: f32, saturation: f32) -> f32 {
    if saturation <= 0.0 {
        return 1.0;
    }
    (value / saturation).clamp(0.0, 1.0)
}

/// Technical-content features over the generic vocabulary and every domain.
pub fn analyze_quality(text: &str, vocabulary: &Vocabulary, config: &Quality) -> QualityReport {
    analyze_with(text, &vocabulary.technical_vocabulary(None), config)
}

/// Same as [`analyze_quality`] but restricted to one domain's terms when the
/// domain is recognized.
pub fn analyze_quality_for(
    text: &str,
    domain: &str,
    vocabulary: &Vocabulary,
    config: &Quality,
) -> QualityReport {
    analyze_with(text, &vocabulary.technical_vocabulary(Some(domain)), config)
}

fn analyze_with(text: &str, terms: &[&str], config: &Quality) -> QualityReport {
    let word_count = word_count(text);
    let technical_terms: Vec<String> = matched_terms(text, terms)
        .into_iter()
        .map(String::from)
        .collect();
    let text_lower = normalize(text);
    let (technical_hits, technical_words) =
        terms.iter().fold((0, 0), |(hits, words), term| {
            let found = count_occurrences(&text_lower, term);
            (hits + found, words + found * super::vocabulary::word_count(term).max(1))
        });

    let technical_density = if word_count == 0 {
        0.0
    } else {
        (technical_words as f32 / word_count as f32).min(1.0)
    };

    let confidence_score = (saturate(technical_density, config.density_saturation)
        * config.density_weight
        + saturate(word_count as f32, config.length_saturation_words as f32) * config.length_weight
        + saturate(technical_terms.len() as f32, config.term_saturation as f32)
            * config.term_weight)
        .clamp(0.0, 1.0);

    QualityReport {
        has_technical_terms: !technical_terms.is_empty(),
        word_count,
        technical_hits,
        technical_words,
        technical_terms,
        technical_density,
        confidence_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn run(text: &str) -> QualityReport {
        let s = Settings::default();
        analyze_quality(text, &s.vocabulary, &s.quality)
    }

    #[test]
    fn test_empty_text_has_zero_density() {
        for text in ["", "   ", "！？。"] {
            let report = run(text);
            assert_eq!(report.word_count, 0);
            assert_eq!(report.technical_density, 0.0);
            assert!(!report.has_technical_terms);
            assert_eq!(report.confidence_score, 0.0);
        }
    }

    #[test]
    fn test_technical_terms_detected() {
        let report = run("我用深度学习训练了一个神经网络模型");
        assert!(report.has_technical_terms);
        assert!(report.technical_terms.contains(&"深度学习".to_string()));
        assert!(report.technical_terms.contains(&"神经网络".to_string()));
        assert!(report.technical_terms.contains(&"模型".to_string()));
        assert!(report.technical_density > 0.0);
    }

    #[test]
    fn test_plain_text_has_no_terms() {
        let report = run("今天天气很好，我们去公园散步吧");
        assert!(!report.has_technical_terms);
        assert_eq!(report.technical_hits, 0);
        assert!(report.confidence_score < 0.2);
    }

    #[test]
    fn test_density_weighs_han_terms_by_length() {
        let report = run("我们用深度学习完成了这个任务");
        assert_eq!(report.technical_hits, 1);
        assert_eq!(report.technical_words, 4);
        assert_eq!(report.word_count, 14);
        assert!((report.technical_density - 4.0 / 14.0).abs() < 1e-6);

        let mixed = run("Spark 和 Kafka");
        assert_eq!(mixed.technical_words, 2);
        assert!((mixed.technical_density - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_score_bounded() {
        let dense = "深度学习 神经网络 机器学习 模型 算法 ".repeat(40);
        let report = run(&dense);
        assert!(report.confidence_score <= 1.0);
        assert!(report.confidence_score > 0.9);
    }

    #[test]
    fn test_domain_restricted_vocabulary() {
        let s = Settings::default();
        let text = "我们用 Kafka 和 Spark 做实时计算";
        let any = analyze_quality(text, &s.vocabulary, &s.quality);
        let ai_only = analyze_quality_for(text, "人工智能", &s.vocabulary, &s.quality);
        let big_data = analyze_quality_for(text, "大数据", &s.vocabulary, &s.quality);
        assert_eq!(any.technical_terms.len(), 3);
        assert!(ai_only.technical_terms.is_empty());
        assert_eq!(big_data.technical_terms, any.technical_terms);
    }
}
