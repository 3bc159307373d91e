use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::quality::{analyze_quality_for, QualityReport};
use super::vocabulary::{matched_terms, text_length, word_count};
use crate::settings::{Plausibility, Scoring, Settings, Vocabulary};

pub const MIN_SCORE: f32 = 0.0;
pub const MAX_SCORE: f32 = 100.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    #[strum(serialize = "professional_knowledge")]
    ProfessionalKnowledge,
    #[strum(serialize = "skill_matching")]
    SkillMatching,
    #[strum(serialize = "language_expression")]
    LanguageExpression,
    #[strum(serialize = "logical_thinking")]
    LogicalThinking,
    #[strum(serialize = "innovation_ability")]
    InnovationAbility,
    #[strum(serialize = "stress_resistance")]
    StressResistance,
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProfessionalKnowledge => "专业知识水平",
            Self::SkillMatching => "技能匹配度",
            Self::LanguageExpression => "语言表达能力",
            Self::LogicalThinking => "逻辑思维能力",
            Self::InnovationAbility => "创新能力",
            Self::StressResistance => "应变抗压能力",
        }
    }
}

/// Result of the plausibility check, serialized as `_validation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreValidation {
    pub validated: bool,
    pub overall_confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityScoreSet {
    pub professional_knowledge: f32,
    pub skill_matching: f32,
    pub language_expression: f32,
    pub logical_thinking: f32,
    pub innovation_ability: f32,
    pub stress_resistance: f32,
    #[serde(
        rename = "_validation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub validation: Option<ScoreValidation>,
}

impl CapabilityScoreSet {
    pub fn from_fn(mut f: impl FnMut(Capability) -> f32) -> Self {
        Self {
            professional_knowledge: f(Capability::ProfessionalKnowledge),
            skill_matching: f(Capability::SkillMatching),
            language_expression: f(Capability::LanguageExpression),
            logical_thinking: f(Capability::LogicalThinking),
            innovation_ability: f(Capability::InnovationAbility),
            stress_resistance: f(Capability::StressResistance),
            validation: None,
        }
    }

    pub fn get(&self, capability: Capability) -> f32 {
        match capability {
            Capability::ProfessionalKnowledge => self.professional_knowledge,
            Capability::SkillMatching => self.skill_matching,
            Capability::LanguageExpression => self.language_expression,
            Capability::LogicalThinking => self.logical_thinking,
            Capability::InnovationAbility => self.innovation_ability,
            Capability::StressResistance => self.stress_resistance,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, f32)> + '_ {
        Capability::iter().map(move |c| (c, self.get(c)))
    }

    pub fn average(&self) -> f32 {
        let count = Capability::iter().count() as f32;
        self.iter().map(|(_, score)| score).sum::<f32>() / count
    }

    pub fn is_validated(&self) -> bool {
        self.validation.as_ref().map_or(true, |v| v.validated)
    }
}

/// Lexical features the six formulas read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSignals {
    pub domain_terms: Vec<String>,
    pub total_domain_terms: usize,
    pub text_length: usize,
    pub word_count: usize,
    pub connectives: Vec<String>,
    pub innovation_terms: Vec<String>,
}

fn owned(terms: Vec<&str>) -> Vec<String> {
    terms.into_iter().map(String::from).collect()
}

pub fn extract_signals(text: &str, domain: &str, vocabulary: &Vocabulary) -> ScoreSignals {
    let table = vocabulary.terms_for(domain);

    ScoreSignals {
        domain_terms: owned(matched_terms(text, table)),
        total_domain_terms: table.len(),
        text_length: text_length(text),
        word_count: word_count(text),
        connectives: owned(matched_terms(text, &vocabulary.connectives)),
        innovation_terms: owned(matched_terms(text, &vocabulary.innovation_terms)),
    }
}

fn clamp_score(value: f32) -> f32 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}

pub fn score_from_signals(signals: &ScoreSignals, config: &Scoring) -> CapabilityScoreSet {
    let hits = signals.domain_terms.len() as f32;
    let length = signals.text_length as f32;

    let coverage = if signals.total_domain_terms == 0 {
        0.0
    } else {
        hits / signals.total_domain_terms as f32
    };

    let per_point = |divisor: f32| if divisor > 0.0 { length / divisor } else { 0.0 };

    CapabilityScoreSet::from_fn(|capability| {
        let raw = match capability {
            Capability::ProfessionalKnowledge => {
                coverage * config.professional_coverage_weight + config.professional_base
            }
            Capability::SkillMatching => hits * config.skill_per_term + config.skill_base,
            Capability::LanguageExpression => {
                per_point(config.language_chars_per_point) + config.language_base
            }
            Capability::LogicalThinking => {
                signals.connectives.len() as f32 * config.logic_per_connective + config.logic_base
            }
            Capability::InnovationAbility => {
                signals.innovation_terms.len() as f32 * config.innovation_per_term
                    + config.innovation_base
            }
            Capability::StressResistance => {
                config.stress_base + per_point(config.stress_chars_per_point)
            }
        };
        clamp_score(raw)
    })
}

/// Six independent scores; no plausibility annotation.
pub fn score(text: &str, domain: &str, settings: &Settings) -> CapabilityScoreSet {
    let signals = extract_signals(text, domain, &settings.vocabulary);
    score_from_signals(&signals, &settings.scoring)
}

pub fn check_plausibility(
    scores: &CapabilityScoreSet,
    quality: &QualityReport,
    domain: &str,
    config: &Plausibility,
) -> ScoreValidation {
    let average = scores.average();
    let term_count = quality.technical_terms.len();

    let reason = if quality.word_count < config.min_words {
        Some(format!(
            "answer has {} words, too short to support capability scores",
            quality.word_count
        ))
    } else if average >= config.high_average && term_count < config.min_terms_for_high_average {
        Some(format!(
            "average {:.1} is implausibly high with {} technical terms for domain {}",
            average, term_count, domain
        ))
    } else {
        None
    };

    ScoreValidation {
        validated: reason.is_none(),
        overall_confidence: quality.confidence_score,
        reason,
    }
}

/// Scores plus the `_validation` annotation.
pub fn score_capabilities(text: &str, domain: &str, settings: &Settings) -> CapabilityScoreSet {
    let mut scores = score(text, domain, settings);
    let quality = analyze_quality_for(text, domain, &settings.vocabulary, &settings.quality);
    let validation = check_plausibility(&scores, &quality, domain, &settings.scoring.plausibility);

    if let Some(reason) = &validation.reason {
        tracing::warn!(%domain, %reason, "capability scores failed plausibility check");
    }

    scores.validation = Some(validation);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn assert_bounded(scores: &CapabilityScoreSet) {
        for (capability, value) in scores.iter() {
            assert!(
                (MIN_SCORE..=MAX_SCORE).contains(&value),
                "{capability} out of range: {value}"
            );
        }
    }

    #[test]
    fn test_ai_domain_coverage_scenario() {
        let text = "首先，我会用机器学习方法建立一个基线；然后，引入深度学习模型，\
            用神经网络自动提取特征；最后，对比两者的效果并选择上线方案。";
        let scores = score_capabilities(text, "人工智能", &settings());
        assert_bounded(&scores);
        assert!(scores.average() >= 70.0, "average {}", scores.average());
        assert_eq!(scores.skill_matching, 100.0);
        assert_eq!(scores.logical_thinking, 100.0);
        assert!((scores.professional_knowledge - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_formula_baselines_for_empty_text() {
        let scores = score("", "人工智能", &settings());
        assert_eq!(scores.professional_knowledge, 50.0);
        assert_eq!(scores.skill_matching, 60.0);
        assert_eq!(scores.language_expression, 70.0);
        assert_eq!(scores.logical_thinking, 65.0);
        assert_eq!(scores.innovation_ability, 60.0);
        assert_eq!(scores.stress_resistance, 75.0);
    }

    #[test]
    fn test_scores_bounded_for_extreme_input() {
        let s = settings();
        let huge = "首先然后最后因此创新突破改进机器学习深度学习神经网络".repeat(5000);
        for text in ["", " ", "\u{0}", huge.as_str()] {
            for domain in ["人工智能", "AI", "大数据", "未知领域", ""] {
                assert_bounded(&score_capabilities(text, domain, &s));
            }
        }
    }

    #[test]
    fn test_score_capabilities_is_idempotent() {
        let s = settings();
        let text = "我们使用 Spark 和 Kafka 构建实时计算平台，因此延迟降低了很多。";
        assert_eq!(
            score_capabilities(text, "大数据", &s),
            score_capabilities(text, "大数据", &s)
        );
    }

    #[test]
    fn test_unknown_domain_uses_default_vocabulary() {
        let s = settings();
        let text = "我熟悉数据库和缓存的设计";
        let scores = score(text, "区块链", &s);
        let total = s.vocabulary.default_terms.len() as f32;
        assert!((scores.professional_knowledge - (2.0 / total * 100.0 + 50.0)).abs() < 0.01);
        assert_eq!(scores.skill_matching, 90.0);
    }

    #[test]
    fn test_domain_aliases_share_vocabulary() {
        let s = settings();
        let text = "神经网络和强化学习";
        assert_eq!(score(text, "AI", &s), score(text, "人工智能", &s));
    }

    #[test]
    fn test_short_answer_fails_plausibility() {
        let scores = score_capabilities("好的", "人工智能", &settings());
        let validation = scores.validation.clone().unwrap();
        assert!(!validation.validated);
        assert!(validation.reason.unwrap().contains("too short"));
        assert!(!scores.is_validated());
    }

    #[test]
    fn test_high_average_without_terms_fails_plausibility() {
        let text = "机器学习和深度学习。首先然后最后，因此要创新、突破、改进。".to_string()
            + &"很好".repeat(700);
        let scores = score_capabilities(&text, "人工智能", &settings());
        assert!(scores.average() >= 85.0);
        let validation = scores.validation.unwrap();
        assert!(!validation.validated);
        assert!(validation.reason.unwrap().contains("implausibly high"));
    }

    #[test]
    fn test_validation_serialized_with_underscore() {
        let text = "首先介绍机器学习的基本概念，然后讲深度学习。";
        let scores = score_capabilities(text, "人工智能", &settings());
        let json = serde_json::to_value(&scores).unwrap();
        assert!(json.get("_validation").is_some());
        assert!(json["_validation"]["validated"].as_bool().unwrap());
        assert!(json.get("professional_knowledge").is_some());

        let bare = score(text, "人工智能", &settings());
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("_validation").is_none());
    }
}
