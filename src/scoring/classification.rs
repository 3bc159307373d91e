use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator};

use super::vocabulary::{matched_phrases, normalize, visible_length};
use crate::settings::Classifier;

pub const GROUP_BASE_CONFIDENCE: f32 = 0.7;
pub const PARTIAL_BASE_CONFIDENCE: f32 = 0.6;
pub const CONFIDENCE_PER_EXTRA_HIT: f32 = 0.1;
pub const MAX_GROUP_CONFIDENCE: f32 = 0.95;
pub const CONFIDENT_BASE: f32 = 0.6;
pub const CONFIDENT_CHARS_PER_POINT: f32 = 400.0;
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    #[strum(serialize = "confident_answer")]
    ConfidentAnswer,
    #[strum(serialize = "partial_knowledge")]
    PartialKnowledge,
    #[strum(serialize = "express_unknown")]
    ExpressUnknown,
    #[strum(serialize = "request_answer")]
    RequestAnswer,
}

impl ResponseCategory {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl FromStr for ResponseCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter().find(|c| c.to_string() == s).ok_or(())
    }
}

/// Match counts per keyword group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySignals {
    pub unknown: usize,
    pub request: usize,
    pub partial: usize,
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: ResponseCategory,
    pub confidence: f32,
    pub signals: CategorySignals,
}

fn group_confidence(base: f32, hits: usize) -> f32 {
    (base + hits.saturating_sub(1) as f32 * CONFIDENCE_PER_EXTRA_HIT).min(MAX_GROUP_CONFIDENCE)
}

/// Unknown phrases win over request phrases, which win over hedges. Text
/// with no signal is a confident answer once it is long enough.
pub fn classify(text: &str, config: &Classifier) -> ClassificationResult {
    let text_lower = normalize(text);

    let unknown = matched_phrases(&text_lower, &config.unknown_phrases);
    let request = matched_phrases(&text_lower, &config.request_phrases);
    let partial = matched_phrases(&text_lower, &config.partial_phrases);

    let signals = CategorySignals {
        unknown: unknown.len(),
        request: request.len(),
        partial: partial.len(),
        matched: unknown
            .iter()
            .chain(request.iter())
            .chain(partial.iter())
            .map(|p| p.to_string())
            .collect(),
    };

    let (category, confidence) = if !unknown.is_empty() {
        (
            ResponseCategory::ExpressUnknown,
            group_confidence(GROUP_BASE_CONFIDENCE, unknown.len()),
        )
    } else if !request.is_empty() {
        (
            ResponseCategory::RequestAnswer,
            group_confidence(GROUP_BASE_CONFIDENCE, request.len()),
        )
    } else if !partial.is_empty() {
        (
            ResponseCategory::PartialKnowledge,
            group_confidence(PARTIAL_BASE_CONFIDENCE, partial.len()),
        )
    } else {
        let length = visible_length(text);
        if length >= config.min_confident_chars {
            let confidence = (CONFIDENT_BASE + length as f32 / CONFIDENT_CHARS_PER_POINT)
                .min(MAX_GROUP_CONFIDENCE);
            (ResponseCategory::ConfidentAnswer, confidence)
        } else {
            (ResponseCategory::ExpressUnknown, FALLBACK_CONFIDENCE)
        }
    };

    ClassificationResult {
        category,
        confidence,
        signals,
    }
}
