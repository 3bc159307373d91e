pub mod capability;
mod classification;
mod quality;
mod validator;
pub mod vocabulary;

pub use capability::{
    check_plausibility, extract_signals, score, score_capabilities, score_from_signals,
    Capability, CapabilityScoreSet, ScoreSignals, ScoreValidation,
};
pub use classification::{classify, CategorySignals, ClassificationResult, ResponseCategory};
pub use quality::{analyze_quality, analyze_quality_for, QualityReport};
pub use validator::{validate, ValidationOutcome};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedClassification {
    pub category: ResponseCategory,
    pub confidence: f32,
    pub misjudgment_corrected: bool,
}

/// Everything the evaluator learned about one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub initial: ClassificationResult,
    pub validation: ValidationOutcome,
    pub classification: ValidatedClassification,
    pub scores: CapabilityScoreSet,
}

/// Holds the immutable settings. Cheap to clone and safe to share between
/// threads.
#[derive(Debug, Clone)]
pub struct Evaluator {
    settings: Arc<Settings>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Arc::new(Settings::default()))
    }
}

impl Evaluator {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        classify(text, &self.settings.classifier)
    }

    pub fn analyze_quality(&self, text: &str) -> QualityReport {
        analyze_quality(text, &self.settings.vocabulary, &self.settings.quality)
    }

    pub fn validate(
        &self,
        text: &str,
        initial: ResponseCategory,
        domain: &str,
    ) -> ValidationOutcome {
        validate(text, initial, domain, &self.settings)
    }

    pub fn classify_and_validate(&self, text: &str, domain: &str) -> ValidatedClassification {
        let initial = self.classify(text);
        let outcome = self.validate(text, initial.category, domain);
        merge_classification(&initial, &outcome)
    }

    pub fn score_capabilities(&self, text: &str, domain: &str) -> CapabilityScoreSet {
        score_capabilities(text, domain, &self.settings)
    }

    pub fn evaluate(&self, text: &str, domain: &str) -> AnswerEvaluation {
        let initial = self.classify(text);
        let validation = self.validate(text, initial.category, domain);
        let classification = merge_classification(&initial, &validation);
        let scores = self.score_capabilities(text, domain);

        tracing::debug!(
            category = %classification.category,
            confidence = classification.confidence,
            average = scores.average(),
            "evaluated answer"
        );

        AnswerEvaluation {
            initial,
            validation,
            classification,
            scores,
        }
    }
}

fn merge_classification(
    initial: &ClassificationResult,
    outcome: &ValidationOutcome,
) -> ValidatedClassification {
    if outcome.potential_misjudgment {
        tracing::info!(
            from = %initial.category,
            to = %outcome.final_classification,
            confidence = outcome.confidence,
            density = outcome.quality.technical_density,
            "corrected misjudged classification"
        );
        ValidatedClassification {
            category: outcome.final_classification,
            confidence: outcome.confidence,
            misjudgment_corrected: true,
        }
    } else {
        ValidatedClassification {
            category: initial.category,
            confidence: initial.confidence,
            misjudgment_corrected: false,
        }
    }
}
