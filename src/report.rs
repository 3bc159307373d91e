use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::interview::TurnRecord;
use crate::scoring::{Capability, CapabilityScoreSet, ResponseCategory};
use crate::settings::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    #[strum(serialize = "优秀")]
    Excellent,
    #[strum(serialize = "良好")]
    Good,
    #[strum(serialize = "合格")]
    Pass,
    #[strum(serialize = "待提高")]
    NeedsImprovement,
}

impl PerformanceLevel {
    pub fn from_score(score: f32, thresholds: &Report) -> Self {
        if score >= thresholds.excellent {
            PerformanceLevel::Excellent
        } else if score >= thresholds.good {
            PerformanceLevel::Good
        } else if score >= thresholds.pass {
            PerformanceLevel::Pass
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub confident_answer: usize,
    pub partial_knowledge: usize,
    pub express_unknown: usize,
    pub request_answer: usize,
}

impl CategoryCounts {
    fn record(&mut self, category: ResponseCategory) {
        match category {
            ResponseCategory::ConfidentAnswer => self.confident_answer += 1,
            ResponseCategory::PartialKnowledge => self.partial_knowledge += 1,
            ResponseCategory::ExpressUnknown => self.express_unknown += 1,
            ResponseCategory::RequestAnswer => self.request_answer += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub question: String,
    pub category: ResponseCategory,
    pub average: f32,
    pub keyword_coverage: f32,
    pub is_follow_up: bool,
    pub validated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewReport {
    pub domain: String,
    pub position: String,
    pub generated_at: DateTime<Utc>,
    pub answered: usize,
    pub averages: CapabilityScoreSet,
    pub overall: f32,
    pub level: PerformanceLevel,
    pub strengths: Vec<Capability>,
    pub weaknesses: Vec<Capability>,
    pub categories: CategoryCounts,
    pub corrected_misjudgments: usize,
    pub unvalidated_answers: usize,
    pub turns: Vec<TurnSummary>,
}

impl InterviewReport {
    pub fn from_turns(domain: &str, position: &str, turns: &[TurnRecord], config: &Report) -> Self {
        let averages = if turns.is_empty() {
            CapabilityScoreSet::default()
        } else {
            let count = turns.len() as f32;
            CapabilityScoreSet::from_fn(|capability| {
                turns
                    .iter()
                    .map(|t| t.evaluation.scores.get(capability))
                    .sum::<f32>()
                    / count
            })
        };
        let overall = averages.average();

        let mut ranked: Vec<(Capability, f32)> = averages.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let highlight = config.highlight_count.min(ranked.len());
        let (strengths, weaknesses) = if turns.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (
                ranked.iter().take(highlight).map(|(c, _)| *c).collect(),
                ranked.iter().rev().take(highlight).map(|(c, _)| *c).collect(),
            )
        };

        let mut categories = CategoryCounts::default();
        for turn in turns {
            categories.record(turn.evaluation.classification.category);
        }

        InterviewReport {
            domain: domain.to_string(),
            position: position.to_string(),
            generated_at: Utc::now(),
            answered: turns.len(),
            overall,
            level: PerformanceLevel::from_score(overall, config),
            strengths,
            weaknesses,
            categories,
            corrected_misjudgments: turns
                .iter()
                .filter(|t| t.evaluation.classification.misjudgment_corrected)
                .count(),
            unvalidated_answers: turns
                .iter()
                .filter(|t| !t.evaluation.scores.is_validated())
                .count(),
            turns: turns.iter().map(summarize).collect(),
            averages,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn summarize(turn: &TurnRecord) -> TurnSummary {
    TurnSummary {
        question: turn.question.clone(),
        category: turn.evaluation.classification.category,
        average: turn.evaluation.scores.average(),
        keyword_coverage: turn.keyword_coverage,
        is_follow_up: turn.is_follow_up,
        validated: turn.evaluation.scores.is_validated(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{Difficulty, Question, QuestionType};
    use crate::interview::InterviewSession;
    use crate::scoring::Evaluator;
    use crate::settings::Settings;

    fn thresholds() -> Report {
        Settings::default().report
    }

    #[test]
    fn test_performance_levels() {
        let t = thresholds();
        assert_eq!(PerformanceLevel::from_score(90.0, &t), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_score(80.0, &t), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_score(60.0, &t), PerformanceLevel::Pass);
        assert_eq!(
            PerformanceLevel::from_score(10.0, &t),
            PerformanceLevel::NeedsImprovement
        );
    }

    #[test]
    fn test_empty_report() {
        let report = InterviewReport::from_turns("人工智能", "技术岗", &[], &thresholds());
        assert_eq!(report.answered, 0);
        assert_eq!(report.overall, 0.0);
        assert!(report.strengths.is_empty());
        assert!(report.weaknesses.is_empty());
        assert_eq!(report.level, PerformanceLevel::NeedsImprovement);
    }

    #[test]
    fn test_report_from_session() {
        let evaluator = Evaluator::default();
        let questions = vec![
            Question::new(
                "请介绍你用过的机器学习方法。",
                QuestionType::Technical,
                Difficulty::Easy,
                &["机器学习"],
                &["方法与场景"],
            ),
            Question::new(
                "什么是注意力机制？",
                QuestionType::Technical,
                Difficulty::Medium,
                &["注意力机制"],
                &["Q/K/V"],
            ),
        ];
        let mut session =
            InterviewSession::with_questions("人工智能".into(), "技术岗".into(), questions);

        session
            .submit_answer(
                &evaluator,
                "首先我用机器学习做特征工程，然后用深度学习训练神经网络，最后做了创新的改进。",
            )
            .unwrap();
        session.submit_answer(&evaluator, "我不知道").unwrap();
        assert!(session.is_finished());

        let report = session.report(&evaluator);
        assert_eq!(report.answered, 2);
        assert_eq!(report.categories.confident_answer, 1);
        assert_eq!(report.categories.express_unknown, 1);
        assert_eq!(report.unvalidated_answers, 1);
        assert_eq!(report.strengths.len(), 2);
        assert_eq!(report.weaknesses.len(), 2);
        assert_eq!(report.weaknesses[0], Capability::ProfessionalKnowledge);

        let first = session.turns()[0].evaluation.scores.average();
        let second = session.turns()[1].evaluation.scores.average();
        assert!((report.overall - (first + second) / 2.0).abs() < 0.01);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"level\""));
        assert!(json.contains("express_unknown"));
    }
}
