use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bank::{Question, QuestionBank};
use crate::flow::FlowSelector;
use crate::report::InterviewReport;
use crate::scoring::vocabulary::{contains_term, normalize};
use crate::scoring::{AnswerEvaluation, Evaluator, ResponseCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextStep {
    /// Probe the same question again.
    FollowUp { prompt: String },
    /// Hint at the expected answer, then move on.
    Hint { hint: String, next: Option<Question> },
    /// Show the expected points, then move on.
    RevealAnswer {
        expected_points: Vec<String>,
        next: Option<Question>,
    },
    Next { question: Question },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub question_index: usize,
    pub question: String,
    pub answer: String,
    pub is_follow_up: bool,
    pub keyword_coverage: f32,
    pub covered_keywords: Vec<String>,
    pub evaluation: AnswerEvaluation,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub record: TurnRecord,
    pub next: NextStep,
}

/// Share of the question's keywords mentioned in the answer.
pub fn keyword_coverage(answer: &str, keywords: &[String]) -> (f32, Vec<String>) {
    if keywords.is_empty() {
        return (0.0, Vec::new());
    }
    let answer_lower = normalize(answer);
    let covered: Vec<String> = keywords
        .iter()
        .filter(|k| contains_term(&answer_lower, k))
        .cloned()
        .collect();
    (covered.len() as f32 / keywords.len() as f32, covered)
}

pub struct InterviewSession {
    domain: String,
    position: String,
    questions: Vec<Question>,
    current: usize,
    follow_ups: usize,
    turns: Vec<TurnRecord>,
}

impl InterviewSession {
    pub fn plan<R: Rng + ?Sized>(
        evaluator: &Evaluator,
        bank: &QuestionBank,
        domain: &str,
        position: &str,
        rng: &mut R,
    ) -> Self {
        let settings = evaluator.settings();
        let domain = settings.vocabulary.canonical_domain(domain);
        let position = position.trim().to_string();
        let questions = FlowSelector::new(bank, settings).select(&domain, &position, rng);

        tracing::info!(%domain, %position, questions = questions.len(), "planned interview");

        Self::with_questions(domain, position, questions)
    }

    pub fn with_questions(domain: String, position: String, questions: Vec<Question>) -> Self {
        Self {
            domain,
            position,
            questions,
            current: 0,
            follow_ups: 0,
            turns: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.current.min(self.questions.len()), self.questions.len())
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn submit_answer(&mut self, evaluator: &Evaluator, answer: &str) -> Result<TurnOutcome> {
        let Some(question) = self.current_question().cloned() else {
            bail!("interview already finished, no question to answer");
        };

        let evaluation = evaluator.evaluate(answer, &self.domain);
        let (coverage, covered) = keyword_coverage(answer, &question.keywords);
        let category = evaluation.classification.category;

        let record = TurnRecord {
            question_index: self.current,
            question: question.text.clone(),
            answer: answer.to_string(),
            is_follow_up: self.follow_ups > 0,
            keyword_coverage: coverage,
            covered_keywords: covered.clone(),
            evaluation,
            answered_at: Utc::now(),
        };
        self.turns.push(record.clone());

        let max_follow_ups = evaluator.settings().interview.max_follow_ups;
        let next = match category {
            ResponseCategory::PartialKnowledge if self.follow_ups < max_follow_ups => {
                self.follow_ups += 1;
                NextStep::FollowUp {
                    prompt: follow_up_prompt(&question, &covered),
                }
            }
            ResponseCategory::ExpressUnknown => {
                let hint = question
                    .expected_points
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "可以从基本概念和实际应用两方面思考".to_string());
                let next = self.advance();
                NextStep::Hint { hint, next }
            }
            ResponseCategory::RequestAnswer => {
                let expected_points = question.expected_points.clone();
                let next = self.advance();
                NextStep::RevealAnswer {
                    expected_points,
                    next,
                }
            }
            _ => match self.advance() {
                Some(question) => NextStep::Next { question },
                None => NextStep::Finished,
            },
        };

        Ok(TurnOutcome { record, next })
    }

    fn advance(&mut self) -> Option<Question> {
        self.current += 1;
        self.follow_ups = 0;
        self.current_question().cloned()
    }

    pub fn report(&self, evaluator: &Evaluator) -> InterviewReport {
        InterviewReport::from_turns(
            &self.domain,
            &self.position,
            &self.turns,
            &evaluator.settings().report,
        )
    }
}

fn follow_up_prompt(question: &Question, covered: &[String]) -> String {
    let missing: Vec<&str> = question
        .keywords
        .iter()
        .filter(|k| !covered.contains(k))
        .map(|k| k.as_str())
        .collect();

    if missing.is_empty() {
        "你的思路基本正确，能结合一个具体的项目例子再展开说明吗？".to_string()
    } else {
        format!(
            "你提到了一部分要点，能再具体谈谈{}吗？",
            missing.join("、")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{Difficulty, QuestionType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session_with(questions: Vec<Question>) -> InterviewSession {
        InterviewSession::with_questions("人工智能".into(), "技术岗".into(), questions)
    }

    fn overfitting() -> Question {
        Question::new(
            "请解释过拟合及其缓解方法。",
            QuestionType::Technical,
            Difficulty::Easy,
            &["过拟合", "正则化", "验证集"],
            &["训练集好测试集差", "正则化与早停"],
        )
    }

    fn attention() -> Question {
        Question::new(
            "注意力机制如何工作？",
            QuestionType::Technical,
            Difficulty::Medium,
            &["注意力机制"],
            &["Q/K/V 相似度加权"],
        )
    }

    #[test]
    fn test_keyword_coverage() {
        let keywords = vec!["过拟合".to_string(), "正则化".to_string(), "dropout".to_string()];
        let (coverage, covered) = keyword_coverage("用 Dropout 和正则化处理", &keywords);
        assert!((coverage - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(covered, vec!["正则化".to_string(), "dropout".to_string()]);
        assert_eq!(keyword_coverage("任何回答", &[]).0, 0.0);
    }

    #[test]
    fn test_plan_ai_interview() {
        let evaluator = Evaluator::default();
        let bank = QuestionBank::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let session = InterviewSession::plan(&evaluator, &bank, "AI", "技术岗", &mut rng);
        assert_eq!(session.domain(), "人工智能");
        assert_eq!(session.questions().len(), 5);
        assert_eq!(session.progress(), (0, 5));
    }

    #[test]
    fn test_confident_answer_advances() {
        let evaluator = Evaluator::default();
        let mut session = session_with(vec![overfitting(), attention()]);

        let outcome = session
            .submit_answer(
                &evaluator,
                "过拟合是模型在训练集上表现好、在验证集上表现差，可以用正则化和早停缓解。",
            )
            .unwrap();
        assert_eq!(
            outcome.record.evaluation.classification.category,
            ResponseCategory::ConfidentAnswer
        );
        assert_eq!(outcome.record.keyword_coverage, 1.0);
        assert_eq!(
            outcome.next,
            NextStep::Next {
                question: attention()
            }
        );
        assert_eq!(session.progress(), (1, 2));
    }

    #[test]
    fn test_partial_answer_gets_single_follow_up() {
        let evaluator = Evaluator::default();
        let mut session = session_with(vec![overfitting()]);

        let first = session
            .submit_answer(&evaluator, "我记得过拟合应该是模型太复杂导致的")
            .unwrap();
        match &first.next {
            NextStep::FollowUp { prompt } => {
                assert!(prompt.contains("正则化"));
                assert!(prompt.contains("验证集"));
                assert!(!prompt.contains("过拟合"));
            }
            other => panic!("expected follow-up, got {other:?}"),
        }
        assert!(!first.record.is_follow_up);

        let second = session
            .submit_answer(&evaluator, "我记得好像是加正则化吧")
            .unwrap();
        assert!(second.record.is_follow_up);
        assert_eq!(second.next, NextStep::Finished);
        assert!(session.is_finished());
    }

    #[test]
    fn test_unknown_answer_gets_hint() {
        let evaluator = Evaluator::default();
        let mut session = session_with(vec![overfitting(), attention()]);

        let outcome = session.submit_answer(&evaluator, "我不知道").unwrap();
        assert_eq!(
            outcome.next,
            NextStep::Hint {
                hint: "训练集好测试集差".into(),
                next: Some(attention()),
            }
        );
    }

    #[test]
    fn test_request_answer_reveals_points() {
        let evaluator = Evaluator::default();
        let mut session = session_with(vec![attention()]);

        let outcome = session
            .submit_answer(&evaluator, "能直接告诉我答案吗")
            .unwrap();
        assert_eq!(
            outcome.next,
            NextStep::RevealAnswer {
                expected_points: vec!["Q/K/V 相似度加权".into()],
                next: None,
            }
        );
        assert!(session.is_finished());
    }

    #[test]
    fn test_submit_after_finish_errors() {
        let evaluator = Evaluator::default();
        let mut session = session_with(vec![]);
        assert!(session.is_finished());
        assert!(session.submit_answer(&evaluator, "答案").is_err());
    }

    #[test]
    fn test_next_step_serialization() {
        let json = serde_json::to_value(NextStep::FollowUp {
            prompt: "再说说".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "follow_up");
        assert_eq!(json["prompt"], "再说说");
    }
}
