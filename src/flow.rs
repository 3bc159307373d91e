use rand::seq::IndexedRandom;
use rand::Rng;

use crate::bank::{Question, QuestionBank};
use crate::settings::{Flow, FlowSlot, Settings, Vocabulary};

/// A fallback step: does `question` satisfy `slot` at this level of strictness?
pub type Strategy = fn(&Question, &FlowSlot) -> bool;

pub fn exact_match(question: &Question, slot: &FlowSlot) -> bool {
    question.question_type == slot.question_type && question.difficulty == slot.difficulty
}

pub fn same_type(question: &Question, slot: &FlowSlot) -> bool {
    question.question_type == slot.question_type
}

pub fn any_question(_: &Question, _: &FlowSlot) -> bool {
    true
}

/// Strictest first.
pub const STRATEGIES: &[Strategy] = &[exact_match, same_type, any_question];

pub struct FlowSelector<'a> {
    bank: &'a QuestionBank,
    flow: &'a Flow,
    vocabulary: &'a Vocabulary,
}

impl<'a> FlowSelector<'a> {
    pub fn new(bank: &'a QuestionBank, settings: &'a Settings) -> Self {
        Self {
            bank,
            flow: &settings.flow,
            vocabulary: &settings.vocabulary,
        }
    }

    /// Slots for a domain or any of its aliases.
    pub fn schedule(&self, domain: &str, position: &str) -> &'a [FlowSlot] {
        let domain = self.vocabulary.canonical_domain(domain);
        self.flow.schedule(&domain, position)
    }

    /// One question per schedule slot. Repeats only once every candidate has
    /// been used.
    pub fn select<R: Rng + ?Sized>(
        &self,
        domain: &str,
        position: &str,
        rng: &mut R,
    ) -> Vec<Question> {
        let domain = self.vocabulary.canonical_domain(domain);
        let position = position.trim();
        let pool = self.bank.pool(&domain, position);
        let mut used: Vec<&str> = Vec::new();
        let mut selected = Vec::new();

        for slot in self.flow.schedule(&domain, position) {
            let Some(question) = pick(&pool, slot, &used, rng) else {
                tracing::warn!(%domain, %position, "question bank is empty, schedule cut short");
                break;
            };
            used.push(question.text.as_str());
            selected.push(question.clone());
        }

        selected
    }
}

fn choose_with<'q, R: Rng + ?Sized>(
    pool: &[&'q Question],
    slot: &FlowSlot,
    strategy: Strategy,
    allow: impl Fn(&Question) -> bool,
    rng: &mut R,
) -> Option<&'q Question> {
    let candidates: Vec<&'q Question> = pool
        .iter()
        .copied()
        .filter(|q| allow(q) && strategy(q, slot))
        .collect();
    candidates.choose(rng).copied()
}

/// Runs the strategy chain over unused questions, then again allowing repeats.
pub fn pick<'q, R: Rng + ?Sized>(
    pool: &[&'q Question],
    slot: &FlowSlot,
    used: &[&str],
    rng: &mut R,
) -> Option<&'q Question> {
    let unused = |q: &Question| !used.contains(&q.text.as_str());

    STRATEGIES
        .iter()
        .find_map(|strategy| choose_with(pool, slot, *strategy, unused, rng))
        .or_else(|| {
            STRATEGIES
                .iter()
                .find_map(|strategy| choose_with(pool, slot, *strategy, |_| true, rng))
        })
}
