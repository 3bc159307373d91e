use console::{measure_text_width, Style};

use crate::bank::Question;
use crate::interview::{NextStep, TurnOutcome};
use crate::report::{InterviewReport, PerformanceLevel};
use crate::scoring::{
    AnswerEvaluation, Capability, CapabilityScoreSet, QualityReport, ResponseCategory, ScoreSignals,
};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const BAR_WIDTH: usize = 20;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_prefix(is_last: bool) -> String {
    if is_last {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn interview_prefix() -> String {
    magenta().apply_to("[INTERVIEW]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

/// Fixed-width text bar for a 0-100 score.
pub fn score_bar(score: f32) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f32).round() as usize;
    format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        dim().apply_to("\u{2591}".repeat(BAR_WIDTH - filled))
    )
}

fn score_style(score: f32) -> Style {
    if score >= 85.0 {
        green()
    } else if score >= 70.0 {
        cyan()
    } else if score >= 60.0 {
        yellow()
    } else {
        red()
    }
}

fn category_style(category: ResponseCategory) -> Style {
    match category {
        ResponseCategory::ConfidentAnswer => green(),
        ResponseCategory::PartialKnowledge => yellow(),
        ResponseCategory::ExpressUnknown => red(),
        ResponseCategory::RequestAnswer => magenta(),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_chars {
        format!(
            "{}...",
            flat.chars().take(max_chars.saturating_sub(3)).collect::<String>()
        )
    } else {
        flat
    }
}

fn capability_names(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn log_startup_config(domain: &str, position: &str, bank_source: &str, questions: usize) {
    println!(
        "{} interview for {} / {}",
        init_prefix(),
        cyan().apply_to(domain),
        cyan().apply_to(position)
    );
    println!(
        "{} question bank: {} ({} questions planned)",
        init_prefix(),
        dim().apply_to(bank_source),
        bold().apply_to(questions)
    );
}

pub fn log_question(index: usize, total: usize, question: &Question) {
    println!();
    println!(
        "{} {}{} {}",
        interview_prefix(),
        bold().apply_to(index + 1),
        dim().apply_to(format!("/{total}")),
        dim().apply_to(format!("[{} / {}]", question.question_type, question.difficulty))
    );
    println!("{}{}", tree_end(), bold().apply_to(&question.text));
}

pub fn log_follow_up(prompt: &str) {
    println!("{}{}", tree_end(), yellow().apply_to(prompt));
}

pub fn log_generic_error(prefix: &str, message: &str) {
    eprintln!("{} {}", red().apply_to(prefix), message);
}

pub fn log_report_saved(path: &str) {
    println!("{} report written to {}", interview_prefix(), cyan().apply_to(path));
}

fn push_scores(lines: &mut Vec<String>, scores: &CapabilityScoreSet, depth: usize) {
    let rows: Vec<_> = scores.iter().collect();
    let indent = tree_indent().repeat(depth.saturating_sub(1));
    for (i, (capability, score)) in rows.iter().enumerate() {
        lines.push(format!(
            "{}{}{} {} {}",
            indent,
            tree_prefix(i == rows.len() - 1),
            pad_label(capability.label(), depth),
            score_bar(*score),
            score_style(*score).apply_to(format!("{score:.1}"))
        ));
    }
}

fn push_validation(lines: &mut Vec<String>, scores: &CapabilityScoreSet) {
    let Some(validation) = &scores.validation else {
        return;
    };
    let status = if validation.validated {
        green().apply_to("validated").to_string()
    } else {
        red().apply_to("unvalidated").to_string()
    };
    let last_is_reason = validation.reason.is_some();
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("status", 1),
        status
    ));
    lines.push(format!(
        "{}{} {}",
        tree_prefix(!last_is_reason),
        pad_label("confidence", 1),
        dim().apply_to(format!("{:.0}%", validation.overall_confidence * 100.0))
    ));
    if let Some(reason) = &validation.reason {
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("reason", 1),
            yellow().apply_to(reason)
        ));
    }
}

fn push_classification(lines: &mut Vec<String>, evaluation: &AnswerEvaluation) {
    let initial = &evaluation.initial;
    let result = &evaluation.classification;

    lines.push(format!("{}", bold().apply_to("CLASSIFICATION")));
    lines.push(format!(
        "{}{} {} {}",
        tree_branch(),
        pad_label("initial", 1),
        category_style(initial.category).apply_to(initial.category),
        dim().apply_to(format!("({:.0}%)", initial.confidence * 100.0))
    ));
    let matched = if initial.signals.matched.is_empty() {
        dim().apply_to("none".to_string()).to_string()
    } else {
        initial.signals.matched.join(", ")
    };
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("signals", 1),
        matched
    ));
    lines.push(format!(
        "{}{} {} {}{}",
        tree_end(),
        pad_label("final", 1),
        category_style(result.category).apply_to(result.category),
        dim().apply_to(format!("({:.0}%)", result.confidence * 100.0)),
        if result.misjudgment_corrected {
            format!(" {}", yellow().apply_to("corrected"))
        } else {
            String::new()
        }
    ));
}

fn push_quality(lines: &mut Vec<String>, quality: &QualityReport) {
    lines.push(format!("{}", bold().apply_to("QUALITY")));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("words", 1),
        dim().apply_to(quality.word_count)
    ));
    let terms = if quality.technical_terms.is_empty() {
        dim().apply_to("none".to_string()).to_string()
    } else {
        quality.technical_terms.join(", ")
    };
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("technical terms", 1),
        terms
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("density", 1),
        dim().apply_to(format!("{:.3}", quality.technical_density))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("confidence", 1),
        dim().apply_to(format!("{:.0}%", quality.confidence_score * 100.0))
    ));
}

pub fn log_turn(outcome: &TurnOutcome) {
    let record = &outcome.record;
    let evaluation = &record.evaluation;
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} \"{}\"",
        magenta().apply_to(bold().apply_to("[ANSWER]")),
        dim().apply_to(preview(&record.answer, 60))
    ));
    lines.push(String::new());
    push_classification(&mut lines, evaluation);

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SCORES")));
    push_scores(&mut lines, &evaluation.scores, 1);
    lines.push(format!(
        "{}{} {}",
        dim().apply_to(" ".repeat(TREE_PREFIX_WIDTH)),
        pad_label("keyword coverage", 1),
        dim().apply_to(format!("{:.0}%", record.keyword_coverage * 100.0))
    ));

    println!("{}\n", lines.join("\n"));
}

pub fn log_next_step(step: &NextStep) {
    match step {
        NextStep::FollowUp { prompt } => log_follow_up(prompt),
        NextStep::Hint { hint, .. } => {
            println!("{}{} {}", tree_end(), yellow().apply_to("hint:"), hint);
        }
        NextStep::RevealAnswer {
            expected_points, ..
        } => {
            println!("{}", bold().apply_to("EXPECTED POINTS"));
            for (i, point) in expected_points.iter().enumerate() {
                println!("{}{}", tree_prefix(i == expected_points.len() - 1), point);
            }
        }
        NextStep::Next { .. } => {}
        NextStep::Finished => {
            println!("{} all questions answered.", interview_prefix());
        }
    }
}

/// Full breakdown for a single answer, used by `score-answer`.
pub fn log_answer_assessment(
    text: &str,
    domain: &str,
    evaluation: &AnswerEvaluation,
    quality: &QualityReport,
    signals: &ScoreSignals,
) {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} \"{}\" {}",
        magenta().apply_to(bold().apply_to("[ANSWER ASSESSMENT]")),
        dim().apply_to(preview(text, 60)),
        cyan().apply_to(format!("({domain})"))
    ));

    lines.push(String::new());
    push_classification(&mut lines, evaluation);

    lines.push(String::new());
    push_quality(&mut lines, quality);

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SIGNALS")));
    lines.push(format!(
        "{}{} {}{}",
        tree_branch(),
        pad_label("domain terms", 1),
        bold().apply_to(signals.domain_terms.len()),
        dim().apply_to(format!("/{}", signals.total_domain_terms))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("connectives", 1),
        dim().apply_to(signals.connectives.join(", "))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("innovation", 1),
        dim().apply_to(signals.innovation_terms.join(", "))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("length", 1),
        dim().apply_to(signals.text_length)
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SCORES")));
    push_scores(&mut lines, &evaluation.scores, 1);

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("VALIDATION")));
    push_validation(&mut lines, &evaluation.scores);

    println!("{}\n", lines.join("\n"));
}

pub fn log_report(report: &InterviewReport) {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} {} / {}",
        magenta().apply_to(bold().apply_to("[INTERVIEW REPORT]")),
        cyan().apply_to(&report.domain),
        cyan().apply_to(&report.position)
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("CAPABILITIES")));
    push_scores(&mut lines, &report.averages, 1);

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SUMMARY")));
    let level_style = match report.level {
        PerformanceLevel::Excellent => green().bold(),
        PerformanceLevel::Good => cyan().bold(),
        PerformanceLevel::Pass => yellow().bold(),
        PerformanceLevel::NeedsImprovement => red().bold(),
    };
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("answers", 1),
        bold().apply_to(report.answered)
    ));
    lines.push(format!(
        "{}{} {} {}",
        tree_branch(),
        pad_label("overall", 1),
        score_style(report.overall).apply_to(format!("{:.1}", report.overall)),
        level_style.apply_to(report.level)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("strengths", 1),
        green().apply_to(capability_names(&report.strengths))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("weaknesses", 1),
        yellow().apply_to(capability_names(&report.weaknesses))
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("corrected", 1),
        dim().apply_to(report.corrected_misjudgments)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("unvalidated", 1),
        dim().apply_to(report.unvalidated_answers)
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("ANSWERS")));
    let count = report.turns.len();
    if count == 0 {
        lines.push(format!("{}{}", tree_end(), dim().apply_to("none")));
    }
    for (i, turn) in report.turns.iter().enumerate() {
        let label = if turn.is_follow_up {
            format!("  follow-up {}", i + 1)
        } else {
            format!("#{}", i + 1)
        };
        lines.push(format!(
            "{}{} {} {}",
            tree_prefix(i == count - 1),
            pad_label(&label, 1),
            category_style(turn.category).apply_to(turn.category),
            score_style(turn.average).apply_to(format!("{:.1}", turn.average))
        ));
    }

    println!("{}\n", lines.join("\n"));
}
