use interview_sim::scoring::{extract_signals, Evaluator};
use interview_sim::settings::Settings;
use interview_sim::utils::{log_answer_assessment, log_generic_error};
use std::env;
use std::process;
use std::sync::Arc;

fn print_usage() {
    eprintln!("Usage: score-answer <text> [--domain|-d <domain>] [--json]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <text>     Interview answer to score");
    eprintln!("  --domain   Interview domain, e.g. 人工智能, 大数据, 物联网 (default: 人工智能)");
    eprintln!("  --json     Print the evaluation as JSON instead of a tree");
}

struct Args {
    text: String,
    domain: String,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut domain = env::var("INTERVIEW_DOMAIN").unwrap_or_else(|_| "人工智能".to_string());
    let mut json = false;
    let mut words: Vec<&str> = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--domain" | "-d" => match iter.next() {
                Some(value) => domain = value.clone(),
                None => return Err(format!("{arg} expects a value")),
            },
            "--help" | "-h" => return Err(String::new()),
            other => words.push(other),
        }
    }

    if words.is_empty() {
        return Err(String::new());
    }

    Ok(Args {
        text: words.join(" "),
        domain,
        json,
    })
}

fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                log_generic_error("[ERROR]", &message);
            }
            print_usage();
            process::exit(1);
        }
    };

    let evaluator = Evaluator::new(Arc::new(Settings::load()));
    let domain = evaluator.settings().vocabulary.canonical_domain(&args.domain);
    let evaluation = evaluator.evaluate(&args.text, &domain);

    if args.json {
        match serde_json::to_string_pretty(&evaluation) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log_generic_error("[ERROR]", &format!("Failed to serialize evaluation: {e}"));
                process::exit(1);
            }
        }
        return;
    }

    let signals = extract_signals(&args.text, &domain, &evaluator.settings().vocabulary);
    log_answer_assessment(
        &args.text,
        &domain,
        &evaluation,
        &evaluation.validation.quality,
        &signals,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        std::iter::once("score-answer")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_domain_and_json() {
        let args = parse_args(&argv(&["用", "Spark", "-d", "大数据", "--json"])).unwrap();
        assert_eq!(args.text, "用 Spark");
        assert_eq!(args.domain, "大数据");
        assert!(args.json);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&argv(&[])).is_err());
        assert_eq!(
            parse_args(&argv(&["答案", "--domain"])).err().unwrap(),
            "--domain expects a value"
        );
    }
}
