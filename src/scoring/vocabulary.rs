use regex::Regex;
use std::sync::LazyLock;

static WORD_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]+|\p{Han}").unwrap());

/// Lowercases and folds curly apostrophes so phrase lists match typed input.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'")
}

/// Latin/digit runs count as one word each, every Han character as one.
pub fn word_count(text: &str) -> usize {
    WORD_PATTERN.find_iter(text).count()
}

pub fn text_length(text: &str) -> usize {
    text.trim().chars().count()
}

pub fn visible_length(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

fn is_ascii_term(term: &str) -> bool {
    term.is_ascii()
}

fn split_words(text: &str) -> Vec<&str> {
    WORD_SPLIT.split(text).filter(|s| !s.is_empty()).collect()
}

/// Occurrences of `term` in already-normalized text. ASCII terms match whole
/// words, anything else matches as a substring.
pub fn count_occurrences(text_lower: &str, term: &str) -> usize {
    let term = term.to_lowercase();
    if term.is_empty() {
        return 0;
    }

    if !is_ascii_term(&term) {
        return text_lower.matches(term.as_str()).count();
    }

    let term_parts = split_words(&term);
    if term_parts.is_empty() {
        return 0;
    }
    let words = split_words(text_lower);

    if term_parts.len() == 1 {
        words.iter().filter(|w| **w == term_parts[0]).count()
    } else {
        words
            .windows(term_parts.len())
            .filter(|window| window.iter().zip(term_parts.iter()).all(|(w, t)| w == t))
            .count()
    }
}

pub fn contains_term(text_lower: &str, term: &str) -> bool {
    count_occurrences(text_lower, term) > 0
}

/// Distinct terms present in `text`, in table order.
pub fn matched_terms<'a, S: AsRef<str>>(text: &str, terms: &'a [S]) -> Vec<&'a str> {
    let text_lower = normalize(text);
    terms
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| contains_term(&text_lower, t))
        .collect()
}

/// Substring phrase matching, used by the classifier's keyword groups.
pub fn matched_phrases<'a>(text_lower: &str, phrases: &'a [String]) -> Vec<&'a str> {
    phrases
        .iter()
        .map(|p| p.as_str())
        .filter(|p| !p.is_empty() && text_lower.contains(&normalize(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_mixed_scripts() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n"), 0);
        assert_eq!(word_count("深度学习"), 4);
        assert_eq!(word_count("使用 Spark 和 Kafka"), 5);
        assert_eq!(word_count("hello, world 42"), 3);
    }

    #[test]
    fn test_ascii_terms_match_whole_words() {
        let text = normalize("We use Spark streaming, not sparkle");
        assert_eq!(count_occurrences(&text, "spark"), 1);
        assert!(!contains_term(&normalize("community radio"), "io"));
    }

    #[test]
    fn test_ascii_terms_inside_han_text() {
        let text = normalize("基于Transformer的模型");
        assert!(contains_term(&text, "transformer"));
    }

    #[test]
    fn test_multi_word_terms() {
        let text = normalize("Internet of Things devices");
        assert!(contains_term(&text, "internet of things"));
        assert!(!contains_term(&text, "things internet"));
    }

    #[test]
    fn test_han_substring_counts() {
        assert_eq!(count_occurrences("神经网络和神经网络", "神经网络"), 2);
        assert_eq!(
            matched_terms("机器学习与深度学习", &["深度学习", "机器学习", "强化学习"]),
            vec!["深度学习", "机器学习"]
        );
    }

    #[test]
    fn test_phrase_normalization() {
        let text = normalize("I Don\u{2019}t know");
        let phrases = vec!["don't know".to_string()];
        assert_eq!(matched_phrases(&text, &phrases), vec!["don't know"]);
    }
}
