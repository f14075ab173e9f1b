// Fragment classifier — assigns every fragment exactly one category.
//
// Classification is a pure function of the fragment text. An ordered table
// of (category, pattern) pairs is tried first; the first pattern found
// anywhere in the text wins. Fragments no pattern matches fall through to
// three shape heuristics, then to `Uncategorized`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::Regex;

use super::category::Category;

/// Longest fragment still considered sentence-like UI text.
const UI_TEXT_MAX_CHARS: usize = 50;

const DEBUG_VOCABULARY: &[&str] = &["debug", "log", "trace", "dump", "assert", "warning"];

/// The pattern table, in precedence order. Do not reorder: earlier rows
/// shadow later ones (every email also looks like a domain, for example).
static PATTERN_TABLE: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (Category::Url, r"(?i)https?://[^\s\x00-\x1f\x7f-\x{9f}]+"),
        (Category::ApiPath, r"(?i)/api/"),
        (
            Category::ErrorMessage,
            r"(?i)(error|failed|exception|invalid|warning|alert|fault)",
        ),
        (
            Category::BundleIdentifier,
            r"[a-zA-Z][a-zA-Z0-9]*\.[a-zA-Z][a-zA-Z0-9]*\.[a-zA-Z][a-zA-Z0-9]*",
        ),
        (
            Category::FilePath,
            r"(?i)[./][^\s\x00-\x1f\x7f-\x{9f}]*\.(png|jpg|jpeg|gif|mp3|wav|m4a|json|plist|xml|txt|pdf)",
        ),
        (
            Category::Domain,
            r"[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]*\.[a-zA-Z]{2,}",
        ),
        (
            Category::Email,
            r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        ),
        (Category::VersionString, r"\d+\.\d+(\.\d+)?"),
        (Category::CoordinatePair, r"-?\d+\.\d+,-?\d+\.\d+"),
        (Category::LongNumber, r"\b\d{4,}\b"),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        let regex = Regex::new(pattern).expect("category pattern is valid");
        (category, regex)
    })
    .collect()
});

/// Classify a single fragment. Total: every input, including the empty
/// string, lands in exactly one category.
pub fn classify(text: &str) -> Category {
    for (category, pattern) in PATTERN_TABLE.iter() {
        if pattern.is_match(text) {
            return *category;
        }
    }

    if is_ui_text(text) {
        Category::UiText
    } else if is_debug_marker(text) {
        Category::DebugMarker
    } else if is_symbol_like(text) {
        Category::SymbolLike
    } else {
        Category::Uncategorized
    }
}

/// Group fragments by category. Each list is sorted and deduplicated.
pub fn categorize<'a, I>(fragments: I) -> BTreeMap<Category, Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grouped: BTreeMap<Category, Vec<String>> = BTreeMap::new();
    for text in fragments {
        grouped.entry(classify(text)).or_default().push(text.to_string());
    }
    for list in grouped.values_mut() {
        list.sort();
        list.dedup();
    }
    grouped
}

/// Sentence-like: short, several words, capitalized start, at least one
/// all-lowercase word.
fn is_ui_text(text: &str) -> bool {
    if text.chars().count() > UI_TEXT_MAX_CHARS {
        return false;
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    let starts_upper = text.chars().next().is_some_and(char::is_uppercase);
    starts_upper && words.iter().any(|w| is_lowercase_word(w))
}

/// A word with at least one cased letter and no uppercase letters.
fn is_lowercase_word(word: &str) -> bool {
    word.chars().any(char::is_lowercase) && !word.chars().any(char::is_uppercase)
}

fn is_debug_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    DEBUG_VOCABULARY.iter().any(|kw| lower.contains(kw))
}

/// Objective-C message syntax, or a dotted name that is not a path or URL.
fn is_symbol_like(text: &str) -> bool {
    if text.contains("+[") || text.contains("-[") {
        return true;
    }
    text.contains('.') && !text.starts_with('/') && !text.starts_with("http")
}
