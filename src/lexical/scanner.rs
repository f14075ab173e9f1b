// Byte-run scanner — recovers printable text fragments from an opaque binary.
//
// Two passes run over the same bytes:
//   1. ASCII: contiguous runs of bytes in 0x20..=0x7E
//   2. Wide text: the bytes decoded as UTF-8 (invalid sequences dropped),
//      then maximal runs of Basic Latin printables or code points >= 0xA0
//
// Results are unioned, deduplicated, and post-filtered. The binary is never
// parsed; symbol tables and load commands are just more bytes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex_lite::Regex;
use tracing::debug;

/// Runs longer than this are treated as embedded payload data, not text.
pub const MAX_FRAGMENT_CHARS: usize = 1000;

/// Minimum share of printable characters a fragment must have.
pub const MIN_PRINTABLE_RATIO: f64 = 0.8;

pub const DEFAULT_MIN_LENGTH: usize = 4;

/// Output of one scan: each surviving fragment with its raw occurrence count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    pub occurrences: BTreeMap<String, u32>,
}

impl ScanOutput {
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// The deduplicated fragment texts, in sorted order.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.occurrences.keys().map(String::as_str)
    }
}

/// Maximal runs of Basic Latin printables or code points at or above 0xA0.
static WIDE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x20-\x7E\x{A0}-\x{10FFFF}]+").expect("wide-text pattern is valid")
});

#[derive(Debug, Clone, Copy)]
pub struct Scanner {
    min_length: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl Scanner {
    /// Build a scanner with the given minimum fragment length (in characters).
    pub fn new(min_length: usize) -> Result<Self> {
        if min_length == 0 {
            anyhow::bail!("Minimum fragment length must be at least 1");
        }
        Ok(Self { min_length })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Scan a byte buffer. Total over any input, including empty slices.
    pub fn scan(&self, data: &[u8]) -> ScanOutput {
        let ascii = self.ascii_runs(data);
        let wide = self.wide_runs(data);

        let mut occurrences: BTreeMap<String, u32> = BTreeMap::new();
        for (text, count) in ascii.into_iter().chain(wide) {
            if !is_valid_fragment(&text) {
                continue;
            }
            // Both passes usually see the same run; keep the larger count
            // rather than summing.
            let slot = occurrences.entry(text).or_insert(0);
            *slot = (*slot).max(count);
        }

        debug!(
            bytes = data.len(),
            fragments = occurrences.len(),
            "Scanned byte stream"
        );

        ScanOutput { occurrences }
    }

    fn ascii_runs(&self, data: &[u8]) -> BTreeMap<String, u32> {
        let mut runs = BTreeMap::new();
        let mut start: Option<usize> = None;

        for (i, &byte) in data.iter().enumerate() {
            if (0x20..=0x7E).contains(&byte) {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                self.flush_ascii(&data[s..i], &mut runs);
            }
        }
        if let Some(s) = start {
            self.flush_ascii(&data[s..], &mut runs);
        }

        runs
    }

    fn flush_ascii(&self, run: &[u8], runs: &mut BTreeMap<String, u32>) {
        if run.len() < self.min_length {
            return;
        }
        // Printable ASCII is always valid UTF-8
        let text: String = run.iter().map(|&b| b as char).collect();
        *runs.entry(text).or_insert(0) += 1;
    }

    fn wide_runs(&self, data: &[u8]) -> BTreeMap<String, u32> {
        let decoded = decode_utf8_dropping_invalid(data);
        let mut runs = BTreeMap::new();
        for m in WIDE_RUN.find_iter(&decoded) {
            if m.as_str().chars().count() >= self.min_length {
                *runs.entry(m.as_str().to_string()).or_insert(0) += 1;
            }
        }
        runs
    }
}

/// Read a whole binary into memory.
pub fn read_binary(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read binary at {}", path.display()))
}

/// Decode bytes as UTF-8, silently dropping every invalid sequence.
fn decode_utf8_dropping_invalid(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for chunk in data.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Post-filter applied to every candidate fragment.
///
/// Rejects single repeated characters, mostly-unprintable runs, and runs
/// longer than `MAX_FRAGMENT_CHARS`.
pub fn is_valid_fragment(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if chars.all(|c| c == first) {
        return false;
    }

    let total = text.chars().count();
    if total > MAX_FRAGMENT_CHARS {
        return false;
    }

    let printable = text.chars().filter(|&c| is_printable(c)).count();
    printable as f64 / total as f64 >= MIN_PRINTABLE_RATIO
}

/// Format characters (general category Cf), sorted inclusive ranges.
const FORMAT_CHARS: &[(char, char)] = &[
    ('\u{00AD}', '\u{00AD}'),
    ('\u{0600}', '\u{0605}'),
    ('\u{061C}', '\u{061C}'),
    ('\u{06DD}', '\u{06DD}'),
    ('\u{070F}', '\u{070F}'),
    ('\u{0890}', '\u{0891}'),
    ('\u{08E2}', '\u{08E2}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
    ('\u{110BD}', '\u{110BD}'),
    ('\u{110CD}', '\u{110CD}'),
    ('\u{13430}', '\u{1343F}'),
    ('\u{1BCA0}', '\u{1BCA3}'),
    ('\u{1D173}', '\u{1D17A}'),
    ('\u{E0001}', '\u{E0001}'),
    ('\u{E0020}', '\u{E007F}'),
];

fn is_format_char(c: char) -> bool {
    FORMAT_CHARS.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn is_private_use(c: char) -> bool {
    matches!(c, '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{FFFFD}' | '\u{100000}'..='\u{10FFFD}')
}

/// Printable means: not a control, format, or private-use character, and
/// not whitespace other than the plain space. The replacement character
/// U+FFFD is an ordinary symbol and counts as printable.
pub fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !c.is_control() && !c.is_whitespace() && !is_format_char(c) && !is_private_use(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_runs_split_on_nonprintable() {
        let scanner = Scanner::default();
        let out = scanner.scan(b"\x00\x01Hello World\x00ab\x00Goodbye\xff");
        assert!(out.occurrences.contains_key("Hello World"));
        assert!(out.occurrences.contains_key("Goodbye"));
        // "ab" is below the minimum length
        assert!(!out.occurrences.contains_key("ab"));
    }

    #[test]
    fn test_trailing_run_is_flushed() {
        let scanner = Scanner::default();
        let out = scanner.scan(b"\x00\x00tail");
        assert!(out.occurrences.contains_key("tail"));
    }

    #[test]
    fn test_wide_pass_recovers_utf8_text() {
        let scanner = Scanner::default();
        let mut data = vec![0u8, 0u8];
        data.extend_from_slice("请确认删除此账户".as_bytes());
        data.push(0);
        let out = scanner.scan(&data);
        assert!(out.occurrences.contains_key("请确认删除此账户"));
    }

    #[test]
    fn test_repeated_character_rejected() {
        let scanner = Scanner::default();
        let out = scanner.scan(b"\x00AAAAAAAA\x00");
        assert!(out.is_empty());
    }

    #[test]
    fn test_overlong_run_rejected() {
        let scanner = Scanner::default();
        let data: Vec<u8> = (0..1200).map(|i| b'a' + (i % 26) as u8).collect();
        let out = scanner.scan(&data);
        assert!(out.is_empty());
    }

    #[test]
    fn test_occurrences_counted_once_per_run() {
        let scanner = Scanner::default();
        let out = scanner.scan(b"token\x00token\x00token\x00");
        assert_eq!(out.occurrences.get("token"), Some(&3));
    }

    #[test]
    fn test_zero_min_length_rejected() {
        assert!(Scanner::new(0).is_err());
    }

    #[test]
    fn test_format_chars_are_not_printable() {
        assert!(!is_printable('\u{200B}'));
        assert!(!is_printable('\u{FEFF}'));
        assert!(!is_printable('\u{E0041}'));
        assert!(is_printable('\u{FFFD}'));
    }

    #[test]
    fn test_empty_input() {
        let out = Scanner::default().scan(&[]);
        assert!(out.is_empty());
    }
}
