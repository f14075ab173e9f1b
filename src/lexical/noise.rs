// Noise filter — separates compiler/runtime/framework boilerplate from
// application-authored text, given nothing but the fragment string.
//
// Evaluation order (first decisive rule wins):
//   1. Shorter than MIN_MEANINGFUL_CHARS          -> discard
//   2. Any technical-string rule                  -> discard
//   3. Any meaningful-string override             -> keep
//   4. Any generic filter                         -> discard
//   5. Nothing matched                            -> keep
//
// Technical rules run before the overrides so that a system message like
// "failed to match" is never rescued by the error-phrase override, and the
// overrides run before the generic filters so short user-facing phrases
// survive the common-word list.
//
// Every rule is a named, pure predicate over the trimmed text, so each one
// can be tested on its own and the whole filter is idempotent.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Trimmed fragments shorter than this are always discarded.
pub const MIN_MEANINGFUL_CHARS: usize = 3;

/// Which stage of the pipeline produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Disabled,
    Length,
    Technical,
    Meaningful,
    Generic,
    Fallthrough,
}

/// A filter decision together with the rule that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub discard: bool,
    pub tier: Tier,
    pub rule: &'static str,
}

/// A named predicate in one of the rule tiers.
pub struct Rule {
    pub name: &'static str,
    check: fn(&str) -> bool,
}

impl Rule {
    const fn new(name: &'static str, check: fn(&str) -> bool) -> Self {
        Self { name, check }
    }

    /// Evaluate the rule against already-trimmed text.
    pub fn matches(&self, text: &str) -> bool {
        (self.check)(text)
    }
}

/// Technical-string rules. Any match discards.
pub static TECHNICAL_RULES: &[Rule] = &[
    Rule::new("mangled-symbol", is_mangled_symbol),
    Rule::new("type-encoded-selector", is_type_encoded_selector),
    Rule::new("legal-boilerplate", is_legal_boilerplate),
    Rule::new("markup-header", is_markup_header),
    Rule::new("framework-api", is_framework_api),
    Rule::new("method-signature", is_method_signature),
    Rule::new("underscore-dense", is_underscore_dense),
    Rule::new("uppercase-constant", is_uppercase_constant),
    Rule::new("runtime-function", is_runtime_function),
    Rule::new("system-error-message", is_system_error_message),
    Rule::new("ui-notification-constant", is_ui_notification_constant),
    Rule::new("sdk-constant", is_sdk_constant),
    Rule::new("system-library-path", is_system_library_path),
    Rule::new("symbol-density", is_symbol_dense),
];

/// Meaningful-string overrides. Any match keeps the fragment.
pub static MEANINGFUL_RULES: &[Rule] = &[
    Rule::new("error-phrase", is_error_phrase),
    Rule::new("ui-action-word", has_ui_action_word),
    Rule::new("colon-message", is_colon_message),
    Rule::new("prompt-punctuation", has_prompt_punctuation),
    Rule::new("user-facing-cue", has_user_facing_cue),
    Rule::new("descriptive-action", is_descriptive_action),
];

/// Generic filters. Any match discards.
pub static GENERIC_RULES: &[Rule] = &[
    Rule::new("common-word", is_common_word),
    Rule::new("digits-only", is_digits_only),
    Rule::new("version-number", is_version_number),
    Rule::new("hex-digest", is_hex_digest),
    Rule::new("uuid", is_uuid),
    Rule::new("absolute-path", is_absolute_path),
    Rule::new("url", is_url),
    Rule::new("domain-suffix", has_domain_suffix),
    Rule::new("no-alphanumeric", has_no_alphanumeric),
    Rule::new("degenerate-repetition", is_degenerate_repetition),
];

/// What the filter will do, reported alongside a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStatistics {
    pub filter_enabled: bool,
    pub common_words_count: usize,
    pub min_length: usize,
    /// Names of the discarding rules, technical tier first. Empty when the
    /// filter is off.
    pub filters_applied: Vec<String>,
}

/// The noise filter. When disabled, nothing is ever discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseFilter {
    enabled: bool,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl NoiseFilter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn statistics(&self) -> FilterStatistics {
        let filters_applied = if self.enabled {
            TECHNICAL_RULES
                .iter()
                .chain(GENERIC_RULES)
                .map(|r| r.name.to_string())
                .collect()
        } else {
            Vec::new()
        };
        FilterStatistics {
            filter_enabled: self.enabled,
            common_words_count: common_word_count(),
            min_length: MIN_MEANINGFUL_CHARS,
            filters_applied,
        }
    }

    /// True when the fragment should be discarded.
    pub fn is_noise(&self, text: &str) -> bool {
        self.decide(text).discard
    }

    /// Run the full precedence pipeline and report which rule decided.
    pub fn decide(&self, text: &str) -> Decision {
        if !self.enabled {
            return Decision {
                discard: false,
                tier: Tier::Disabled,
                rule: "filter-disabled",
            };
        }

        let text = text.trim();

        if text.chars().count() < MIN_MEANINGFUL_CHARS {
            return Decision {
                discard: true,
                tier: Tier::Length,
                rule: "below-minimum-length",
            };
        }

        if let Some(rule) = first_match(TECHNICAL_RULES, text) {
            return Decision {
                discard: true,
                tier: Tier::Technical,
                rule,
            };
        }

        if let Some(rule) = first_match(MEANINGFUL_RULES, text) {
            return Decision {
                discard: false,
                tier: Tier::Meaningful,
                rule,
            };
        }

        if let Some(rule) = first_match(GENERIC_RULES, text) {
            return Decision {
                discard: true,
                tier: Tier::Generic,
                rule,
            };
        }

        Decision {
            discard: false,
            tier: Tier::Fallthrough,
            rule: "no-rule-matched",
        }
    }
}

fn first_match(rules: &[Rule], text: &str) -> Option<&'static str> {
    rules.iter().find(|r| r.matches(text)).map(|r| r.name)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

// --- Technical-string rules ---

/// How far into a `v`-prefixed string a digit marks it as a type encoding.
const TYPE_ENCODING_PREFIX_CHARS: usize = 10;

const SELECTOR_FRAGMENTS: &[&str] = &["@\"", "@0:", "v48@", "v40@", "v56@", "16@"];

/// Colon-bearing strings longer than this read as method names.
const METHOD_SIGNATURE_MIN_CHARS: usize = 20;

const WEBVIEW_APIS: &[&str] = &["webView:", "WKWebView", "WKNavigation", "WKContext"];

const FRAMEWORK_PREFIXES: &[&str] = &["Foundation", "CoreData", "CoreGraphics", "UIKit", "AVFoundation"];

const SYSTEM_ACCESSORS: &[&str] = &[
    "standardUserDefaults",
    "defaultManager",
    "defaultCenter",
    "sharedApplication",
    "mainBundle",
    "currentDevice",
];

const SYSTEM_DEBUG_MARKERS: &[&str] = &[
    "debugDescription",
    "radr://",
    "radar://",
    ".cxx_destruct",
    "_SKErrorDomain",
];

const LEGAL_PHRASES: &[&str] = &[
    "Reliance on this certificate",
    "Certificate",
    "Developer Relations",
    "Apple Inc.",
];

const RUNTIME_FUNCTIONS: &[&str] = &[
    "_objc_",
    "swift_task_",
    "swift_retain",
    "swift_release",
    "objc_msgSend",
    "objc_retain",
    "objc_autorelease",
];

const SYSTEM_ERROR_MESSAGES: &[&str] = &[
    "failed to match",
    "cannot throw",
    "reported an error",
    "Thread Local Context",
    "AutoreleasedReturnValue",
    "NSArray element",
    "Down-casted Array",
    "Swift Array",
];

const UI_NOTIFICATION_CONSTANTS: &[&str] = &[
    "_UIApplication",
    "_NSNotification",
    "UIApplicationMain",
    "com.apple.developer",
    "#com.apple",
    "_UIKeyboard",
    "_NSForeground",
    "_NSBackground",
    "AttributeName",
    "LayoutDirection",
    "StatusBarStyle",
    "URLOptionsKey",
    "ProxySettings",
    "OrientationProvider",
    "TextLayout",
    "_CFNetwork",
];

const SDK_CONSTANTS: &[&str] = &["_FBSDK", "AppEventParameterName", "AppEventName", "FacebookSDK"];

fn is_mangled_symbol(text: &str) -> bool {
    if let Some(rest) = text.strip_prefix("_$s") {
        if rest.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return true;
        }
    }
    text.starts_with("_swift_") || text.contains("$s") || text.contains("_$")
}

fn is_type_encoded_selector(text: &str) -> bool {
    // Type encodings such as `v24@0:8` or `@"NSString"`. Any `v` prefix with
    // an early digit counts, so "v1.2.3" goes too.
    if text.starts_with("@\"")
        || (text.starts_with('v')
            && text
                .chars()
                .take(TYPE_ENCODING_PREFIX_CHARS)
                .any(char::is_numeric))
    {
        return true;
    }
    contains_any(text, SELECTOR_FRAGMENTS)
}

/// Selectors such as "tableView:cellForRowAtIndexPath:". Any long string
/// with a colon matches, prose included.
fn is_method_signature(text: &str) -> bool {
    text.contains(':') && text.chars().count() > METHOD_SIGNATURE_MIN_CHARS
}

fn is_legal_boilerplate(text: &str) -> bool {
    contains_any(text, LEGAL_PHRASES)
}

fn is_markup_header(text: &str) -> bool {
    text.starts_with("<!DOCTYPE")
        || text.starts_with("<?xml")
        || text.starts_with("<plist")
        || text.contains("version=\"1.0\"")
        || (text.starts_with("<key>") && text.ends_with("</key>"))
}

fn is_framework_api(text: &str) -> bool {
    if contains_any(text, WEBVIEW_APIS) {
        return true;
    }
    if FRAMEWORK_PREFIXES
        .iter()
        .any(|p| text.starts_with(p) || text.contains(&format!(".{p}")))
    {
        return true;
    }
    text.starts_with("@rpath/")
        || text.contains(".framework/")
        || contains_any(text, SYSTEM_ACCESSORS)
        || contains_any(text, SYSTEM_DEBUG_MARKERS)
}

fn is_underscore_dense(text: &str) -> bool {
    text.matches('_').count() > 2
}

/// At least one cased letter and no lowercase letters, longer than 8 chars.
fn is_uppercase_constant(text: &str) -> bool {
    text.chars().count() > 8
        && text.chars().any(char::is_uppercase)
        && !text.chars().any(char::is_lowercase)
}

fn is_runtime_function(text: &str) -> bool {
    contains_any(text, RUNTIME_FUNCTIONS)
}

fn is_system_error_message(text: &str) -> bool {
    contains_any(text, SYSTEM_ERROR_MESSAGES)
}

fn is_ui_notification_constant(text: &str) -> bool {
    if contains_any(text, UI_NOTIFICATION_CONSTANTS) {
        return true;
    }
    text.starts_with('_')
        && (text.contains("Notification") || text.contains("WillShow") || text.contains("WillHide"))
}

fn is_sdk_constant(text: &str) -> bool {
    contains_any(text, SDK_CONSTANTS)
}

fn is_system_library_path(text: &str) -> bool {
    text.starts_with("/usr/lib/") || text.starts_with("/System/Library/")
}

/// Long runs with no space or sentence punctuation read as code symbols.
fn is_symbol_dense(text: &str) -> bool {
    text.chars().count() > 60 && !text.contains([' ', '.', ',', '!', '?'])
}

// --- Meaningful-string overrides ---

const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "warning",
    "fail",
    "exception",
    "invalid",
    "missing",
    "not found",
    "denied",
];

const SYSTEM_ARRAY_MARKERS: &[&str] = &["NSArray", "Swift Array", "Down-casted", "swift_task"];

const UI_ACTION_WORDS: &[&str] = &[
    "button", "click", "tap", "swipe", "loading", "success", "cancel", "confirm", "ok", "yes",
    "no",
];

const PROMPT_PUNCTUATION: &[char] = &['!', '?'];

const USER_FACING_CUES: &[&str] = &["请", "您", "确认", "取消", "成功", "失败", "错误", "警告"];

const ACTION_VERBS: &[&str] = &[
    "get", "set", "create", "delete", "update", "load", "save", "send", "receive", "connect",
    "disconnect", "start", "stop", "play", "pause", "open", "close",
];

fn is_error_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    contains_any(&lower, ERROR_KEYWORDS)
        && text.split_whitespace().count() > 1
        && !contains_any(text, SYSTEM_ARRAY_MARKERS)
}

/// Substring match: "no" fires inside "notification" and "ok" inside
/// "token", which keeps those words out of the common-word filter.
fn has_ui_action_word(text: &str) -> bool {
    contains_any(&text.to_lowercase(), UI_ACTION_WORDS)
}

fn is_colon_message(text: &str) -> bool {
    text.contains(':') && text.chars().count() > 10
}

fn has_prompt_punctuation(text: &str) -> bool {
    text.contains(PROMPT_PUNCTUATION) && text.chars().count() > 5
}

fn has_user_facing_cue(text: &str) -> bool {
    contains_any(text, USER_FACING_CUES)
}

fn is_descriptive_action(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.len() >= 3
        && text.chars().count() > 15
        && words
            .iter()
            .any(|w| ACTION_VERBS.contains(&w.to_lowercase().as_str()))
}

// --- Generic filters ---

static VERSION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("version pattern is valid"));

static HEX_DIGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{8,}$").expect("hex pattern is valid"));

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern is valid")
});

static ABSOLUTE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[a-zA-Z0-9/_.-]*$").expect("path pattern is valid"));

const DOMAIN_SUFFIXES: &[&str] = &[
    ".com", ".org", ".net", ".edu", ".gov", ".mil", ".int", ".co.", ".app",
];

fn is_common_word(text: &str) -> bool {
    text.split_whitespace().count() == 1 && COMMON_WORDS.contains(text.to_lowercase().as_str())
}

fn is_digits_only(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn is_version_number(text: &str) -> bool {
    VERSION_NUMBER.is_match(text)
}

fn is_hex_digest(text: &str) -> bool {
    HEX_DIGEST.is_match(text)
}

fn is_uuid(text: &str) -> bool {
    UUID.is_match(text)
}

fn is_absolute_path(text: &str) -> bool {
    ABSOLUTE_PATH.is_match(text)
}

fn is_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

fn has_domain_suffix(text: &str) -> bool {
    let lower = text.to_lowercase();
    DOMAIN_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

fn has_no_alphanumeric(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}

fn is_degenerate_repetition(text: &str) -> bool {
    let distinct: HashSet<char> = text.to_lowercase().chars().collect();
    distinct.len() <= 2 && text.chars().count() > 4
}

/// Single words that carry no provenance signal on their own: programming,
/// mobile-platform, build/system, networking, and runtime vocabulary.
static COMMON_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // programming
        "main", "error", "com", "index", "app", "application", "system", "data", "info", "debug",
        "config", "settings", "default", "value", "key", "name", "type", "size", "count",
        "number", "string", "text", "file", "path", "url", "http", "https", "www", "api", "json",
        "xml", "html", "css", "js", "javascript", "true", "false", "null", "undefined", "nil",
        "empty", "new", "old", "tmp", "temp", "cache", "log", "logs", "trace", "warn", "warning",
        "fatal", "exception", "status", "state", "flag", "option", "param", "parameter", "arg",
        "argument", "var", "variable", "function", "method", "class", "object", "instance",
        "property", "field", "member", "static", "public", "private", "protected", "internal",
        // mobile platform
        "ios", "iphone", "ipad", "apple", "swift", "objective", "objc", "xcode", "foundation",
        "uikit", "core", "framework", "library", "bundle", "plist", "nib", "xib", "storyboard",
        "segue", "view", "controller", "navigation", "tab", "table", "collection", "scroll",
        "button", "label", "image", "icon", "background", "foreground", "animation",
        "transition", "gesture", "touch", "delegate", "datasource", "protocol", "notification",
        "observer", "target", "action", "outlet", "ibaction", "iboutlet", "autolayout",
        "constraint", "margin", "padding", "frame", "bounds", "center", "origin", "width",
        "height",
        // build and system
        "version", "build", "release", "beta", "alpha", "production", "development", "test",
        "testing", "unit", "integration", "mock", "stub", "fake", "sample", "example", "demo",
        "tutorial", "guide", "help", "support", "documentation", "readme", "license",
        "copyright", "author", "created", "updated", "modified", "date", "time", "timestamp",
        "uuid", "identifier", "id", "uid", "session", "token", "auth", "authentication",
        "authorization", "login", "logout", "user", "admin", "guest", "role", "permission",
        "access", "security",
        // networking and data
        "network", "internet", "connection", "request", "response", "client", "server", "host",
        "port", "tcp", "udp", "socket", "ssl", "tls", "certificate", "encryption", "hash",
        "md5", "sha", "base64", "encoding", "decoding", "utf8", "ascii", "unicode", "locale",
        "language", "localization", "internationalization", "database", "sql", "sqlite",
        "mysql", "postgres", "mongodb", "redis",
        // runtime
        "algorithm", "performance", "optimization", "memory", "cpu", "gpu", "thread", "queue",
        "stack", "heap", "garbage", "reference", "pointer", "allocation", "deallocation", "leak",
        "retain", "autorelease", "weak", "strong", "copy", "mutable", "immutable", "readonly",
        "readwrite",
    ]
    .into_iter()
    .collect()
});

/// Number of distinct single words in the common-vocabulary list.
pub fn common_word_count() -> usize {
    COMMON_WORDS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(text: &str) -> Decision {
        NoiseFilter::default().decide(text)
    }

    #[test]
    fn test_mangled_symbol_discarded() {
        let d = decide("_$sSS7UIKitC");
        assert!(d.discard);
        assert_eq!(d.rule, "mangled-symbol");
    }

    #[test]
    fn test_user_facing_cue_kept() {
        let d = decide("请确认删除此账户？");
        assert!(!d.discard);
        assert_eq!(d.tier, Tier::Meaningful);
        // Full-width punctuation is not prompt punctuation; the cue decides
        assert_eq!(d.rule, "user-facing-cue");
    }

    #[test]
    fn test_system_error_not_rescued_by_override() {
        // Contains "failed" but is a runtime message
        let d = decide("Swift Array failed to match");
        assert!(d.discard);
        assert_eq!(d.tier, Tier::Technical);
    }

    #[test]
    fn test_override_beats_common_word() {
        // "cancel" is an action word, so the override keeps it before the
        // generic filters run
        let d = decide("Cancel");
        assert!(!d.discard);
        assert_eq!(d.rule, "ui-action-word");

        let d = decide("controller");
        assert!(d.discard);
        assert_eq!(d.rule, "common-word");
    }

    #[test]
    fn test_short_text_discarded_first() {
        let d = decide("OK");
        assert!(d.discard);
        assert_eq!(d.tier, Tier::Length);
        assert!(decide("  ").discard);
    }

    #[test]
    fn test_disabled_filter_keeps_everything() {
        let filter = NoiseFilter::new(false);
        assert!(!filter.is_noise("_$sSS7UIKitC"));
        assert!(!filter.is_noise(""));
    }

    #[test]
    fn test_fallthrough_keeps_plain_text() {
        let d = decide("Acme Rewards");
        assert!(!d.discard);
        assert_eq!(d.tier, Tier::Fallthrough);
    }

    #[test]
    fn test_statistics_follow_enabled_state() {
        let stats = NoiseFilter::default().statistics();
        assert!(stats.filter_enabled);
        assert_eq!(stats.min_length, MIN_MEANINGFUL_CHARS);
        assert_eq!(stats.common_words_count, COMMON_WORDS.len());
        assert_eq!(stats.filters_applied.len(), TECHNICAL_RULES.len() + GENERIC_RULES.len());
        assert_eq!(stats.filters_applied[0], "mangled-symbol");

        let off = NoiseFilter::new(false).statistics();
        assert!(!off.filter_enabled);
        assert!(off.filters_applied.is_empty());
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names = HashSet::new();
        for rule in TECHNICAL_RULES.iter().chain(MEANINGFUL_RULES).chain(GENERIC_RULES) {
            assert!(names.insert(rule.name), "duplicate rule name {}", rule.name);
        }
    }
}
