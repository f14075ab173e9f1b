// Fragment categories — the closed, ordered tag set.
//
// The declaration order is the classifier's precedence order. Serialized
// names are kebab-case so stored corpora and reports stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Url,
    ApiPath,
    ErrorMessage,
    BundleIdentifier,
    FilePath,
    Domain,
    Email,
    VersionString,
    CoordinatePair,
    LongNumber,
    UiText,
    DebugMarker,
    SymbolLike,
    Uncategorized,
}

impl Category {
    /// Every category, in precedence order.
    pub const ALL: [Category; 14] = [
        Category::Url,
        Category::ApiPath,
        Category::ErrorMessage,
        Category::BundleIdentifier,
        Category::FilePath,
        Category::Domain,
        Category::Email,
        Category::VersionString,
        Category::CoordinatePair,
        Category::LongNumber,
        Category::UiText,
        Category::DebugMarker,
        Category::SymbolLike,
        Category::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Url => "url",
            Category::ApiPath => "api-path",
            Category::ErrorMessage => "error-message",
            Category::BundleIdentifier => "bundle-identifier",
            Category::FilePath => "file-path",
            Category::Domain => "domain",
            Category::Email => "email",
            Category::VersionString => "version-string",
            Category::CoordinatePair => "coordinate-pair",
            Category::LongNumber => "long-number",
            Category::UiText => "ui-text",
            Category::DebugMarker => "debug-marker",
            Category::SymbolLike => "symbol-like",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                anyhow::anyhow!("Unknown category '{s}'. Expected one of: {}", names.join(", "))
            })
    }
}
