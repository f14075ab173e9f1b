// Resource catalog — walks an application's resource directory and tags
// every file with a coarse category from its extension.
//
// The similarity stage only needs each file's name and size, plus the
// category for display.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One non-text resource shipped with an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFile {
    pub name: String,
    pub size: u64,
    pub category: String,
    pub path: String,
}

/// Extension table, checked in order. Extensions are lowercase, no dot.
const RESOURCE_CATEGORIES: &[(&str, &[&str])] = &[
    ("images", &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "svg", "webp", "ico"]),
    ("audio", &["mp3", "wav", "m4a", "aac", "ogg", "wma", "flac"]),
    ("video", &["mp4", "mov", "avi", "mkv", "wmv", "flv", "webm"]),
    ("documents", &["pdf", "txt", "rtf", "doc", "docx"]),
    ("data", &["json", "xml", "plist", "db", "sqlite", "realm"]),
    ("fonts", &["ttf", "otf", "woff", "woff2"]),
    ("certificates", &["cer", "crt", "pem", "p12", "mobileprovision"]),
    ("archives", &["zip", "tar", "gz", "7z"]),
    ("code", &["js", "html", "css", "lua", "py"]),
    ("config", &["conf", "ini", "yaml", "yml", "toml"]),
];

pub const UNCATEGORIZED: &str = "uncategorized";

/// Map a file name to its resource category.
pub fn categorize_file(name: &str) -> &'static str {
    let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
        return UNCATEGORIZED;
    };
    let ext = ext.to_ascii_lowercase();
    RESOURCE_CATEGORIES
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(category, _)| *category)
        .unwrap_or(UNCATEGORIZED)
}

/// Recursively catalog every regular file under `root`, sorted by path.
///
/// Symlinks are followed, so a linked asset directory is walked like any
/// other. Entries that cannot be read (including symlink loops) are logged
/// and skipped; only a missing root is an error.
pub fn catalog(root: &Path) -> Result<Vec<ResourceFile>> {
    if !root.is_dir() {
        anyhow::bail!("Resource directory not found: {}", root.display());
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    let mut files: Vec<ResourceFile> = walker
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable resource entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let size = match e.metadata() {
                Ok(m) => m.len(),
                Err(err) => {
                    warn!(path = %e.path().display(), error = %err, "Skipping unreadable resource");
                    return None;
                }
            };
            let name = e.file_name().to_string_lossy().into_owned();
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            Some(ResourceFile {
                category: categorize_file(&name).to_string(),
                name,
                size,
                path: relative.to_string_lossy().into_owned(),
            })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(root = %root.display(), files = files.len(), "Cataloged resources");
    Ok(files)
}

/// Category to file count across a resource list.
pub fn type_distribution(files: &[ResourceFile]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for file in files {
        *counts.entry(file.category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Total bytes across a resource list.
pub fn total_size(files: &[ResourceFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_by_extension() {
        assert_eq!(categorize_file("icon@2x.PNG"), "images");
        assert_eq!(categorize_file("theme.mp3"), "audio");
        assert_eq!(categorize_file("Info.plist"), "data");
        assert_eq!(categorize_file("embedded.mobileprovision"), "certificates");
        assert_eq!(categorize_file("Makefile"), UNCATEGORIZED);
        assert_eq!(categorize_file("Assets.car"), UNCATEGORIZED);
    }

    #[test]
    fn test_catalog_walks_recursively() {
        let root = std::env::temp_dir().join(format!("sift-resources-{}", std::process::id()));
        let nested = root.join("Base.lproj");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("logo.png"), [0u8; 16]).unwrap();
        std::fs::write(nested.join("config.json"), b"{}").unwrap();

        let files = catalog(&root).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(files.len(), 2);
        let logo = files.iter().find(|f| f.name == "logo.png").unwrap();
        assert_eq!(logo.size, 16);
        assert_eq!(logo.category, "images");
        assert_eq!(total_size(&files), 18);

        let types = type_distribution(&files);
        assert_eq!(types["images"], 1);
        assert_eq!(types["data"], 1);
        assert_eq!(types.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_catalog_follows_symlinked_directories() {
        let base = std::env::temp_dir().join(format!("sift-resources-link-{}", std::process::id()));
        let shared = base.join("shared");
        let root = base.join("app");
        std::fs::create_dir_all(&shared).unwrap();
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(shared.join("click.wav"), [1u8; 8]).unwrap();
        std::fs::write(shared.join("beep.wav"), [2u8; 4]).unwrap();
        std::os::unix::fs::symlink(&shared, root.join("Sounds")).unwrap();

        let files = catalog(&root).unwrap();
        std::fs::remove_dir_all(&base).unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["beep.wav", "click.wav"]);
        assert!(files.iter().all(|f| f.category == "audio"));
        assert_eq!(files[1].path, "Sounds/click.wav");
    }

    #[test]
    fn test_missing_root_is_error() {
        assert!(catalog(Path::new("/nonexistent/sift/resources")).is_err());
    }
}
