// Markdown report generation.
//
// Renders a SimilarityReport to a self-contained Markdown file: metadata and
// filter settings, the lexical matrix, ranked pairs, duplicate tables,
// resource duplicates and types, per-app summaries, and recommendations.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use super::{format_bytes, truncate_chars};
use crate::similarity::SimilarityReport;

/// Max characters of a fragment shown in a table cell.
const CELL_CHARS: usize = 60;

/// Fragments listed under each shared-by-k heading.
const GROUP_LIST_LIMIT: usize = 10;

/// Render the report and write it to `output_path`. Returns the path written.
pub fn generate_report(report: &SimilarityReport, output_path: &str) -> Result<String> {
    let body = render(report)?;

    if let Some(parent) = Path::new(output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory for {output_path}"))?;
        }
    }
    std::fs::write(output_path, body)
        .with_context(|| format!("Failed to write report to {output_path}"))?;

    Ok(output_path.to_string())
}

/// Render the report as Markdown text.
pub fn render(report: &SimilarityReport) -> Result<String> {
    let mut md = String::new();
    let meta = &report.metadata;

    writeln!(md, "# Lexical Similarity Report\n")?;
    writeln!(
        md,
        "Generated {} over {} apps. Noise filter: {}.",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        meta.apps.len(),
        if meta.filter_enabled { "on" } else { "off" }
    )?;
    if !meta.excluded_categories.is_empty() {
        let names: Vec<&str> = meta.excluded_categories.iter().map(|c| c.as_str()).collect();
        writeln!(md, "Excluded categories: {}.", names.join(", "))?;
    }

    let fs = &meta.filter_statistics;
    writeln!(md, "\n## Noise filter\n")?;
    if fs.filter_enabled {
        writeln!(md, "- Minimum meaningful length: {}", fs.min_length)?;
        writeln!(md, "- Common words: {}", fs.common_words_count)?;
        writeln!(md, "- Filters applied: {}", fs.filters_applied.join(", "))?;
    } else {
        writeln!(md, "Disabled; every extracted fragment was compared.")?;
    }

    // Lexical matrix
    writeln!(md, "\n## Lexical similarity matrix (%)\n")?;
    write!(md, "| |")?;
    for app in &meta.apps {
        write!(md, " {} |", escape(app))?;
    }
    writeln!(md)?;
    writeln!(md, "|---|{}", "---:|".repeat(meta.apps.len()))?;
    for row_app in &meta.apps {
        write!(md, "| **{}** |", escape(row_app))?;
        for col_app in &meta.apps {
            match report.scores(row_app, col_app) {
                Some(s) => write!(md, " {:.2} |", s.lexical)?,
                None => write!(md, " - |")?,
            }
        }
        writeln!(md)?;
    }

    // Ranked pairs
    writeln!(md, "\n## Pairs by composite score\n")?;
    writeln!(md, "| App | App | Lexical | Resource | Prefix | Composite |")?;
    writeln!(md, "|---|---|---:|---:|---:|---:|")?;
    for pair in &report.pairs {
        let s = &pair.scores;
        writeln!(
            md,
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            escape(&pair.app_a),
            escape(&pair.app_b),
            s.lexical,
            s.resource,
            s.identifier,
            s.composite
        )?;
    }

    // Duplicates
    let stats = &report.duplicates.statistics;
    writeln!(md, "\n## Duplicate fragments\n")?;
    writeln!(md, "- Total occurrences: {}", stats.total_occurrences)?;
    writeln!(md, "- Unique fragments: {}", stats.unique_fragments)?;
    writeln!(md, "- Duplicates: {}", stats.duplicate_count)?;
    writeln!(md, "- Duplication rate: {:.2}%", stats.duplication_rate)?;

    let distribution = report.duplicates.distribution();
    if !distribution.is_empty() {
        writeln!(md, "\n| Shared by | Fragments |\n|---:|---:|")?;
        for (k, count) in distribution.iter().rev() {
            writeln!(md, "| {k} apps | {count} |")?;
        }
    }

    for (k, entries) in report.duplicates.groups_descending() {
        writeln!(md, "\n### Shared by {k} apps\n")?;
        for entry in entries.iter().take(GROUP_LIST_LIMIT) {
            writeln!(md, "- `{}`", escape(&truncate_chars(&entry.content, CELL_CHARS)))?;
        }
        if entries.len() > GROUP_LIST_LIMIT {
            writeln!(md, "- ... and {} more", entries.len() - GROUP_LIST_LIMIT)?;
        }
    }

    if !report.top_duplicates.is_empty() {
        writeln!(md, "\n### Top duplicates\n")?;
        writeln!(md, "| # | Fragment | Apps |\n|---:|---|---|")?;
        for (i, entry) in report.top_duplicates.iter().enumerate() {
            writeln!(
                md,
                "| {} | `{}` | {} |",
                i + 1,
                escape(&truncate_chars(&entry.content, CELL_CHARS)),
                escape(&entry.apps.join(", "))
            )?;
        }
    }

    // Resources
    let res = &report.resource_duplicates;
    if !res.duplicates.is_empty() {
        writeln!(md, "\n## Duplicate resources\n")?;
        writeln!(
            md,
            "{} redundant files; potential savings {}.\n",
            res.redundant_files,
            format_bytes(res.potential_savings)
        )?;
        writeln!(md, "| Name | Size | Category | Copies |\n|---|---:|---|---:|")?;
        for dup in &res.duplicates {
            writeln!(
                md,
                "| {} | {} | {} | {} |",
                escape(&dup.name),
                format_bytes(dup.size),
                dup.category,
                dup.count
            )?;
        }
    }

    if report.resource_types.values().any(|t| !t.is_empty()) {
        writeln!(md, "\n## Resource types\n")?;
        writeln!(md, "| App | Category | Files |\n|---|---|---:|")?;
        for (app, types) in &report.resource_types {
            for (category, count) in types {
                writeln!(md, "| {} | {} | {} |", escape(app), category, count)?;
            }
        }
    }

    // Per-app summaries
    writeln!(md, "\n## Applications\n")?;
    writeln!(
        md,
        "| App | Identifier | Unique | Compared | Occurrences | Resources |\n|---|---|---:|---:|---:|---:|"
    )?;
    for app in &report.app_summaries {
        writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} ({}) |",
            escape(&app.app),
            escape(app.identifier.as_deref().unwrap_or("-")),
            app.unique_fragments,
            app.compared_fragments,
            app.total_occurrences,
            app.resource_count,
            format_bytes(app.resource_bytes)
        )?;
    }

    for (app, histogram) in &report.category_histograms {
        writeln!(md, "\n### {} categories\n", escape(app))?;
        for (category, count) in histogram {
            writeln!(md, "- {category}: {count}")?;
        }
    }

    if !report.discarded_samples.is_empty() {
        writeln!(md, "\n## Sample of filtered fragments\n")?;
        for sample in &report.discarded_samples {
            writeln!(md, "- `{}`", escape(&truncate_chars(sample, CELL_CHARS)))?;
        }
    }

    if !report.recommendations.is_empty() {
        writeln!(md, "\n## Recommendations\n")?;
        for rec in &report.recommendations {
            writeln!(md, "- {rec}")?;
        }
    }

    Ok(md)
}

/// Keep fragment text from breaking table layout.
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('`', "'")
        .replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::lexical::scanner::ScanOutput;
    use crate::similarity::{build_report, ComparisonOptions};

    fn corpus(app: &str, frags: &[&str]) -> Corpus {
        let scan = ScanOutput {
            occurrences: frags.iter().map(|f| (f.to_string(), 1)).collect(),
        };
        Corpus::build(app, None, 0, scan, Vec::new())
    }

    #[test]
    fn test_render_contains_sections() {
        let corpora = vec![
            corpus("alpha", &["Login Failed", "a|b pipe text"]),
            corpus("beta", &["Login Failed", "a|b pipe text"]),
        ];
        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();
        let md = render(&report).unwrap();

        assert!(md.starts_with("# Lexical Similarity Report"));
        assert!(md.contains("| **alpha** | 100.00 | 100.00 |"));
        assert!(md.contains("Duplication rate: 50.00%"));
        assert!(md.contains("a\\|b pipe text"));
        assert!(md.contains("## Recommendations"));
    }

    #[test]
    fn test_render_filter_statistics_and_groups() {
        let corpora = vec![
            corpus("alpha", &["Login Failed", "Welcome back"]),
            corpus("beta", &["Login Failed", "Welcome back"]),
            corpus("gamma", &["Login Failed"]),
        ];
        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();
        let md = render(&report).unwrap();

        assert!(md.contains("## Noise filter"));
        assert!(md.contains("- Minimum meaningful length: 3"));
        assert!(md.contains("common-word"));
        // Larger groups come first
        let three = md.find("### Shared by 3 apps").unwrap();
        let two = md.find("### Shared by 2 apps").unwrap();
        assert!(three < two);
        // No resources anywhere, so no resource-type table
        assert!(!md.contains("## Resource types"));

        let options = ComparisonOptions {
            filter: crate::lexical::noise::NoiseFilter::new(false),
            ..Default::default()
        };
        let md = render(&build_report(&corpora, &options).unwrap()).unwrap();
        assert!(md.contains("Disabled; every extracted fragment was compared."));
    }

    #[test]
    fn test_render_resource_types() {
        use crate::resources::ResourceFile;

        let with_assets = |app: &str| {
            let scan = ScanOutput {
                occurrences: [("Login Failed".to_string(), 1)].into_iter().collect(),
            };
            let files = vec![ResourceFile {
                name: "logo.png".into(),
                size: 64,
                category: "images".into(),
                path: "logo.png".into(),
            }];
            Corpus::build(app, None, 0, scan, files)
        };
        let report =
            build_report(&[with_assets("alpha"), with_assets("beta")], &ComparisonOptions::default())
                .unwrap();
        let md = render(&report).unwrap();

        assert!(md.contains("## Resource types"));
        assert!(md.contains("| alpha | images | 1 |"));
        assert!(md.contains("| beta | images | 1 |"));
    }

    #[test]
    fn test_generate_report_writes_file() {
        let corpora = vec![corpus("alpha", &["Login Failed"]), corpus("beta", &["Other text"])];
        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();

        let dir = std::env::temp_dir().join(format!("sift-md-{}", std::process::id()));
        let path = dir.join("nested/report.md");
        let written = generate_report(&report, path.to_str().unwrap()).unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(content.contains("## Pairs by composite score"));
    }
}
