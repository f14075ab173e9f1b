// Colored terminal output for extraction results and similarity reports.
//
// This module handles all terminal-specific formatting: colors and tables.
// main.rs delegates here for everything user-facing.

use colored::Colorize;

use super::{format_bytes, truncate_chars};
use crate::corpus::model::ExtractionSummary;
use crate::db::models::StoredApp;
use crate::lexical::category::Category;
use crate::lexical::noise::Decision;
use crate::similarity::score::PairScores;
use crate::similarity::SimilarityReport;

/// How many fragments to print per category in the extraction view.
const FRAGMENTS_PER_CATEGORY: usize = 5;

/// Display one application's extraction result.
pub fn display_extraction(summary: &ExtractionSummary) {
    println!(
        "\n{}",
        format!("=== Extraction: {} ===", summary.app).bold()
    );
    if let Some(id) = &summary.identifier {
        println!("  Identifier: {id}");
    }
    println!(
        "  Fragments: {} unique, {} occurrences",
        summary.unique_count, summary.total_occurrences
    );

    let stats = &summary.stats;
    println!(
        "  Length: min {}  max {}  mean {:.1}",
        stats.min_length, stats.max_length, stats.mean_length
    );
    println!(
        "  Encoding: {} ASCII, {} non-ASCII ({:.1}% ASCII)",
        stats.ascii_fragments, stats.non_ascii_fragments, stats.ascii_percentage
    );
    if summary.resource_count > 0 {
        println!(
            "  Resources: {} files, {}",
            summary.resource_count,
            format_bytes(summary.resource_bytes)
        );
    }

    println!("\n  {}", "Categories".bold());
    for (category, fragments) in &summary.categories {
        println!(
            "    {:<20} {:>6}",
            colorize_category(*category),
            fragments.len()
        );
        for fragment in fragments.iter().take(FRAGMENTS_PER_CATEGORY) {
            println!("        {}", truncate_chars(fragment, 80).dimmed());
        }
    }

    if !summary.repeated.is_empty() {
        println!("\n  {}", "Repeated within binary".bold());
        for entry in summary.repeated.iter().take(10) {
            println!(
                "    {:>5}x  {}",
                entry.count,
                truncate_chars(&entry.content, 80)
            );
        }
    }
}

/// Display a similarity report: pair ranking, duplicates, recommendations.
pub fn display_report(report: &SimilarityReport) {
    let meta = &report.metadata;
    println!(
        "\n{}",
        format!("=== Similarity Report ({} apps) ===", meta.apps.len()).bold()
    );
    println!(
        "  Noise filter: {}",
        if meta.filter_enabled {
            "on".green()
        } else {
            "off".yellow()
        }
    );
    if meta.filter_enabled {
        let fs = &meta.filter_statistics;
        println!(
            "    min length {}, {} common words, {} rules",
            fs.min_length,
            fs.common_words_count,
            fs.filters_applied.len()
        );
    }
    if !meta.excluded_categories.is_empty() {
        let names: Vec<&str> = meta.excluded_categories.iter().map(|c| c.as_str()).collect();
        println!("  Excluded categories: {}", names.join(", "));
    }

    println!("\n  {}", "Pairs by composite score".bold());
    println!(
        "  {:<24} {:<24} {:>9} {:>9} {:>9} {:>9}",
        "App".dimmed(),
        "App".dimmed(),
        "Lexical".dimmed(),
        "Resource".dimmed(),
        "Prefix".dimmed(),
        "Composite".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());
    for pair in &report.pairs {
        println!(
            "  {:<24} {:<24} {:>8.2}% {:>8.2}% {:>8.2}% {}",
            truncate_chars(&pair.app_a, 24),
            truncate_chars(&pair.app_b, 24),
            pair.scores.lexical,
            pair.scores.resource,
            pair.scores.identifier,
            colorize_composite(&pair.scores),
        );
    }

    let stats = &report.duplicates.statistics;
    println!("\n  {}", "Duplicate fragments".bold());
    println!(
        "    Total {}  Unique {}  Duplicates {}  Rate {:.2}%",
        stats.total_occurrences, stats.unique_fragments, stats.duplicate_count, stats.duplication_rate
    );
    for (k, entries) in report.duplicates.groups_descending() {
        println!("    shared by {k} apps: {} fragments", entries.len());
    }

    if !report.top_duplicates.is_empty() {
        println!("\n  {}", "Top duplicates".bold());
        for (i, entry) in report.top_duplicates.iter().enumerate() {
            println!(
                "  {:>4}. [{}] {}",
                i + 1,
                entry.count,
                truncate_chars(&entry.content, 80)
            );
        }
    }

    let res = &report.resource_duplicates;
    if !res.duplicates.is_empty() {
        println!(
            "\n  {} {} redundant files, {} recoverable",
            "Duplicate resources:".bold(),
            res.redundant_files,
            format_bytes(res.potential_savings)
        );
    }

    for (app, types) in report.resource_types.iter().filter(|(_, t)| !t.is_empty()) {
        let parts: Vec<String> = types.iter().map(|(cat, n)| format!("{cat} {n}")).collect();
        println!("  {} {}", format!("{app}:").dimmed(), parts.join(", "));
    }

    if !report.high_similarity.is_empty() {
        println!();
        for pair in &report.high_similarity {
            println!(
                "  {} {} / {} share {:.2}% of their fragments",
                "!!".red().bold(),
                pair.app_a,
                pair.app_b,
                pair.scores.lexical
            );
        }
    }

    if !report.recommendations.is_empty() {
        println!("\n  {}", "Recommendations".bold());
        for rec in &report.recommendations {
            println!("    - {rec}");
        }
    }
    println!();
}

/// Display the classifier and filter verdict for an ad-hoc string.
pub fn display_classification(text: &str, category: Category, decision: &Decision) {
    let verdict = if decision.discard {
        "discard".red()
    } else {
        "keep".green()
    };
    println!(
        "  {:<40} {:<18} {:<8} {}",
        truncate_chars(text, 40),
        colorize_category(category),
        verdict,
        decision.rule.dimmed()
    );
}

/// Display stored applications as a table.
pub fn display_app_list(apps: &[StoredApp]) {
    if apps.is_empty() {
        println!("No applications stored yet. Run `sift extract` or `sift batch` first.");
        return;
    }

    println!(
        "  {:<24} {:<32} {:>9} {:>9} {:>10}",
        "App".dimmed(),
        "Identifier".dimmed(),
        "Unique".dimmed(),
        "Resources".dimmed(),
        "Binary".dimmed(),
    );
    for app in apps {
        println!(
            "  {:<24} {:<32} {:>9} {:>9} {:>10}",
            truncate_chars(&app.name, 24),
            truncate_chars(app.identifier.as_deref().unwrap_or("-"), 32),
            app.unique_count,
            app.resource_count,
            format_bytes(app.binary_size),
        );
    }
}

fn colorize_composite(scores: &PairScores) -> colored::ColoredString {
    let text = format!("{:>8.2}%", scores.composite);
    match scores.composite {
        c if c >= 80.0 => text.red().bold(),
        c if c >= 50.0 => text.yellow(),
        _ => text.normal(),
    }
}

/// Colorize a category name.
fn colorize_category(category: Category) -> colored::ColoredString {
    let name = category.as_str();
    match category {
        Category::Url | Category::ApiPath | Category::Domain | Category::Email => name.cyan(),
        Category::ErrorMessage => name.red(),
        Category::UiText => name.green(),
        Category::SymbolLike | Category::DebugMarker => name.dimmed(),
        Category::Uncategorized => name.normal(),
        _ => name.blue(),
    }
}
