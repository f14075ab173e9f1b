// System status display — DB stats, stored apps, last report.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::Database;
use crate::output::{format_bytes, terminal};

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_display_path: &str) -> Result<()> {
    if !Path::new(db_display_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `sift init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let apps = db.list_apps().await?;
    let fragments: u64 = apps.iter().map(|a| a.unique_count).sum();
    println!(
        "Stored apps: {} ({} unique fragments total)",
        apps.len(),
        fragments
    );
    terminal::display_app_list(&apps);

    match db.get_report().await? {
        Some(stored) => {
            println!(
                "\nLast report: {} apps (updated {})",
                stored.app_count, stored.updated_at
            );
            if let Some(top) = stored.report.pairs.first() {
                println!(
                    "  Closest pair: {} / {} at {:.2}% composite",
                    top.app_a, top.app_b, top.scores.composite
                );
            }
        }
        None => {
            println!("\nLast report: none");
            println!("  Run `sift compare` once two or more apps are stored");
        }
    }

    Ok(())
}
