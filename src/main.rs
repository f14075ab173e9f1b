use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use sift::config::Config;
use sift::lexical::category::Category;
use sift::lexical::noise::NoiseFilter;
use sift::lexical::scanner::Scanner;
use sift::pipeline::extraction::{self, ExtractionJob};
use sift::similarity::{ComparisonOptions, SimilarityError};

/// Sift: lexical extraction and cross-corpus similarity.
///
/// Pulls human-readable text out of compiled application binaries,
/// classifies it, and compares the results across applications to surface
/// shared code, shared assets, and near-identical builds.
#[derive(Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Extract and store one application's text fragments
    Extract {
        /// Path to the application binary
        binary: PathBuf,

        /// App name to store the result under (default: binary file name)
        #[arg(long)]
        name: Option<String>,

        /// Dotted bundle identifier (e.g. com.acme.app)
        #[arg(long)]
        identifier: Option<String>,

        /// Directory of bundled resource files to catalog
        #[arg(long)]
        resources: Option<PathBuf>,

        /// Minimum fragment length in characters (default: SIFT_MIN_LENGTH or 4)
        #[arg(long)]
        min_length: Option<usize>,
    },

    /// Extract many applications in parallel from a JSON manifest
    Batch {
        /// JSON array of {name, binary, identifier?, resources?}
        manifest: PathBuf,

        /// Number of extractions to run in parallel (default: SIFT_CONCURRENCY or 4)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Minimum fragment length in characters
        #[arg(long)]
        min_length: Option<usize>,
    },

    /// Compare stored applications and write a similarity report
    Compare {
        /// Only compare these apps (comma-separated)
        #[arg(long, value_delimiter = ',')]
        apps: Option<Vec<String>>,

        /// Compare raw fragments without the noise filter
        #[arg(long)]
        no_filter: bool,

        /// Length of the ranked duplicate list (default: SIFT_TOP_N or 20)
        #[arg(long)]
        top: Option<usize>,

        /// Leave fragments of this category out of the comparison (repeatable)
        #[arg(long = "exclude-category")]
        exclude_category: Vec<Category>,

        /// Markdown report path (default: SIFT_REPORT_PATH)
        #[arg(long)]
        output: Option<String>,
    },

    /// Show a stored extraction result
    Show {
        /// App name
        app: String,
    },

    /// Remove a stored application
    Remove {
        /// App name
        app: String,
    },

    /// Classify ad-hoc strings and show the noise filter's decision
    Classify {
        /// Strings to classify
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Show system status (DB stats, stored apps, last report)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sift=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing sift database...");
            let db = sift::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: sift extract <BINARY> --name <APP>");
        }

        Commands::Extract {
            binary,
            name,
            identifier,
            resources,
            min_length,
        } => {
            let scanner = Scanner::new(min_length.unwrap_or(config.min_length))?;
            let name = match name {
                Some(n) => n,
                None => default_app_name(&binary)?,
            };
            let job = ExtractionJob {
                name,
                binary,
                identifier,
                resources,
            };

            println!("Extracting {}...", job.binary.display());
            let outcome = tokio::task::spawn_blocking(move || extraction::extract(&job, &scanner))
                .await?;
            if let Some(error) = &outcome.error {
                anyhow::bail!("Extraction failed for {}: {error}", outcome.job.name);
            }

            sift::output::terminal::display_extraction(&outcome.corpus.summary());

            let db = sift::db::initialize_sqlite(&config.db_path)?;
            db.upsert_corpus(&outcome.corpus, &outcome.job.binary.to_string_lossy())
                .await?;
            println!("\n{}", format!("Stored as '{}'.", outcome.job.name).bold());
        }

        Commands::Batch {
            manifest,
            concurrency,
            min_length,
        } => {
            let scanner = Scanner::new(min_length.unwrap_or(config.min_length))?;
            let jobs = extraction::load_manifest(&manifest)?;
            if jobs.is_empty() {
                println!("Manifest lists no applications.");
                return Ok(());
            }

            println!("Extracting {} applications...", jobs.len());
            let outcomes = extraction::run_batch(
                jobs,
                scanner,
                concurrency.unwrap_or(config.concurrency),
            )
            .await;

            let db = sift::db::initialize_sqlite(&config.db_path)?;
            let stored = extraction::store_outcomes(&db, &outcomes).await?;

            println!("\n{}", "Batch complete.".bold());
            for (app, outcome) in &outcomes {
                match &outcome.error {
                    None => println!(
                        "  {} {:<24} {} unique fragments",
                        "ok".green(),
                        app,
                        outcome.corpus.unique_count()
                    ),
                    Some(e) => println!("  {} {:<24} {}", "failed".red(), app, e),
                }
            }
            println!("  Stored: {stored}/{}", outcomes.len());
        }

        Commands::Compare {
            apps,
            no_filter,
            top,
            exclude_category,
            output,
        } => {
            let db = sift::db::open_sqlite(&config.db_path)?;
            let options = ComparisonOptions {
                filter: NoiseFilter::new(config.filter_enabled && !no_filter),
                excluded_categories: exclude_category,
                apps,
                top_n: top.unwrap_or(config.top_n),
                ..Default::default()
            };

            let report = match sift::pipeline::comparison::run(&db, &options).await {
                Ok(report) => report,
                Err(e) => {
                    if let Some(SimilarityError::InsufficientInput { available, required }) =
                        e.downcast_ref::<SimilarityError>()
                    {
                        println!(
                            "Need at least {required} stored apps to compare, found {available}."
                        );
                        println!("Run `sift extract` or `sift batch` to add more.");
                        return Ok(());
                    }
                    return Err(e);
                }
            };

            sift::output::terminal::display_report(&report);

            let report_path = output.unwrap_or_else(|| config.report_path.clone());
            let written = sift::output::markdown::generate_report(&report, &report_path)?;
            println!(
                "{}",
                format!("Markdown report saved to: {written}").bold()
            );
        }

        Commands::Show { app } => {
            let db = sift::db::open_sqlite(&config.db_path)?;
            match db.get_corpus(&app).await? {
                Some(corpus) => sift::output::terminal::display_extraction(&corpus.summary()),
                None => anyhow::bail!("No stored app named '{app}'. Run `sift status` to list them."),
            }
        }

        Commands::Remove { app } => {
            let db = sift::db::open_sqlite(&config.db_path)?;
            if db.delete_app(&app).await? {
                println!("Removed '{app}'.");
            } else {
                println!("No stored app named '{app}'.");
            }
        }

        Commands::Classify { texts } => {
            let filter = NoiseFilter::new(true);
            for text in &texts {
                let category = sift::lexical::classifier::classify(text);
                let decision = filter.decide(text);
                sift::output::terminal::display_classification(text, category, &decision);
            }
        }

        Commands::Status => {
            let db: Arc<dyn sift::db::Database> = if std::path::Path::new(&config.db_path).exists() {
                sift::db::open_sqlite(&config.db_path)?
            } else {
                sift::db::in_memory()?
            };
            sift::status::show(&db, &config.db_path).await?;
        }
    }

    Ok(())
}

/// App name from a binary path: the file name without extension.
fn default_app_name(binary: &std::path::Path) -> Result<String> {
    binary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Cannot derive an app name from {}; pass --name", binary.display()))
}
