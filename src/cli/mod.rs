//! CLI commands implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{DataLayout, Settings};
use crate::crawl;
use crate::import::{ImportError, ImportMode, Importer};
use crate::repository::{queries, session, AsyncSqlitePool};

#[derive(Parser)]
#[command(name = "missilery")]
#[command(about = "Missile catalog harvester and database importer")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true, env = "MISSILERY_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest the catalog into intermediate JSON files
    Crawl,

    /// Import intermediate JSON files into the SQLite database
    Import {
        /// Update existing missiles instead of skipping them
        #[arg(short, long)]
        update: bool,
        /// Database path (default: missilery.db in the data directory)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Show aggregate statistics from the database
    Query {
        /// Database path (default: missilery.db in the data directory)
        #[arg(long)]
        database: Option<PathBuf>,
        /// Rows per breakdown
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli.data_dir)?;
    let layout = DataLayout::new(&cli.data_dir);

    match cli.command {
        Commands::Crawl => cmd_crawl(&settings, &layout).await,
        Commands::Import { update, database } => cmd_import(&layout, update, database).await,
        Commands::Query { database, limit } => cmd_query(&layout, database, limit).await,
    }
}

async fn cmd_crawl(settings: &Settings, layout: &DataLayout) -> anyhow::Result<()> {
    let report = crawl::run_crawl(settings, layout).await?;

    println!(
        "{} Crawl finished: {} pages visited, {} basic records, {} detail records",
        style("✓").green(),
        report.pages_visited,
        report.basic_records,
        report.detail_records
    );
    if report.dropped > 0 {
        println!(
            "{} {} locators dropped after exhausting retries",
            style("!").yellow(),
            report.dropped
        );
    }
    println!("  Data written to {}", layout.root.display());
    Ok(())
}

async fn cmd_import(
    layout: &DataLayout,
    update: bool,
    database: Option<PathBuf>,
) -> anyhow::Result<()> {
    let db_path = database.unwrap_or_else(|| layout.database());
    let pool = AsyncSqlitePool::from_path(&db_path);
    let mode = if update {
        ImportMode::Update
    } else {
        ImportMode::Create
    };

    let importer = Importer::new(layout, pool, mode);
    let stats = match importer.run().await {
        Ok(stats) => stats,
        Err(ImportError::MissingInput(path)) => {
            eprintln!(
                "{} Missing input file: {}",
                style("✗").red(),
                path.display()
            );
            eprintln!("  Run `missilery crawl` first to produce the intermediate files.");
            anyhow::bail!("import aborted: missing input");
        }
        Err(err) => return Err(err.into()),
    };

    let mark = if stats.has_errors() {
        style("!").yellow()
    } else {
        style("✓").green()
    };
    println!("{} Import {} into {}", mark, stats.status(), db_path.display());
    println!("{stats}");
    Ok(())
}

async fn cmd_query(
    layout: &DataLayout,
    database: Option<PathBuf>,
    limit: i64,
) -> anyhow::Result<()> {
    let db_path = database.unwrap_or_else(|| layout.database());
    if !db_path.exists() {
        eprintln!(
            "{} No database at {}",
            style("✗").red(),
            db_path.display()
        );
        anyhow::bail!("query aborted: missing database");
    }

    let pool = AsyncSqlitePool::from_path(&db_path);
    let mut conn = pool.get().await?;

    let totals = queries::totals(&mut conn).await?;
    println!("{}", style("Store totals").bold());
    println!(
        "  {} missiles ({} detailed), {} images, {} characteristics",
        totals.missiles, totals.detailed, totals.images, totals.characteristics
    );

    let by_country = queries::missiles_by_country(&mut conn, limit).await?;
    if !by_country.is_empty() {
        println!("{}", style("Missiles by country").bold());
        for row in &by_country {
            println!("  {:>5}  {}", row.count, row.label);
        }
    }

    let by_purpose = queries::missiles_by_purpose(&mut conn, limit).await?;
    if !by_purpose.is_empty() {
        println!("{}", style("Missiles by purpose").bold());
        for row in &by_purpose {
            println!("  {:>5}  {}", row.count, row.label);
        }
    }

    let longest = queries::longest_range(&mut conn, limit).await?;
    if !longest.is_empty() {
        println!("{}", style("Longest stated range").bold());
        for row in &longest {
            if let Some(range) = row.range_km {
                println!(
                    "  {:>6} km  {} ({})",
                    range,
                    row.name,
                    row.country.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    let imaged = queries::most_imaged(&mut conn, limit).await?;
    if !imaged.is_empty() {
        println!("{}", style("Most image references").bold());
        for row in &imaged {
            println!("  {:>5}  {}", row.count, row.label);
        }
    }

    let classes = queries::range_classes(&mut conn).await?;
    if !classes.is_empty() {
        println!("{}", style("Range classes").bold());
        for row in &classes {
            println!("  {:>5}  {}", row.count, row.label);
        }
    }

    if let Some(latest) = session::latest(&mut conn).await? {
        println!("{}", style("Last import").bold());
        println!(
            "  {} ({}): {} missiles, {} detailed",
            latest.session_name,
            latest.status,
            latest.total_missiles.unwrap_or(0),
            latest.total_detailed.unwrap_or(0)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn data_dir_reads_from_environment() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id().as_str() == "data_dir")
            .unwrap();
        assert_eq!(arg.get_env().unwrap(), "MISSILERY_DATA_DIR");
    }
}
