//! CLI administration tool for calendar-shortener.
//!
//! Inspects and removes stored short links and shows store statistics
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a simple link
//! cargo run --bin admin -- link show aB3dE5fG7h
//!
//! # Show a composite link
//! cargo run --bin admin -- link show aB3dE5fG7h --composite
//!
//! # Delete a link (asks for confirmation unless -y is given)
//! cargo run --bin admin -- link delete aB3dE5fG7h
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use calendar_shortener::domain::entities::{CompositeLink, SimpleLink};
use calendar_shortener::domain::repositories::{CompositeLinkRepository, SimpleLinkRepository};
use calendar_shortener::infrastructure::persistence::{
    PgCompositeLinkRepository, PgSimpleLinkRepository,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing calendar-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or delete short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show a stored link
    Show {
        code: String,

        /// Look the code up among composite links (`/cs/<code>`)
        #[arg(short, long)]
        composite: bool,
    },

    /// Delete a stored link
    Delete {
        code: String,

        /// Look the code up among composite links (`/cs/<code>`)
        #[arg(short, long)]
        composite: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Either kind of stored link, for display.
enum StoredLink {
    Simple(SimpleLink),
    Composite(CompositeLink),
}

struct Repos {
    simple: PgSimpleLinkRepository,
    composite: PgCompositeLinkRepository,
}

impl Repos {
    async fn find(&self, code: &str, composite: bool) -> Result<Option<StoredLink>> {
        let link = if composite {
            self.composite
                .find_by_code(code)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .map(StoredLink::Composite)
        } else {
            self.simple
                .find_by_code(code)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .map(StoredLink::Simple)
        };
        Ok(link)
    }

    async fn delete(&self, code: &str, composite: bool) -> Result<bool> {
        let deleted = if composite {
            self.composite.delete(code).await
        } else {
            self.simple.delete(code).await
        };
        deleted.map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))
    }
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let repos = Repos {
        simple: PgSimpleLinkRepository::new(pool.clone()),
        composite: PgCompositeLinkRepository::new(pool),
    };

    match action {
        LinkAction::Show { code, composite } => show_link(&repos, &code, composite).await?,
        LinkAction::Delete {
            code,
            composite,
            yes,
        } => delete_link(&repos, &code, composite, yes).await?,
    }

    Ok(())
}

async fn show_link(repos: &Repos, code: &str, composite: bool) -> Result<()> {
    println!("{}", "🔗 Short Link".bright_blue().bold());
    println!();

    let link = repos
        .find(code, composite)
        .await?
        .context("Link not found")?;

    print_link(&link);

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(repos: &Repos, code: &str, composite: bool, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Short Link".bright_blue().bold());
    println!();

    let link = repos
        .find(code, composite)
        .await?
        .context("Link not found")?;

    print_link(&link);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link? Subscribed calendars will stop updating")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    if repos.delete(code, composite).await? {
        println!();
        println!("{}", "✅ Link deleted".green().bold());
    } else {
        println!("{}", "⚠️  Link was already gone".yellow());
    }
    println!();

    Ok(())
}

fn print_link(link: &StoredLink) {
    match link {
        StoredLink::Simple(link) => {
            println!("  Route:    {}", format!("/s/{}", link.code).cyan());
            println!("  Calendar: {}", link.url.bright_white());
            println!("  Subjects: {}", subject_list(&link.subjects));
            println!("  Created:  {}", format_time(&link.created_at));
        }
        StoredLink::Composite(link) => {
            println!("  Route:    {}", format!("/cs/{}", link.code).cyan());
            match link.base_url {
                Some(ref url) => {
                    println!("  Base:     {}", url.bright_white());
                    println!("  Base subjects:  {}", subject_list(&link.base_subjects));
                }
                None => println!("  Base:     {}", "none".bright_black()),
            }
            println!("  Extra subjects: {}", subject_list(&link.extra_subjects));
            if let Some(count) = link.event_count {
                println!("  Events at creation: {}", count.to_string().bright_white());
            }
            println!("  Created:  {}", format_time(&link.created_at));
        }
    }
    println!();
}

fn format_time(time: &DateTime<Utc>) -> ColoredString {
    time.format("%Y-%m-%d %H:%M")
        .to_string()
        .bright_black()
}

fn subject_list(subjects: &[String]) -> ColoredString {
    if subjects.is_empty() {
        "all".bright_black()
    } else {
        subjects.join(", ").bright_white()
    }
}

/// Displays store statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let simple = PgSimpleLinkRepository::new(pool.clone())
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;
    let composite = PgCompositeLinkRepository::new(pool)
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;

    println!(
        "  Simple links:    {}",
        simple.to_string().bright_green().bold()
    );
    println!(
        "  Composite links: {}",
        composite.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
