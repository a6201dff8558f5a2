//! bookgate CLI - operator commands against the bookgate store

use anyhow::{Context, Result};
use bookgate_core::{
    bootstrap, decide, store, BookStore, NewBook, RoleRequirement, Settings, Store, UserStore,
    Verdict,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "bookgate")]
#[command(about = "bookgate - operator tool for the auth gateway and book store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to $BOOKGATE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL, overriding configuration and $DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the same decision the auth service makes for a request
    Check {
        /// Email as forwarded by the OAuth proxy
        #[arg(long)]
        email: String,

        /// Required role ("any" or empty for no requirement)
        #[arg(long, default_value = "")]
        required_role: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Create the users table and force the bootstrap administrator
    Bootstrap,

    /// Change a user's role
    SetRole {
        /// Email of the user
        #[arg(long)]
        email: String,

        /// New role
        #[arg(long)]
        role: String,
    },

    /// Inspect or add books
    Books {
        #[command(subcommand)]
        command: BookCommands,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// List every book
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Add a book
    Add {
        /// Book title
        #[arg(long)]
        title: String,

        /// Book author
        #[arg(long)]
        author: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("bookgate=debug")
            .init();
    }

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    let store = store::open(&settings.database, false)
        .await
        .context("Database connection error")?;

    let outcome = match cli.command {
        Commands::Check {
            email,
            required_role,
            format,
        } => check_command(&store, &email, &required_role, format).await,
        Commands::Bootstrap => bootstrap_command(&store, &settings.bootstrap_admin_email).await,
        Commands::SetRole { email, role } => set_role_command(&store, &email, &role).await,
        Commands::Books { command } => match command {
            BookCommands::List { format } => list_books_command(&store, format).await,
            BookCommands::Add { title, author } => {
                add_book_command(&store, NewBook { title, author }).await
            }
        },
    };

    store.close().await;

    if !outcome? {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns `false` when the caller would be forbidden
async fn check_command(
    store: &Arc<dyn Store>,
    email: &str,
    required_role: &str,
    format: Format,
) -> Result<bool> {
    let start = Instant::now();
    let requirement = RoleRequirement::from_header(Some(required_role));

    if format == Format::Text {
        println!(
            "{} Checking {} against role {}...",
            "→".blue(),
            email,
            requirement
        );
    }

    let verdict = decide(&**store, Some(email), &requirement).await?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Format::Text => {
            let status = if verdict.is_allowed() {
                "ALLOWED".green()
            } else {
                "FORBIDDEN".red()
            };
            let identity = verdict.identity();

            println!("\n{} Auth Decision", "═".blue().bold());
            println!("{} Decision: {}", "▸".blue(), status);
            println!("{} Email: {}", "▸".blue(), identity.email);
            println!("{} Role: {}", "▸".blue(), identity.role);
            println!("{} Required: {}", "▸".blue(), requirement);
            if let Verdict::Allow { created: true, .. } = &verdict {
                println!("{} User was created with the default role", "▸".blue());
            }
            println!(
                "\n{} Total time: {:.3}ms",
                "✓".green(),
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
    }

    Ok(verdict.is_allowed())
}

async fn bootstrap_command(store: &Arc<dyn Store>, admin_email: &str) -> Result<bool> {
    println!("{} Bootstrapping {} store...", "→".blue(), store.backend());
    bootstrap(&**store, admin_email).await?;
    println!("{} Bootstrap complete, {} is admin", "✓".green(), admin_email);
    Ok(true)
}

async fn set_role_command(store: &Arc<dyn Store>, email: &str, role: &str) -> Result<bool> {
    let rows = store.update_role(email, role).await?;
    if rows == 0 {
        println!("{} No user with email {}, nothing changed", "!".yellow(), email);
    } else {
        println!("{} {} now has role {}", "✓".green(), email, role);
    }
    Ok(true)
}

async fn list_books_command(store: &Arc<dyn Store>, format: Format) -> Result<bool> {
    let books = store.list_books().await?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&books)?),
        Format::Text => {
            println!("{} Books ({})", "═".blue().bold(), books.len());
            for book in &books {
                println!("{} #{} {} by {}", "▸".blue(), book.id, book.title, book.author);
            }
        }
    }
    Ok(true)
}

async fn add_book_command(store: &Arc<dyn Store>, book: NewBook) -> Result<bool> {
    store.create_book(&book).await?;
    println!("{} Added \"{}\" by {}", "✓".green(), book.title, book.author);
    Ok(true)
}
