use std::collections::HashSet;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_admin::client::{AdminClient, ClientError, ErrorKind};
use folio_admin::config::ClientConfig;
use folio_admin::models::LoginRequest;
use folio_admin::routes::{paths, Destination, GuardDecision, RouteGuard};
use folio_admin::session::{default_path, CredentialStore, SqlitePersistence};
use folio_admin::slug::{uniquify, ScriptSet, SlugGenerator};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Command line companion to the Folio admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a unique slug from a title
    Slug {
        title: String,

        /// Slug already taken in the collection (repeatable)
        #[arg(short, long = "existing")]
        existing: Vec<String>,

        /// Scripts kept besides ASCII: extended, latin, or e.g. cjk,kana
        #[arg(long)]
        scripts: Option<ScriptSet>,
    },
    /// Log in and save the session
    Login {
        #[arg(long)]
        email: String,

        /// Falls back to FOLIO_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },
    /// Drop the saved session
    Logout,
    /// Show whether a session is active
    Status,
    /// List articles
    Articles,
    /// List categories
    Categories,
    /// List users
    Users {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Show what the navigation guard does with a path
    Route { path: String },
}

/// Initialize tracing on stderr so stdout carries only command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "folio_admin=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_session(config: &ClientConfig) -> anyhow::Result<CredentialStore> {
    let path = match &config.session_db {
        Some(path) => path.clone(),
        None => default_path()?,
    };
    let persistence = SqlitePersistence::open(path)?;
    persistence.migrate()?;
    CredentialStore::rehydrated(persistence).context("Failed to restore session")
}

fn present(err: ClientError) -> anyhow::Error {
    if err.kind() == ErrorKind::AuthenticationRejected {
        anyhow::anyhow!("{} (session ended, run `folio login`)", err.user_message())
    } else {
        anyhow::anyhow!(err.user_message())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ClientConfig::from_env();

    match cli.command {
        Commands::Slug {
            title,
            existing,
            scripts,
        } => {
            let generator = SlugGenerator::new(scripts.unwrap_or(config.slug_scripts));
            let base = generator.require(&title)?;
            let taken: HashSet<String> = existing.into_iter().collect();
            println!("{}", uniquify(&base, &taken));
        }
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => std::env::var("FOLIO_PASSWORD")
                    .context("Pass --password or set FOLIO_PASSWORD")?,
            };
            let client = AdminClient::new(&config, open_session(&config)?)?;
            client
                .login(&LoginRequest::new(email, password))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Login successful!");
        }
        Commands::Logout => {
            open_session(&config)?.logout()?;
            println!("Logged out");
        }
        Commands::Status => {
            let session = open_session(&config)?;
            if session.is_authenticated() {
                println!("Authenticated against {}", config.base_url);
            } else {
                println!("Not logged in");
            }
        }
        Commands::Articles => {
            let client = AdminClient::new(&config, open_session(&config)?)?;
            for article in client.list_articles().await.map_err(present)? {
                let state = if article.published { "published" } else { "draft" };
                println!("{}\t{}\t{}\t{}", article.id, article.slug, state, article.title);
            }
        }
        Commands::Categories => {
            let client = AdminClient::new(&config, open_session(&config)?)?;
            for category in client.list_categories().await.map_err(present)? {
                let id = category.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{}\t{}\t{}", id, category.slug, category.name);
            }
        }
        Commands::Users { page, limit } => {
            let client = AdminClient::new(&config, open_session(&config)?)?;
            let users = client.list_users(page, limit).await.map_err(present)?;
            for user in &users.data {
                println!("{}\t{}\t{}\t{}", user.id, user.email, user.role, user.name);
            }
            println!("page {} ({} users)", users.page, users.total);
        }
        Commands::Route { path } => {
            let guard = RouteGuard::new(open_session(&config)?);
            if path == paths::HOME {
                println!("redirect -> {}", guard.resolve_root().to);
                return Ok(());
            }
            match guard.check(&Destination::parse(&path)) {
                GuardDecision::Allow => println!("allow {}", path),
                GuardDecision::Redirect(redirect) => match redirect.state {
                    Some(state) => println!("redirect -> {} (from {})", redirect.to, state.from),
                    None => println!("redirect -> {}", redirect.to),
                },
            }
        }
    }

    Ok(())
}
