use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use studio_api::users::UserCreate;
use studio_api::{AppConfig, DatabaseConfig, UserStore, create_app};

#[derive(Parser)]
#[command(name = "studio-api")]
#[command(about = "User resource API for the Studio design application")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the user API server
    Serve {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, default_value = "0.0.0.0:8080", env = "STUDIO_BIND")]
        bind: String,
        #[arg(long, default_value = "memory", env = "STUDIO_DB_URL")]
        db_url: String,
        /// Path to the JSON config file (defaults to STUDIO_CONFIG or ./studio.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Initialize the database schema
    Init {
        #[arg(long, default_value = "memory", env = "STUDIO_DB_URL")]
        db_url: String,
    },
    /// Create a user record (users are never created through the HTTP API)
    CreateUser {
        /// Application-level user id
        id: String,
        /// Initial session token(s) for the user
        #[arg(long = "token")]
        tokens: Vec<String>,
        /// Role tag(s) to grant, e.g. ADMIN
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Cached profile image URL
        #[arg(long)]
        profile_image_url: Option<String>,
        #[arg(long, default_value = "memory", env = "STUDIO_DB_URL")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("studio_api=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            db_url,
            config,
        } => {
            let app_config = match config {
                Some(path) => AppConfig::from_file(&path)?,
                None => AppConfig::load()?,
            };

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for user API server: {}", db_config.url);

            let app = create_app(db_config, app_config).await?;

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("User API server listening on http://{}", bind);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = studio_api::create_connection(db_config).await?;
            studio_api::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateUser {
            id,
            tokens,
            roles,
            profile_image_url,
            db_url,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = studio_api::create_connection(db_config).await?;
            studio_api::ensure_schema(&db).await?;

            let store = UserStore::new(db);
            let user = store
                .create(UserCreate {
                    user_id: id.into(),
                    session_tokens: tokens.into_iter().map(Into::into).collect(),
                    roles,
                    profile_image_url,
                    ..Default::default()
                })
                .await?;

            println!("User created successfully!");
            println!();
            println!("  Id:     {}", user.user_id);
            println!("  Roles:  {}", user.normalized_roles().join(", "));
            println!("  Tokens: {}", user.session_tokens.len());
        }
    }

    Ok(())
}
