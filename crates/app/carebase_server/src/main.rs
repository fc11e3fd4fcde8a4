//! Carebase API server binary.
//!
//! Prints `{"port": N}` to stdout once the listener is bound.

mod shutdown;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use carebase_api::AppState;
use carebase_api::config::ApiConfig;
use carebase_api::services::auth::bootstrap_root;
use carebase_core::mail::{LogMailer, Mailer, SmtpMailer, SmtpSettings};
use carebase_core::store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};

use crate::shutdown::Shutdown;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "carebase_server", about = "Carebase hospital API server")]
struct Args {
    /// Port to listen on; overrides the port of `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL. Without it, principals live in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// SMTP relay host. Without it, reset emails are only logged.
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    smtp_port: u16,

    #[arg(long, env = "SMTP_USERNAME", default_value = "")]
    smtp_username: String,

    #[arg(long, env = "SMTP_PASSWORD", default_value = "", hide_env_values = true)]
    smtp_password: String,

    #[arg(long, env = "MAIL_FROM", default_value = "Carebase Hospital <noreply@carebase.local>")]
    mail_from: String,

    /// Root account created at startup when no root exists.
    #[arg(long, env = "ROOT_EMAIL")]
    root_email: Option<String>,

    #[arg(long, env = "ROOT_PASSWORD", hide_env_values = true)]
    root_password: Option<String>,

    #[arg(long, env = "ROOT_NAME")]
    root_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Write logs to stderr so stdout is reserved for the JSON port message.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,carebase_api=debug,carebase_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(port) = args.port {
        let host = config
            .bind_addr
            .rsplit_once(':')
            .map_or("127.0.0.1", |(host, _)| host);
        config.bind_addr = format!("{host}:{port}");
    }

    info!(
        bind_addr = %config.bind_addr,
        environment = %config.environment,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window.as_secs(),
        "starting carebase_server"
    );

    let store: Arc<dyn CredentialStore> = match &args.database_url {
        Some(url) => {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            carebase_core::migrate::migrate(&pool).await?;
            Arc::new(PgCredentialStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, principals are kept in memory and lost on exit");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match args.smtp_host {
        Some(host) => {
            info!(%host, port = args.smtp_port, "using SMTP mailer");
            Arc::new(SmtpMailer::new(SmtpSettings {
                host,
                port: args.smtp_port,
                username: args.smtp_username,
                password: args.smtp_password,
                from: args.mail_from,
            })?)
        }
        None => {
            warn!("SMTP_HOST not set, reset emails are logged instead of sent");
            Arc::new(LogMailer)
        }
    };

    if let (Some(email), Some(password)) = (&args.root_email, &args.root_password) {
        bootstrap_root(store.as_ref(), email, password, args.root_name.as_deref()).await?;
    }

    let shutdown = Shutdown::new();
    shutdown.install_panic_hook();
    tokio::spawn(shutdown.clone().listen_for_signals());

    let state = AppState::new(config.clone(), store, mailer);
    let app = carebase_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    println!("{}", serde_json::json!({"port": local_addr.port()}));
    info!(addr = %local_addr, "REST API listening");

    let token = shutdown.token();
    // Peer addresses key the per-client rate limiter.
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await?;

    info!("server stopped");
    if shutdown.is_fatal() {
        std::process::exit(1);
    }
    Ok(())
}
