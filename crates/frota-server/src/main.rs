//! frota-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `FROTA_*` environment variables (`FROTA_TOKEN_SECRET`,
//! `FROTA_BOOTSTRAP_ADMIN__EMAIL`), opens the SQLite store, and serves the
//! identity API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `bootstrap_admin.password_hash`:
//!
//! ```
//! cargo run -p frota-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::http::HeaderValue;
use clap::Parser;
use frota_auth::CredentialService;
use frota_core::{principal::NewEmployee, store::PrincipalStore};
use frota_server::{AppState, BootstrapAdmin, ServerConfig};
use frota_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Frota identity server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let credentials = CredentialService::default();

  if cli.hash_password {
    let password = read_password()?;
    let hash = credentials.hash(&password)?;
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  if server_cfg.token_ttl().is_none() {
    anyhow::bail!(
      "token_ttl_minutes must be a positive number of minutes, got {}",
      server_cfg.token_ttl_minutes
    );
  }
  if server_cfg.token_secret.len() < 32 {
    tracing::warn!("token_secret is shorter than 32 bytes");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(admin) = &server_cfg.bootstrap_admin {
    bootstrap(&store, admin).await?;
  }

  let cors = cors_layer(&server_cfg.cors_origins)?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(Arc::new(store), server_cfg, credentials);

  let mut app = frota_server::router(state).layer(TraceLayer::new_for_http());
  if let Some(cors) = cors {
    app = app.layer(cors);
  }

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Create the configured admin when the employee table is still empty.
async fn bootstrap(store: &SqliteStore, admin: &BootstrapAdmin) -> anyhow::Result<()> {
  let existing = store
    .list_employees()
    .await
    .context("failed to list employees")?;
  if !existing.is_empty() {
    return Ok(());
  }

  let employee = store
    .insert_employee(NewEmployee {
      email:         admin.email.clone(),
      full_name:     admin.full_name.clone(),
      password_hash: admin.password_hash.clone(),
      is_active:     true,
      is_admin:      true,
    })
    .await
    .context("failed to create bootstrap admin")?;
  tracing::info!(employee = %employee.id, email = %employee.email, "bootstrap admin created");
  Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<Option<CorsLayer>> {
  if origins.is_empty() {
    return Ok(None);
  }
  let origins = origins
    .iter()
    .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
    .collect::<anyhow::Result<Vec<_>>>()?;
  Ok(Some(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_methods(Any)
      .allow_headers(Any),
  ))
}

/// Read one password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
