//! HTTP transport for the Frota identity service.
//!
//! Exposes an axum [`Router`] over any [`PrincipalStore`]. Each route fixes
//! the principal domain its bearer token must belong to; the extractors in
//! [`auth`] resolve and gate the caller before the handler body runs.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod validate;

pub use error::ApiError;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use chrono::TimeDelta;
use frota_auth::{AuthorizationGuard, Authenticator, CredentialService, IdentityResolver, TokenService};
use frota_core::{relationship::RelationshipManager, store::PrincipalStore};
use serde::Deserialize;

use handlers::{clients, drivers, employees, individuals, organizations};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FROTA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  pub store_path:        PathBuf,
  /// HMAC key for bearer tokens. Fixed for the life of the process.
  pub token_secret:      String,
  #[serde(default = "default_ttl")]
  pub token_ttl_minutes: i64,
  #[serde(default)]
  pub cors_origins:      Vec<String>,
  /// Admin created at startup when no employee exists yet.
  #[serde(default)]
  pub bootstrap_admin:   Option<BootstrapAdmin>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
  pub email:         String,
  pub full_name:     String,
  /// PHC string, e.g. from `frota-server --hash-password`.
  pub password_hash: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_ttl() -> i64 { 30 }

/// `FROTA_TOKEN_SECRET` sets `token_secret`; nested keys use a double
/// underscore, as in `FROTA_BOOTSTRAP_ADMIN__EMAIL`.
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("FROTA")
    .prefix_separator("_")
    .separator("__")
}

impl ServerConfig {
  /// Read `path` (optional) layered under [`environment`].
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::load_with(path, environment())
  }

  pub fn load_with(path: &Path, env: config::Environment) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  /// Token lifetime, or `None` when `token_ttl_minutes` is not a positive
  /// number of minutes chrono can represent.
  pub fn token_ttl(&self) -> Option<TimeDelta> {
    TimeDelta::try_minutes(self.token_ttl_minutes).filter(|ttl| *ttl > TimeDelta::zero())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:       Arc<S>,
  pub config:      Arc<ServerConfig>,
  pub credentials: Arc<CredentialService>,
  pub tokens:      Arc<TokenService>,
  token_ttl:       TimeDelta,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      config:      Arc::clone(&self.config),
      credentials: Arc::clone(&self.credentials),
      tokens:      Arc::clone(&self.tokens),
      token_ttl:   self.token_ttl,
    }
  }
}

impl<S> AppState<S>
where
  S: PrincipalStore,
{
  /// An unusable `token_ttl_minutes` falls back to the default lifetime;
  /// the binary refuses such a config before getting here.
  pub fn new(store: Arc<S>, config: ServerConfig, credentials: CredentialService) -> Self {
    let tokens = TokenService::new(config.token_secret.as_bytes());
    let token_ttl = config
      .token_ttl()
      .unwrap_or_else(|| TimeDelta::minutes(default_ttl()));
    Self {
      store,
      config: Arc::new(config),
      credentials: Arc::new(credentials),
      tokens: Arc::new(tokens),
      token_ttl,
    }
  }

  pub fn authenticator(&self) -> Authenticator<S> {
    Authenticator::new(Arc::clone(&self.store), Arc::clone(&self.credentials))
  }

  pub fn guard(&self) -> AuthorizationGuard<S> {
    AuthorizationGuard::new(IdentityResolver::new(
      Arc::clone(&self.store),
      Arc::clone(&self.tokens),
    ))
  }

  pub fn relationships(&self) -> RelationshipManager<S> {
    RelationshipManager::new(Arc::clone(&self.store))
  }

  pub fn token_ttl(&self) -> TimeDelta { self.token_ttl }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the service.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PrincipalStore + 'static,
{
  Router::new()
    .route("/", get(handlers::root))
    // Employee domain
    .route("/auth/token",                         post(employees::login::<S>))
    .route("/auth/employees/me",                  get(employees::me))
    .route("/auth/employees",                     get(employees::list::<S>).post(employees::create::<S>))
    .route("/auth/employees/{id}",                patch(employees::update::<S>))
    // Person domain
    .route("/clients/token",                      post(clients::login::<S>))
    .route("/clients/me",                         get(clients::me))
    .route("/clients/{id}/status",                patch(clients::set_status::<S>))
    .route("/clients/individuals",                get(individuals::list::<S>).post(individuals::create::<S>))
    .route(
      "/clients/individuals/{id}",
      get(individuals::get_one::<S>)
        .put(individuals::update::<S>)
        .delete(individuals::remove::<S>),
    )
    .route("/clients/organizations",              get(organizations::list::<S>).post(organizations::create::<S>))
    .route(
      "/clients/organizations/{id}",
      get(organizations::get_one::<S>)
        .put(organizations::update::<S>)
        .delete(organizations::remove::<S>),
    )
    .route("/clients/organizations/me/drivers",   get(drivers::list::<S>).post(drivers::associate::<S>))
    .route("/clients/organizations/me/drivers/{individual_id}", delete(drivers::remove::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
