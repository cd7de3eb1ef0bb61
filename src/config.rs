//! Configuration manager for users-api.

use std::fs::File;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MIN_AGE: u32 = 18;
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors that may occur while building the configuration.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("URL is invalid: {0}")]
    Url(#[from] url::ParseError),
    #[error("cannot set credentials on `{0}`")]
    Credentials(String),
    #[error("invalid value `{value}` for `{name}` environment variable")]
    Env { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Listening address.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Related to user registration rules.
    #[serde(default)]
    pub users: Users,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    #[serde(skip)]
    path: PathBuf,
}

/// User rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Users {
    /// Minimal age, in whole years, to own an account.
    pub min_age: u32,
}

impl Default for Users {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_AGE,
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Connection URL, e.g. `postgres://localhost:5432/users`.
    pub url: String,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

fn default_name() -> String {
    env!("CARGO_PKG_NAME").to_owned()
}

fn default_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: default_name(),
            address: default_address(),
            users: Users::default(),
            postgres: None,
            path: PathBuf::default(),
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Self {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        }
    }

    /// Apply environment overrides through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port = port.parse::<u16>().map_err(|_| Error::Env {
                name: "PORT",
                value: port,
            })?;
            self.address.set_port(port);
        }

        if let Some(min_age) = lookup("USER_MIN_AGE") {
            self.users.min_age = min_age.parse::<u32>().map_err(|_| Error::Env {
                name: "USER_MIN_AGE",
                value: min_age,
            })?;
        }

        let url = lookup("DATABASE_URL");
        let username = lookup("DATABASE_USERNAME");
        let password = lookup("DATABASE_PASSWORD");
        if url.is_some() || username.is_some() || password.is_some() {
            let postgres = self.postgres.get_or_insert_with(Postgres::default);
            if let Some(url) = url {
                postgres.url = url;
            }
            postgres.username = username.or(postgres.username.take());
            postgres.password = password.or(postgres.password.take());
        }

        Ok(self)
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file cannot be read, using defaults");
        Self::default()
    }
}

impl Postgres {
    /// Build the connection URL with credentials injected.
    pub fn connection_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.url)?;

        if let Some(username) = &self.username {
            url.set_username(username)
                .map_err(|_| Error::Credentials(self.url.clone()))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| Error::Credentials(self.url.clone()))?;
        }

        Ok(url)
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }
}
