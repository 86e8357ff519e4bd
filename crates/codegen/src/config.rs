use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};
use crate::error::{CodegenError, Result};

pub const CONFIG_FILE: &str = "queryfn.toml";

/// Overrides the `[database]` section when set.
pub const DATABASE_URL_ENV: &str = "QUERYFN_DATABASE_URL";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: String,
    pub database: DatabaseConfig,
    pub queries: QueriesConfig,
    pub output: OutputConfig,
}

/// Connection to the probe database.
///
/// Every query, including inserts, updates and deletes, is executed once
/// against this database with its default parameters. Point it at a
/// schema-only or disposable instance.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueriesConfig {
    /// Root directory; each subdirectory is one mapper module.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the generated Rust modules.
    pub path: PathBuf,
    /// Prefix of the qualified names in the storage table.
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default)]
    pub format: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_package() -> String {
    "queries".to_string()
}

impl Config {
    pub fn find_and_load(start_dir: &Path) -> Result<(Self, PathBuf)> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load(&config_path)?;
                return Ok((config, current_dir));
            }

            if !current_dir.pop() {
                return Err(CodegenError::ConfigNotFound(start_dir.to_path_buf()));
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Anchors relative query and output paths at the config file's directory.
    fn resolve_paths(&mut self, base: &Path) {
        self.queries.path = base.join(&self.queries.path);
        self.output.path = base.join(&self.output.path);
    }

    fn validate(&self) -> Result<()> {
        if !self.queries.path.is_dir() {
            return Err(CodegenError::InvalidPath(self.queries.path.clone()));
        }

        if let Some(parent) = self.output.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(CodegenError::InvalidPath(parent.to_path_buf()));
            }
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Resolves the connect options: environment URL, then `url`, then the
    /// individual fields.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            return Ok(url.parse()?);
        }

        if let Some(url) = &self.url {
            return Ok(url.parse()?);
        }

        let mut options = PgConnectOptions::new().host(&self.host).port(self.port);
        if let Some(username) = &self.username {
            options = options.username(username);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        Ok(options)
    }
}
