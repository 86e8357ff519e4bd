use queryfn_core::compiler::CompilerError;
use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Config file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Compiler(#[from] CompilerError),

    #[error("Storage parse error: {0}")]
    Storage(String),

    #[error("Rust syntax error: {0}")]
    Syntax(#[from] syn::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl CodegenError {
    /// Multi-line description for terminal output.
    pub fn report(&self) -> String {
        match self {
            Self::Compiler(err) => err.report(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;
