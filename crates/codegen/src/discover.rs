//! Finding query files under the configured root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;

/// A subdirectory of the query root; becomes one generated mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryModule {
    pub name: String,
    pub queries: Vec<QueryFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryFile {
    /// File stem, used as the query name.
    pub name: String,
    pub path: PathBuf,
}

/// Lists the modules under `root`, sorted by name, each with its `.sql`
/// files sorted by stem. Modules without queries are left out.
pub fn discover(root: &Path) -> Result<Vec<QueryModule>> {
    let mut modules = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 module directory");
            continue;
        };

        let queries = discover_queries(entry.path())?;
        if queries.is_empty() {
            continue;
        }

        modules.push(QueryModule {
            name: name.to_string(),
            queries,
        });
    }

    Ok(modules)
}

fn discover_queries(dir: &Path) -> Result<Vec<QueryFile>> {
    let mut queries = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let is_sql = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));

        if !entry.file_type().is_file() || !is_sql {
            continue;
        }

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            queries.push(QueryFile {
                name: stem.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    Ok(queries)
}
