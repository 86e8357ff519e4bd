#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::Path;

use queryfn_codegen::Config;
use queryfn_core::prelude::*;
use tempfile::TempDir;

/// A probe that answers from a script keyed by the exact probe SQL.
#[derive(Default)]
pub struct ScriptedProbe {
    responses: HashMap<String, Result<Vec<ProbeColumn>, String>>,
    pub calls: Vec<String>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, sql: &str, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| ProbeColumn::new(*name, *ty))
            .collect();
        self.responses.insert(sql.to_string(), Ok(columns));
        self
    }

    pub fn failure(mut self, sql: &str, message: &str) -> Self {
        self.responses.insert(sql.to_string(), Err(message.to_string()));
        self
    }
}

impl Probe for ScriptedProbe {
    fn probe(
        &mut self,
        sql: &str,
        _bindings: &[Value],
    ) -> impl Future<Output = Result<Vec<ProbeColumn>, sqlx::Error>> {
        self.calls.push(sql.to_string());
        let response = match self.responses.get(sql) {
            Some(Ok(columns)) => Ok(columns.clone()),
            Some(Err(message)) => Err(sqlx::Error::Protocol(message.clone())),
            None => Ok(Vec::new()),
        };
        std::future::ready(response)
    }
}

/// A project directory with a query tree and a config pointing into it.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::create_dir_all(dir.path().join("queries")).expect("queries dir");
        Self { dir }
    }

    pub fn query(self, module: &str, name: &str, content: &str) -> Self {
        let module_dir = self.dir.path().join("queries").join(module);
        fs::create_dir_all(&module_dir).expect("module dir");
        fs::write(module_dir.join(format!("{}.sql", name)), content).expect("query file");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> std::path::PathBuf {
        self.dir.path().join("generated")
    }

    pub fn config(&self) -> Config {
        let config_path = self.dir.path().join("queryfn.toml");
        let content = format!(
            r#"version = "1.0"

[database]
url = "postgres://probe@localhost/unused"

[queries]
path = {queries:?}

[output]
path = {output:?}
package = "crate::queries"
"#,
            queries = self.dir.path().join("queries").display().to_string(),
            output = self.output().display().to_string(),
        );
        fs::write(&config_path, content).expect("config file");
        Config::load(&config_path).expect("config should load")
    }
}
