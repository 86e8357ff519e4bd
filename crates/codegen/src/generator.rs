use crate::config::Config;
use crate::discover::{discover, QueryModule};
use crate::error::{CodegenError, Result};
use crate::render::{
    render_interface, render_mod, render_storage, InterfaceOption, StorageOption, STORAGE_MODULE,
};
use indicatif::{ProgressBar, ProgressStyle};
use queryfn_core::compiler::probe::Probe;
use queryfn_core::compiler::{self, QueryDescriptor};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one query file.
#[derive(Debug)]
pub struct FileOutcome {
    pub module: String,
    pub name: String,
    pub path: PathBuf,
    pub result: Result<QueryDescriptor>,
}

/// Per-file outcomes of a run, in processing order.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub outcomes: Vec<FileOutcome>,
    /// Files written by [`Generator::generate`]; empty for a check.
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Successful descriptors grouped by module, preserving order.
    pub fn modules(&self) -> Vec<(&str, Vec<&QueryDescriptor>)> {
        let mut modules: Vec<(&str, Vec<&QueryDescriptor>)> = Vec::new();
        for outcome in &self.outcomes {
            let Ok(descriptor) = &outcome.result else {
                continue;
            };
            let same_module = modules
                .last()
                .is_some_and(|(module, _)| *module == outcome.module.as_str());
            match modules.last_mut() {
                Some((_, descriptors)) if same_module => descriptors.push(descriptor),
                _ => modules.push((outcome.module.as_str(), vec![descriptor])),
            }
        }
        modules
    }
}

pub struct Generator<'a> {
    config: &'a Config,
    progress: bool,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            progress: false,
        }
    }

    /// Shows a progress bar over the files while compiling.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Compiles every discovered query without writing anything.
    pub async fn check<P: Probe>(&self, probe: &mut P) -> Result<GenerationReport> {
        let modules = discover(&self.config.queries.path)?;
        Ok(self.compile(&modules, probe).await)
    }

    /// Compiles every discovered query and writes the generated modules.
    pub async fn generate<P: Probe>(&self, probe: &mut P) -> Result<GenerationReport> {
        let mut report = self.check(probe).await?;
        report.written = self.write_output(&report)?;

        if self.config.output.format && !report.written.is_empty() {
            format_files(&report.written)?;
        }

        Ok(report)
    }

    /// Runs the files one after another on the single `probe`. A failing
    /// file is recorded and the run moves on.
    async fn compile<P: Probe>(&self, modules: &[QueryModule], probe: &mut P) -> GenerationReport {
        let total: usize = modules.iter().map(|m| m.queries.len()).sum();
        let bar = self.progress_bar(total as u64);
        let mut report = GenerationReport::default();

        for module in modules {
            for query in &module.queries {
                bar.set_message(format!("{}/{}", module.name, query.name));

                let result = match fs::read_to_string(&query.path) {
                    Ok(content) => compiler::build(&query.name, &content, probe)
                        .await
                        .map_err(CodegenError::from),
                    Err(err) => Err(err.into()),
                };

                match &result {
                    Ok(descriptor) => tracing::debug!(
                        module = %module.name,
                        query = %query.name,
                        fields = descriptor.result.fields.len(),
                        "compiled query"
                    ),
                    Err(err) => tracing::warn!(
                        module = %module.name,
                        query = %query.name,
                        error = %err,
                        "query failed"
                    ),
                }

                report.outcomes.push(FileOutcome {
                    module: module.name.clone(),
                    name: query.name.clone(),
                    path: query.path.clone(),
                    result,
                });
                bar.inc(1);
            }
        }

        bar.finish_and_clear();
        report
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }

    fn write_output(&self, report: &GenerationReport) -> Result<Vec<PathBuf>> {
        let dir = &self.config.output.path;
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let mut storage = StorageOption::default();
        let mut module_names = Vec::new();

        for (module, descriptors) in report.modules() {
            let descriptors: Vec<QueryDescriptor> = descriptors.into_iter().cloned().collect();
            let option = InterfaceOption::from_descriptors(&self.config.output.package, module, &descriptors);

            storage.entries.extend(option.storage_entries());
            let path = write_module(dir, &option.module, &render_interface(&option))?;
            tracing::info!(module, path = %path.display(), "wrote mapper");

            module_names.push(option.module);
            written.push(path);
        }

        written.push(write_module(dir, STORAGE_MODULE, &render_storage(&storage))?);

        module_names.push(STORAGE_MODULE.to_string());
        module_names.sort();
        let mod_path = dir.join("mod.rs");
        fs::write(&mod_path, render_mod(&module_names))?;
        written.push(mod_path);

        Ok(written)
    }
}

fn write_module(dir: &Path, module: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}.rs", module));
    fs::write(&path, content)?;
    Ok(path)
}

fn format_files(paths: &[PathBuf]) -> Result<()> {
    let output = std::process::Command::new("rustfmt")
        .arg("--edition")
        .arg("2021")
        .args(paths)
        .output()
        .map_err(|e| CodegenError::Format(e.to_string()))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(CodegenError::Format(error.to_string()));
    }

    Ok(())
}
