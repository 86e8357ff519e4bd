mod config;
mod discover;
mod error;
mod generator;
pub mod render;

pub use config::{Config, DatabaseConfig, OutputConfig, QueriesConfig, CONFIG_FILE, DATABASE_URL_ENV};
pub use discover::{discover, QueryFile, QueryModule};
pub use error::{CodegenError, Result};
pub use generator::{FileOutcome, GenerationReport, Generator};

use sqlx::{Connection, PgConnection};
use std::path::{Path, PathBuf};

/// Opens the single probe connection every query of a run goes through.
pub async fn connect(config: &Config) -> Result<PgConnection> {
    let options = config.database.connect_options()?;
    Ok(PgConnection::connect_with(&options).await?)
}

pub async fn check(config: &Config) -> Result<GenerationReport> {
    let mut conn = connect(config).await?;
    Generator::new(config).with_progress(true).check(&mut conn).await
}

pub async fn generate(config: &Config) -> Result<GenerationReport> {
    let mut conn = connect(config).await?;
    Generator::new(config).with_progress(true).generate(&mut conn).await
}

/// Prints one line per failed file.
pub fn print_failures(report: &GenerationReport) {
    use console::style;

    for outcome in report.failed() {
        if let Err(err) = &outcome.result {
            println!(
                "  {} {}/{}: {}",
                style("✖").red(),
                outcome.module,
                outcome.name,
                style(err.report()).red()
            );
        }
    }
}

pub async fn watch(config: &Config) -> Result<()> {
    use notify::{RecommendedWatcher, RecursiveMode, Watcher, Config as NotifyConfig};
    use console::style;

    println!("{}", style("queryfn").green().bold());
    println!("  {} Initial generation...", style("➜").green());
    report_run(generate(config).await);

    println!("  {} Watching for changes...", style("➜").cyan());
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.blocking_send(res);
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(&config.queries.path, RecursiveMode::Recursive)?;

    let output_dir = resolve(&config.output.path);
    let current_dir = std::env::current_dir()?;

    while let Some(res) = rx.recv().await {
        match res {
            Ok(event) => {
                if !triggers_generation(&event, &output_dir) {
                    continue;
                }

                if let Some(changed_path) = event.paths.first() {
                    let relative_path = changed_path
                        .strip_prefix(&current_dir)
                        .unwrap_or(changed_path)
                        .display();

                    println!("\n{} Changed: {}",
                        style("[GEN]").yellow().bold(),
                        style(relative_path).cyan()
                    );
                }

                report_run(generate(config).await);
            }
            Err(e) => println!("  {} Watch error: {}",
                style("✖").red(),
                style(e).red()
            ),
        }
    }

    Ok(())
}

/// Absolute form of `path`, canonical when it still exists.
fn resolve(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// A query file was created, removed, renamed or rewritten somewhere other
/// than the output directory (`output_dir` is already resolved).
fn triggers_generation(event: &notify::Event, output_dir: &Path) -> bool {
    use notify::event::{EventKind, ModifyKind};

    let changes_files = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    );

    changes_files
        && event
            .paths
            .iter()
            .any(|path| !resolve(path).starts_with(output_dir))
}

fn report_run(result: Result<GenerationReport>) {
    use console::style;

    match result {
        Ok(report) if report.is_success() => println!("  {} {} queries generated",
            style("➜").green(),
            report.outcomes.len()
        ),
        Ok(report) => {
            println!("  {} {} of {} queries failed",
                style("✖").red(),
                report.failed().count(),
                report.outcomes.len()
            );
            print_failures(&report);
        }
        Err(e) => println!("  {} Generation failed: {}",
            style("✖").red(),
            style(e).red()
        ),
    }
}
