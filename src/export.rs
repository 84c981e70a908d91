//! Per-bag export: plan, run the filter tool, aggregate results

use chrono::NaiveDateTime;
use flume::Receiver;
use prettytable::{Table, row};
use rayon::prelude::*;
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::command::{DEFAULT_FILTER_TOOL, FilterCommand, build_command, build_filter_expression};
use crate::error::FilterError;
use crate::rosbags_io::BagDescriptor;

/// Options for exporting filtered bags
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Program invoked as `<tool> filter <in> <out> <expr>`
    pub tool: String,
    /// Run bags concurrently; results still follow input order
    pub parallel: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            tool: DEFAULT_FILTER_TOOL.to_string(),
            parallel: false,
        }
    }
}

/// Runs one filter command to completion.
pub trait FilterRunner: Send + Sync {
    fn run(&self, command: &FilterCommand) -> Result<(), FilterError>;
}

/// Spawns the filter tool directly, without a shell, and checks its exit status.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl FilterRunner for ProcessRunner {
    fn run(&self, command: &FilterCommand) -> Result<(), FilterError> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|e| FilterError::ExternalProcessFailure {
                bag: command.input_path.clone(),
                reason: format!("could not spawn {}: {}", command.program, e),
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("no error output");
        Err(FilterError::ExternalProcessFailure {
            bag: command.input_path.clone(),
            reason: format!("{} exited with {}: {}", command.program, output.status, detail.trim()),
        })
    }
}

/// Validated export work, detached from the session so it can run on a worker.
///
/// Every loaded bag is filtered over the same effective topic set, so each
/// one gets its own output file even if it holds none of those topics.
#[derive(Debug, Clone)]
pub struct ExportJob {
    bags: Vec<PathBuf>,
    topics: Vec<String>,
    output_dir: PathBuf,
    options: ExportOptions,
    now: NaiveDateTime,
}

#[derive(Debug)]
pub enum ExportStatus {
    Written,
    Failed(FilterError),
}

#[derive(Debug)]
pub struct BagExport {
    pub bag_path: PathBuf,
    /// `None` only when no command could be built for the bag.
    pub output_path: Option<PathBuf>,
    pub status: ExportStatus,
}

/// Per-bag results in input bag order.
#[derive(Debug)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    pub topics: Vec<String>,
    pub results: Vec<BagExport>,
}

impl ExportJob {
    pub fn new(
        bags: &[BagDescriptor],
        topics: BTreeSet<String>,
        output_dir: PathBuf,
        options: &ExportOptions,
        now: NaiveDateTime,
    ) -> Result<Self, FilterError> {
        let topics: Vec<String> = topics.into_iter().collect();
        // reject the selection as a whole before any bag is looked at
        build_filter_expression(&topics)?;

        Ok(Self {
            bags: bags.iter().map(|b| b.path.clone()).collect(),
            topics,
            output_dir,
            options: options.clone(),
            now,
        })
    }

    /// Effective topics, sorted.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Commands that `run` would execute, one per bag, without side effects.
    pub fn plan(&self) -> Vec<Result<FilterCommand, FilterError>> {
        self.bags
            .iter()
            .map(|bag| {
                build_command(
                    &self.options.tool,
                    bag,
                    &self.output_dir,
                    &self.topics,
                    self.now,
                )
            })
            .collect()
    }

    /// Export every bag; one bag failing does not stop the others.
    pub fn run(&self, runner: &dyn FilterRunner) -> ExportReport {
        // output collisions are settled in input order before anything runs
        let mut claimed = HashSet::new();
        let items: Vec<Pending> = self
            .bags
            .iter()
            .zip(self.plan())
            .map(|(bag, planned)| match planned {
                Err(e) => Pending::Done(BagExport::failed(bag, None, e)),
                Ok(cmd) => {
                    let out = cmd.output_path.clone();
                    if out.exists() || !claimed.insert(out.clone()) {
                        Pending::Done(BagExport::failed(
                            bag,
                            Some(out.clone()),
                            FilterError::OutputExists(out),
                        ))
                    } else {
                        Pending::Run(cmd)
                    }
                }
            })
            .collect();

        let execute = |item: Pending| -> BagExport {
            match item {
                Pending::Done(result) => result,
                Pending::Run(cmd) => run_one(runner, cmd),
            }
        };
        let results: Vec<BagExport> = if self.options.parallel {
            items.into_par_iter().map(execute).collect()
        } else {
            items.into_iter().map(execute).collect()
        };

        let report = ExportReport {
            output_dir: self.output_dir.clone(),
            topics: self.topics.clone(),
            results,
        };
        tracing::info!(
            "export finished: {} written, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    /// Run on a worker thread; the report arrives on the returned channel.
    pub fn spawn<R>(self, runner: R) -> Receiver<ExportReport>
    where
        R: FilterRunner + 'static,
    {
        let (tx, rx) = flume::bounded(1);
        std::thread::spawn(move || {
            let report = self.run(&runner);
            if tx.send(report).is_err() {
                tracing::warn!("export report dropped: receiver is gone");
            }
        });
        rx
    }
}

enum Pending {
    Done(BagExport),
    Run(FilterCommand),
}

fn run_one(runner: &dyn FilterRunner, cmd: FilterCommand) -> BagExport {
    tracing::info!("running: {}", cmd.to_shell_string());
    let status = match runner.run(&cmd) {
        Ok(()) => ExportStatus::Written,
        Err(e) => {
            tracing::warn!("{}", e);
            ExportStatus::Failed(e)
        }
    };
    BagExport {
        bag_path: cmd.input_path,
        output_path: Some(cmd.output_path),
        status,
    }
}

impl BagExport {
    fn failed(bag: &Path, output_path: Option<PathBuf>, err: FilterError) -> Self {
        tracing::warn!("{}", err);
        Self {
            bag_path: bag.to_path_buf(),
            output_path,
            status: ExportStatus::Failed(err),
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self.status, ExportStatus::Written)
    }

    pub fn error(&self) -> Option<&FilterError> {
        match &self.status {
            ExportStatus::Failed(e) => Some(e),
            ExportStatus::Written => None,
        }
    }

    fn status_label(&self) -> String {
        match &self.status {
            ExportStatus::Written => "written".to_string(),
            ExportStatus::Failed(e) => format!("FAILED: {}", e),
        }
    }
}

impl ExportReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_written()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.error().is_some()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["Bag", "Output", "Status"]);
        for r in &self.results {
            let output = r
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            table.add_row(row![r.bag_path.display(), output, r.status_label()]);
        }
        table
    }

    pub fn to_json(&self) -> Value {
        let results: Vec<Value> = self
            .results
            .iter()
            .map(|r| {
                let status = match r.status {
                    ExportStatus::Written => "written",
                    ExportStatus::Failed(_) => "failed",
                };
                json!({
                    "bag": r.bag_path,
                    "output": r.output_path,
                    "status": status,
                    "error": r.error().map(|e| e.to_string()),
                })
            })
            .collect();
        json!({
            "output_dir": self.output_dir,
            "topics": self.topics,
            "succeeded": self.succeeded(),
            "failed": self.failed(),
            "results": results,
        })
    }
}
