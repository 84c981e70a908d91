//! Filter command - load, select and export filtered copies of bags

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::export::{ExportOptions, ProcessRunner};
use crate::inspect::print_conflicts;
use crate::rosbags_io::RosbagReader;
use crate::selection::Grouping;
use crate::session::{Session, resolve_output_dir};

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Paths to the input .bag files
    pub bags: Vec<String>,
    /// Output directories as given; exactly one is accepted
    pub out_dirs: Vec<String>,
    /// Whether selection keys are topics or message types
    pub grouping: Grouping,
    /// Start from every key selected
    pub select_all: bool,
    /// Keys toggled after `select_all`
    pub toggle: Vec<String>,
    /// Regex of keys added after the toggles
    pub pattern: Option<String>,
    /// Invert once all other edits are applied
    pub invert: bool,
    /// Print commands instead of running them
    pub dry_run: bool,
    /// Emit the report as JSON
    pub json: bool,
    pub export: ExportOptions,
}

pub fn filter_bags(options: &FilterOptions) -> Result<()> {
    let mut session = Session::new();
    session.load(&options.bags, &RosbagReader)?;
    print_conflicts(session.catalog());
    apply_selection(&mut session, options)?;

    let out_dir = resolve_output_dir(&options.out_dirs)?;
    let job = session.begin_export(&out_dir, &options.export)?;
    tracing::info!(
        "exporting {} topic(s) from {} bag(s) into {}",
        job.topics().len(),
        session.bags().len(),
        out_dir.display()
    );

    if options.dry_run {
        for planned in job.plan() {
            match planned {
                Ok(cmd) => println!("{}", cmd.to_shell_string()),
                Err(e) => println!("# {}", e),
            }
        }
        session.finish_export()?;
        return Ok(());
    }

    let report = job.spawn(ProcessRunner).recv();
    session.finish_export()?;
    let report = report.context("export worker stopped without a report")?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        report.to_table().printstd();
        println!(
            "{} written, {} failed -> {}",
            report.succeeded(),
            report.failed(),
            report.output_dir.display()
        );
    }

    if !report.is_success() {
        bail!("{} of {} bag(s) failed to export", report.failed(), report.results.len());
    }
    Ok(())
}

/// Apply edits in order: select-all, toggles, regex matches, invert.
pub fn apply_selection(session: &mut Session, options: &FilterOptions) -> Result<()> {
    session.set_grouping(options.grouping)?;
    if options.select_all {
        session.select_all()?;
    }
    for key in &options.toggle {
        session.toggle(key)?;
    }
    if let Some(pattern) = &options.pattern {
        let re = Regex::new(pattern).with_context(|| format!("invalid --match regex: {}", pattern))?;
        let added = session.select_matching(&re)?;
        tracing::info!("--match {} selected {} more {} key(s)", pattern, added, options.grouping);
    }
    if options.invert {
        session.invert()?;
    }
    Ok(())
}
