//! A load → select → export cycle over one or more bags

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::catalog::TopicCatalog;
use crate::error::FilterError;
use crate::export::{ExportJob, ExportOptions, ExportReport, FilterRunner};
use crate::rosbags_io::{BagDescriptor, BagReader};
use crate::selection::{Grouping, SelectionSet};
use crate::state::{Operation, SessionEvent, SessionState};

/// Owns the loaded bags, their catalog, the selection and the session state.
///
/// Every mutating call consults the state first. A new load replaces the
/// bags, catalog and selection together.
#[derive(Debug, Clone, Default)]
pub struct Session {
    bags: Vec<BagDescriptor>,
    catalog: TopicCatalog,
    selection: SelectionSet,
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every bag in `paths` and replace the session contents.
    ///
    /// On any read failure the previous contents are kept untouched.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        reader: &dyn BagReader,
    ) -> Result<&TopicCatalog, FilterError> {
        self.state.check(Operation::Load)?;
        if paths.is_empty() {
            return Err(FilterError::NoFilesChosen);
        }

        let bags = paths
            .iter()
            .map(|p| reader.read_descriptor(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = TopicCatalog::build(&bags);
        let state = self.state.on(SessionEvent::LoadCompleted)?;

        self.selection = SelectionSet::new(self.selection.grouping());
        self.bags = bags;
        self.catalog = catalog;
        self.state = state;
        tracing::info!(
            "session: {} bag(s), {} topics, {} message types",
            self.bags.len(),
            self.catalog.all_topics().len(),
            self.catalog.all_message_types().len()
        );
        Ok(&self.catalog)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn can_edit_selection(&self) -> bool {
        self.state.permits(Operation::EditSelection)
    }

    pub fn can_export(&self) -> bool {
        self.state.permits(Operation::Export)
    }

    pub fn bags(&self) -> &[BagDescriptor] {
        &self.bags
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Keys displayed under the current grouping.
    pub fn keys(&self) -> &BTreeSet<String> {
        self.catalog.keys(self.selection.grouping())
    }

    /// Change grouping; the selection starts empty in the new grouping.
    pub fn set_grouping(&mut self, grouping: Grouping) -> Result<(), FilterError> {
        self.state.check(Operation::EditSelection)?;
        self.selection.initialize(grouping);
        Ok(())
    }

    pub fn toggle(&mut self, key: &str) -> Result<bool, FilterError> {
        self.state.check(Operation::EditSelection)?;
        let keys = self.catalog.keys(self.selection.grouping());
        self.selection.toggle(key, keys)
    }

    pub fn select_all(&mut self) -> Result<(), FilterError> {
        self.state.check(Operation::EditSelection)?;
        let keys = self.catalog.keys(self.selection.grouping());
        self.selection.select_all(keys);
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), FilterError> {
        self.state.check(Operation::EditSelection)?;
        self.selection.clear();
        Ok(())
    }

    pub fn invert(&mut self) -> Result<(), FilterError> {
        self.state.check(Operation::EditSelection)?;
        let keys = self.catalog.keys(self.selection.grouping());
        self.selection.invert(keys);
        Ok(())
    }

    pub fn select_matching(&mut self, pattern: &Regex) -> Result<usize, FilterError> {
        self.state.check(Operation::EditSelection)?;
        let keys = self.catalog.keys(self.selection.grouping());
        Ok(self.selection.select_matching(pattern, keys))
    }

    pub fn effective_topics(&self) -> BTreeSet<String> {
        self.selection.effective_topics(&self.catalog)
    }

    /// Validate and enter `Exporting`, handing back the work to run.
    ///
    /// Nothing is touched and the state is unchanged if validation fails.
    pub fn begin_export(
        &mut self,
        output_dir: &Path,
        options: &ExportOptions,
    ) -> Result<ExportJob, FilterError> {
        self.begin_export_at(output_dir, options, Local::now().naive_local())
    }

    pub fn begin_export_at(
        &mut self,
        output_dir: &Path,
        options: &ExportOptions,
        now: NaiveDateTime,
    ) -> Result<ExportJob, FilterError> {
        self.state.check(Operation::Export)?;
        let topics = self.effective_topics();
        if topics.is_empty() {
            return Err(FilterError::EmptySelection);
        }
        let output_dir = validate_output_dir(output_dir)?;
        let job = ExportJob::new(&self.bags, topics, output_dir, options, now)?;
        self.state = self.state.on(SessionEvent::ExportRequested)?;
        Ok(job)
    }

    /// Leave `Exporting`, whatever the outcome of the job.
    pub fn finish_export(&mut self) -> Result<(), FilterError> {
        self.state = self.state.on(SessionEvent::ExportFinished)?;
        Ok(())
    }

    /// Run a full export synchronously on the calling thread.
    pub fn export_all(
        &mut self,
        output_dir: &Path,
        options: &ExportOptions,
        runner: &dyn FilterRunner,
    ) -> Result<ExportReport, FilterError> {
        let job = self.begin_export(output_dir, options)?;
        let report = job.run(runner);
        self.finish_export()?;
        Ok(report)
    }
}

/// Pick the single output directory out of what the user chose.
pub fn resolve_output_dir<S: AsRef<str>>(choices: &[S]) -> Result<PathBuf, FilterError> {
    match choices {
        [] => Err(FilterError::InvalidOutputLocation(
            "an output directory is required".to_string(),
        )),
        [only] => validate_output_dir(Path::new(only.as_ref())),
        _ => Err(FilterError::InvalidOutputLocation(
            "can only select one directory to save to".to_string(),
        )),
    }
}

fn validate_output_dir(dir: &Path) -> Result<PathBuf, FilterError> {
    if dir.as_os_str().is_empty() {
        return Err(FilterError::InvalidOutputLocation(
            "an output directory is required".to_string(),
        ));
    }
    if !dir.is_dir() {
        return Err(FilterError::InvalidOutputLocation(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(dir.to_path_buf())
}
