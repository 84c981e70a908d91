//! Builds `rosbag filter` invocations and their output file names

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::error::FilterError;

pub const DEFAULT_FILTER_TOOL: &str = "rosbag";

/// strftime layout of the timestamp embedded in output file names
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y_%m_%d-%I:%M:%S_%p";

/// One external filter invocation, kept as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCommand {
    pub program: String,
    pub args: Vec<String>,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl FilterCommand {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Shell rendering for logs and dry runs; the expression is double-quoted.
    pub fn to_shell_string(&self) -> String {
        let mut parts = vec![self.program.clone()];
        let last = self.args.len().saturating_sub(1);
        for (i, arg) in self.args.iter().enumerate() {
            if i == last {
                parts.push(format!("\"{}\"", arg));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

/// `topic == '<t1>' or topic == '<t2>' ...` over `topics`, in the given order.
pub fn build_filter_expression<S: AsRef<str>>(topics: &[S]) -> Result<String, FilterError> {
    if topics.is_empty() {
        return Err(FilterError::EmptySelection);
    }
    let mut clauses = Vec::with_capacity(topics.len());
    for topic in topics {
        let topic = topic.as_ref();
        if topic.contains('\'') || topic.contains('\\') {
            return Err(FilterError::UnsafeTopicName(topic.to_string()));
        }
        clauses.push(format!("topic == '{}'", topic));
    }
    Ok(clauses.join(" or "))
}

/// `<stem>_filtered_<YYYY_MM_DD-hh:mm:ss_AM/PM>.bag`
///
/// Only the final extension of the input is dropped. Two exports of the same
/// input within one second produce the same name.
pub fn output_filename(input_path: &Path, now: NaiveDateTime) -> String {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_filtered_{}.bag", stem, now.format(OUTPUT_TIMESTAMP_FORMAT))
}

/// Compose the filter invocation for one bag.
pub fn build_command<S: AsRef<str>>(
    tool: &str,
    input_path: &Path,
    output_dir: &Path,
    topics: &[S],
    now: NaiveDateTime,
) -> Result<FilterCommand, FilterError> {
    let expression = build_filter_expression(topics)?;
    let output_path = output_dir.join(output_filename(input_path, now));
    Ok(FilterCommand {
        program: tool.to_string(),
        args: vec![
            "filter".to_string(),
            input_path.to_string_lossy().into_owned(),
            output_path.to_string_lossy().into_owned(),
            expression,
        ],
        input_path: input_path.to_path_buf(),
        output_path,
    })
}
