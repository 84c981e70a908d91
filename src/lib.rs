//! bagfilter - Export ROS1 .bag files filtered down to selected topics
//!
//! This library indexes the topics and message types of one or more bag
//! files, keeps a selection over them (by topic or by message type) and
//! produces a filtered copy of every bag through `rosbag filter`.
//!
//! # Features
//!
//! - **Catalog**: merged topic / message type index across bags
//! - **Selection**: toggle, select-all, regex select, invert, by topic or by type
//! - **Export**: one `rosbag filter` process per bag, spawned without a shell,
//!   exit status checked, failures isolated per bag
//! - **Session state**: no load, edit or second export while an export runs
//! - **Parallel processing**: optional concurrent per-bag export on a worker
//!
//! # Example
//!
//! ```rust,no_run
//! use bagfilter::{ExportOptions, Grouping, ProcessRunner, RosbagReader, Session};
//! use std::path::Path;
//!
//! let mut session = Session::new();
//! session.load(&["drive_1.bag", "drive_2.bag"], &RosbagReader)?;
//! session.set_grouping(Grouping::ByMessageType)?;
//! session.toggle("sensor_msgs/Image")?;
//!
//! let report = session.export_all(Path::new("/tmp"), &ExportOptions::default(), &ProcessRunner)?;
//! println!("{} written, {} failed", report.succeeded(), report.failed());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod command;
pub mod error;
pub mod export;
pub mod filter;
pub mod inspect;
pub mod rosbags_io;
pub mod selection;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use catalog::TopicCatalog;
pub use error::FilterError;
pub use export::{ExportJob, ExportOptions, ExportReport, FilterRunner, ProcessRunner};
pub use rosbags_io::{BagDescriptor, BagReader, RosbagReader};
pub use selection::{Grouping, SelectionSet};
pub use session::Session;
pub use state::SessionState;
