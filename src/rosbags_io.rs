use rosbag::{ChunkRecord, IndexRecord, MessageRecord, RosBag};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::FilterError;

/// Topics and message types found in a single bag.
///
/// Built once when the bag is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BagDescriptor {
    pub path: PathBuf,
    pub topics: BTreeSet<String>,
    pub message_types: BTreeSet<String>,
    pub topic_to_type: BTreeMap<String, String>,
    pub type_to_topics: BTreeMap<String, BTreeSet<String>>,
}

impl BagDescriptor {
    /// Build a descriptor from a topic → message type mapping.
    pub fn new(path: impl Into<PathBuf>, topic_to_type: BTreeMap<String, String>) -> Self {
        let mut topics = BTreeSet::new();
        let mut message_types = BTreeSet::new();
        let mut type_to_topics: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (topic, ty) in &topic_to_type {
            topics.insert(topic.clone());
            message_types.insert(ty.clone());
            type_to_topics.entry(ty.clone()).or_default().insert(topic.clone());
        }
        Self {
            path: path.into(),
            topics,
            message_types,
            topic_to_type,
            type_to_topics,
        }
    }
}

/// Source of per-bag topic/type listings.
pub trait BagReader {
    fn read_descriptor(&self, path: &Path) -> Result<BagDescriptor, FilterError>;
}

/// Reads connection records of ROS1 bags through the `rosbag` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RosbagReader;

impl BagReader for RosbagReader {
    fn read_descriptor(&self, path: &Path) -> Result<BagDescriptor, FilterError> {
        let bag = RosBag::new(path).map_err(|e| load_failed(path, e))?;

        // 1) connections from the index section
        let mut topic_to_type = BTreeMap::new();
        for record in bag.index_records() {
            let record = record.map_err(|e| load_failed(path, e))?;
            if let IndexRecord::Connection(conn) = record {
                topic_to_type.insert(conn.topic.to_string(), conn.tp.to_string());
            }
        }

        // 2) unindexed bags only carry connections inside chunks
        if topic_to_type.is_empty() {
            tracing::debug!("no indexed connections in {}; scanning chunks", path.display());
            for record in bag.chunk_records() {
                let record = record.map_err(|e| load_failed(path, e))?;
                if let ChunkRecord::Chunk(chunk) = record {
                    for msg in chunk.messages() {
                        let msg = msg.map_err(|e| load_failed(path, e))?;
                        if let MessageRecord::Connection(conn) = msg {
                            topic_to_type.insert(conn.topic.to_string(), conn.tp.to_string());
                        }
                    }
                }
            }
        }

        let descriptor = BagDescriptor::new(path, topic_to_type);
        tracing::info!(
            "loaded {}: {} topics, {} message types",
            path.display(),
            descriptor.topics.len(),
            descriptor.message_types.len()
        );
        Ok(descriptor)
    }
}

fn load_failed(path: &Path, err: impl Display) -> FilterError {
    FilterError::LoadFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(pairs: &[(&str, &str)]) -> BagDescriptor {
        let map = pairs
            .iter()
            .map(|(t, ty)| (t.to_string(), ty.to_string()))
            .collect();
        BagDescriptor::new("/data/run.bag", map)
    }

    #[test]
    fn test_descriptor_groups_topics_by_type() {
        let d = descriptor(&[
            ("/cam/left", "sensor_msgs/Image"),
            ("/cam/right", "sensor_msgs/Image"),
            ("/imu", "sensor_msgs/Imu"),
        ]);
        assert_eq!(d.topics.len(), 3);
        assert_eq!(
            d.message_types.iter().collect::<Vec<_>>(),
            vec!["sensor_msgs/Image", "sensor_msgs/Imu"]
        );
        let images: Vec<_> = d.type_to_topics["sensor_msgs/Image"].iter().collect();
        assert_eq!(images, vec!["/cam/left", "/cam/right"]);
        assert_eq!(d.topic_to_type["/imu"], "sensor_msgs/Imu");
    }

    #[test]
    fn test_missing_bag_is_load_error() {
        let err = RosbagReader
            .read_descriptor(Path::new("/nonexistent/missing.bag"))
            .unwrap_err();
        assert!(matches!(err, FilterError::LoadFailed { .. }));
        assert!(err.to_string().contains("missing.bag"));
    }
}
