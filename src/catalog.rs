//! Merged topic / message type index over every bag loaded in a session

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::rosbags_io::BagDescriptor;
use crate::selection::Grouping;

/// A topic published with a different message type by a later bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicConflict {
    pub topic: String,
    pub shadowed_type: String,
    pub winning_type: String,
    /// Bag whose type won.
    pub bag: PathBuf,
}

/// Queryable index of all topics and message types across loaded bags.
///
/// Rebuilt wholesale on each load. When two bags disagree on a topic's
/// type, the later bag wins and the disagreement is kept in `conflicts`.
/// The result is independent of input order only when no such conflict
/// exists; with conflicts, reordering the bags changes the winning type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicCatalog {
    all_topics: BTreeSet<String>,
    all_message_types: BTreeSet<String>,
    topic_to_type: BTreeMap<String, String>,
    type_to_topics: BTreeMap<String, BTreeSet<String>>,
    conflicts: Vec<TopicConflict>,
}

impl TopicCatalog {
    pub fn build(descriptors: &[BagDescriptor]) -> Self {
        let mut all_topics = BTreeSet::new();
        let mut all_message_types = BTreeSet::new();
        let mut topic_to_type: BTreeMap<String, String> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for desc in descriptors {
            all_topics.extend(desc.topics.iter().cloned());
            all_message_types.extend(desc.message_types.iter().cloned());
            for (topic, ty) in &desc.topic_to_type {
                if let Some(previous) = topic_to_type.insert(topic.clone(), ty.clone())
                    && previous != *ty
                {
                    tracing::warn!(
                        "topic {} is {} in an earlier bag but {} in {}; using {}",
                        topic,
                        previous,
                        ty,
                        desc.path.display(),
                        ty
                    );
                    conflicts.push(TopicConflict {
                        topic: topic.clone(),
                        shadowed_type: previous,
                        winning_type: ty.clone(),
                        bag: desc.path.clone(),
                    });
                }
            }
        }

        // every topic lands under exactly one type
        let mut type_to_topics: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (topic, ty) in &topic_to_type {
            type_to_topics.entry(ty.clone()).or_default().insert(topic.clone());
        }

        Self {
            all_topics,
            all_message_types,
            topic_to_type,
            type_to_topics,
            conflicts,
        }
    }

    pub fn all_topics(&self) -> &BTreeSet<String> {
        &self.all_topics
    }

    pub fn all_message_types(&self) -> &BTreeSet<String> {
        &self.all_message_types
    }

    /// Topics publishing `ty`; empty for an unknown type.
    pub fn topics_for_type(&self, ty: &str) -> BTreeSet<String> {
        self.type_to_topics.get(ty).cloned().unwrap_or_default()
    }

    pub fn type_of(&self, topic: &str) -> Option<&str> {
        self.topic_to_type.get(topic).map(String::as_str)
    }

    pub fn topics_sorted(&self) -> Vec<String> {
        self.all_topics.iter().cloned().collect()
    }

    pub fn types_sorted(&self) -> Vec<String> {
        self.all_message_types.iter().cloned().collect()
    }

    /// Key space displayed under `grouping`.
    pub fn keys(&self, grouping: Grouping) -> &BTreeSet<String> {
        match grouping {
            Grouping::ByTopic => &self.all_topics,
            Grouping::ByMessageType => &self.all_message_types,
        }
    }

    pub fn conflicts(&self) -> &[TopicConflict] {
        &self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.all_topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(path: &str, pairs: &[(&str, &str)]) -> BagDescriptor {
        BagDescriptor::new(
            path,
            pairs
                .iter()
                .map(|(t, ty)| (t.to_string(), ty.to_string()))
                .collect(),
        )
    }

    fn two_bags() -> Vec<BagDescriptor> {
        vec![
            bag("/bags/one.bag", &[("/a", "TypeX"), ("/b", "TypeY")]),
            bag("/bags/two.bag", &[("/a", "TypeX"), ("/c", "TypeZ")]),
        ]
    }

    #[test]
    fn test_build_merges_topics_and_types() {
        let catalog = TopicCatalog::build(&two_bags());
        assert_eq!(catalog.topics_sorted(), vec!["/a", "/b", "/c"]);
        assert_eq!(catalog.types_sorted(), vec!["TypeX", "TypeY", "TypeZ"]);
        assert_eq!(catalog.topics_for_type("TypeX").into_iter().collect::<Vec<_>>(), vec!["/a"]);
        assert_eq!(catalog.topics_for_type("TypeZ").into_iter().collect::<Vec<_>>(), vec!["/c"]);
        assert!(catalog.conflicts().is_empty());
    }

    #[test]
    fn test_type_ranges_cover_all_topics() {
        let catalog = TopicCatalog::build(&two_bags());
        let covered: BTreeSet<String> = catalog
            .all_message_types()
            .iter()
            .flat_map(|ty| catalog.topics_for_type(ty))
            .collect();
        assert_eq!(&covered, catalog.all_topics());
    }

    #[test]
    fn test_build_ignores_input_order_without_conflicts() {
        let mut reversed = two_bags();
        reversed.reverse();
        assert_eq!(TopicCatalog::build(&two_bags()), TopicCatalog::build(&reversed));
    }

    #[test]
    fn test_unknown_type_has_no_topics() {
        let catalog = TopicCatalog::build(&two_bags());
        assert!(catalog.topics_for_type("nav_msgs/Odometry").is_empty());
        assert_eq!(catalog.type_of("/b"), Some("TypeY"));
        assert_eq!(catalog.type_of("/zzz"), None);
    }

    #[test]
    fn test_later_bag_wins_type_conflict() {
        let bags = vec![
            bag("/bags/old.bag", &[("/odom", "nav_msgs/Odometry")]),
            bag("/bags/new.bag", &[("/odom", "geometry_msgs/PoseStamped")]),
        ];
        let catalog = TopicCatalog::build(&bags);
        assert_eq!(catalog.type_of("/odom"), Some("geometry_msgs/PoseStamped"));
        assert!(catalog.topics_for_type("nav_msgs/Odometry").is_empty());
        assert_eq!(catalog.all_message_types().len(), 2);

        let mut reversed = bags.clone();
        reversed.reverse();
        let flipped = TopicCatalog::build(&reversed);
        assert_eq!(flipped.type_of("/odom"), Some("nav_msgs/Odometry"));
        assert_ne!(flipped, catalog);

        let conflicts = catalog.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].shadowed_type, "nav_msgs/Odometry");
        assert_eq!(conflicts[0].bag, PathBuf::from("/bags/new.bag"));
    }

    #[test]
    fn test_keys_follow_grouping() {
        let catalog = TopicCatalog::build(&two_bags());
        assert_eq!(catalog.keys(Grouping::ByTopic).len(), 3);
        assert!(catalog.keys(Grouping::ByMessageType).contains("TypeY"));
        assert!(TopicCatalog::default().is_empty());
    }
}
