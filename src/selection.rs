//! Export selection over the catalog's current grouping

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::TopicCatalog;
use crate::error::FilterError;

/// How catalog entries are displayed and keyed for selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Grouping {
    #[default]
    ByTopic,
    ByMessageType,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::ByTopic => write!(f, "topic"),
            Grouping::ByMessageType => write!(f, "message type"),
        }
    }
}

/// Keys marked for export, interpreted according to `grouping`.
///
/// Callers pass the catalog's key space for the current grouping to every
/// mutating call so `selected` never holds a key outside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    grouping: Grouping,
    selected: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new(grouping: Grouping) -> Self {
        Self {
            grouping,
            selected: BTreeSet::new(),
        }
    }

    /// Switch grouping and start over with nothing selected.
    pub fn initialize(&mut self, grouping: Grouping) {
        self.grouping = grouping;
        self.selected.clear();
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Flip `key`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, key: &str, keys: &BTreeSet<String>) -> Result<bool, FilterError> {
        if !keys.contains(key) {
            return Err(FilterError::InvalidKey {
                key: key.to_string(),
                grouping: self.grouping,
            });
        }
        if self.selected.remove(key) {
            Ok(false)
        } else {
            self.selected.insert(key.to_string());
            Ok(true)
        }
    }

    pub fn select_all(&mut self, keys: &BTreeSet<String>) {
        self.selected = keys.clone();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn invert(&mut self, keys: &BTreeSet<String>) {
        self.selected = keys.difference(&self.selected).cloned().collect();
    }

    /// Add every key matching `pattern`; returns how many were newly selected.
    pub fn select_matching(&mut self, pattern: &Regex, keys: &BTreeSet<String>) -> usize {
        let before = self.selected.len();
        self.selected
            .extend(keys.iter().filter(|k| pattern.is_match(k)).cloned());
        self.selected.len() - before
    }

    /// Concrete topics that will be exported for the current selection.
    pub fn effective_topics(&self, catalog: &TopicCatalog) -> BTreeSet<String> {
        match self.grouping {
            Grouping::ByTopic => self.selected.clone(),
            Grouping::ByMessageType => self
                .selected
                .iter()
                .flat_map(|ty| catalog.topics_for_type(ty))
                .collect(),
        }
    }
}
