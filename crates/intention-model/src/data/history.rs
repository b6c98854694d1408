// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Append-only change history carried by every intention

use crate::data::IntentionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One change applied to an intention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Name of the pass (or builder) that produced the change
    pub tag: String,
    pub description: String,
    pub related_intentions: Vec<IntentionId>,
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.description)
    }
}

/// Ordered change log. Records are only ever appended; echoing a record into another
/// intention's history copies it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentionHistory {
    entries: Vec<HistoryRecord>,
}

impl IntentionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryRecord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Records a change and returns a copy suitable for echoing elsewhere
    pub fn record_change(
        &mut self,
        tag: impl Into<String>,
        description: impl Into<String>,
        related_intentions: Vec<IntentionId>,
    ) -> HistoryRecord {
        let record = HistoryRecord {
            tag: tag.into(),
            description: description.into(),
            related_intentions,
        };
        self.entries.push(record.clone());
        record
    }

    /// Appends a copy of a record produced on another intention
    pub fn echo(&mut self, record: &HistoryRecord) {
        self.entries.push(record.clone());
    }
}
