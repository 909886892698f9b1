use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTable {
    Doctors,
    Tokens,
}

impl ChangeTable {
    pub const ALL: [ChangeTable; 2] = [ChangeTable::Doctors, ChangeTable::Tokens];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTable::Doctors => "doctors",
            ChangeTable::Tokens => "tokens",
        }
    }
}

impl fmt::Display for ChangeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Events were dropped for this subscriber; it must re-fetch.
    Resync,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
            ChangeKind::Resync => "resync",
        }
    }
}

/// "Something changed" notice. Carries the filterable columns of the row,
/// never the row itself: subscribers re-read the store for current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub record_id: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(table: ChangeTable, kind: ChangeKind, record_id: impl ToString) -> Self {
        Self {
            table,
            kind,
            record_id: Some(record_id.to_string()),
            fields: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn resync(table: ChangeTable) -> Self {
        Self {
            table,
            kind: ChangeKind::Resync,
            record_id: None,
            fields: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }
}

/// Equality predicate on one column, e.g. `doctor_id = X`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFilter {
    pub field: String,
    pub value: String,
}

impl ChangeFilter {
    pub fn eq(field: impl Into<String>, value: impl ToString) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        // Resync has no row; every subscriber of the table must see it.
        event.kind == ChangeKind::Resync
            || event.fields.get(&self.field).is_some_and(|v| v == &self.value)
    }
}
