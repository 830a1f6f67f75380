use crate::melt::names::ReservedWords;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One table's worth of structure extracted from a container element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Sanitized table name, e.g. "device"
    pub table: String,

    /// Leaf children of the element: column name to trimmed text, in document order
    pub columns: IndexMap<String, String>,

    /// Sanitized names of the container children directly under the element
    pub foreign_keys: Vec<String>,

    /// Sanitized name of the enclosing container (hierarchical linkage only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl TableDescriptor {
    pub fn new(table: impl Into<String>) -> Self {
        TableDescriptor {
            table: table.into(),
            columns: IndexMap::new(),
            foreign_keys: Vec::new(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }
}

/// Which linkage to record between parent and child tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Child-ward foreign keys plus a parent backlink on every descriptor
    #[default]
    Hierarchical,
    /// Child-ward foreign keys only
    Flat,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Hierarchical => f.write_str("hierarchical"),
            StrategyKind::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hierarchical" => Ok(StrategyKind::Hierarchical),
            "flat" => Ok(StrategyKind::Flat),
            other => Err(format!(
                "unknown strategy '{}', expected 'hierarchical' or 'flat'",
                other
            )),
        }
    }
}

/// Configuration for the melting process
#[derive(Debug, Clone)]
pub struct MeltConfig {
    /// Linkage strategy used by `StrategyKind::build`
    pub strategy: StrategyKind,

    /// Words rewritten by the name sanitizer (matched case-insensitively)
    pub reserved_words: ReservedWords,

    /// Name of the synthetic primary key; leaves with this name are dropped
    pub primary_key: String,
}

impl Default for MeltConfig {
    fn default() -> Self {
        MeltConfig {
            strategy: StrategyKind::default(),
            reserved_words: ReservedWords::default(),
            primary_key: String::from("id"),
        }
    }
}
