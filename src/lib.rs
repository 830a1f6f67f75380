//! # xmlmelt - XML to relational tables
//!
//! Decomposes a nested XML document into a normalized relational schema and
//! loads the document's data into it.
//!
//! ## Modules
//!
//! - **document**: parse XML into an element tree
//! - **melt**: extract table descriptors from the tree (hierarchical or flat)
//! - **schema**: turn descriptors into `CREATE TABLE` specifications
//! - **store**: apply schema and rows to SQLite
//!
//! ## Quick Start
//!
//! ```rust
//! use xmlmelt::{melt_xml, MeltConfig, SqliteStore};
//!
//! # fn main() -> xmlmelt::Result<()> {
//! let xml = r#"
//!     <devices>
//!         <device><name>Device A</name><id>1</id></device>
//!         <device><name>Device B</name><id>2</id></device>
//!     </devices>
//! "#;
//!
//! let mut store = SqliteStore::open_in_memory()?;
//! let summary = melt_xml(xml, &MeltConfig::default(), &mut store)?;
//!
//! assert_eq!(summary.descriptors, 3);
//! assert_eq!(summary.rows, 2);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

pub mod document;
pub mod error;
pub mod melt;
pub mod schema;
pub mod store;

// Re-export commonly used types for convenience
pub use document::{Document, ElementNode};
pub use error::{MeltError, Result};
pub use melt::{
    FlatStrategy, HierarchicalStrategy, MeltConfig, RecordInsertSpec, Strategy, StrategyKind,
    TableDescriptor,
};
pub use schema::{SchemaBuilder, TableCreationSpec};
pub use store::{SqliteStore, Store};

/// Outcome of a full melt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeltSummary {
    /// Table descriptors extracted (one per container element)
    pub descriptors: usize,

    /// Distinct tables created
    pub tables: usize,

    /// Rows inserted
    pub rows: usize,
}

/// Main entry point: parse XML, create its schema in `store` and load its rows
pub fn melt_xml<S: Store>(xml: &str, config: &MeltConfig, store: &mut S) -> Result<MeltSummary> {
    let document = Document::parse(xml)?;
    let strategy = config.strategy.build(config);
    let descriptors = strategy.extract(&document)?;

    store.apply_schema(&strategy.build_schema(&descriptors))?;
    let rows = store.load_records(&strategy.build_records(&descriptors))?;

    let tables = descriptors
        .iter()
        .map(|d| d.table.as_str())
        .collect::<HashSet<_>>()
        .len();

    let summary = MeltSummary {
        descriptors: descriptors.len(),
        tables,
        rows,
    };
    info!(
        strategy = %strategy.kind(),
        descriptors = summary.descriptors,
        tables = summary.tables,
        rows = summary.rows,
        "melted document"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"
        <devices>
            <device>
                <name>Device A</name>
                <id>1</id>
                <manufacturer>Company X</manufacturer>
            </device>
            <device>
                <name>Device B</name>
                <id>2</id>
                <manufacturer>Company Y</manufacturer>
            </device>
        </devices>
    "#;

    #[test]
    fn test_melt_into_sqlite() {
        for strategy in [StrategyKind::Hierarchical, StrategyKind::Flat] {
            let config = MeltConfig {
                strategy,
                ..MeltConfig::default()
            };
            let mut store = SqliteStore::open_in_memory().unwrap();
            let summary = melt_xml(SAMPLE_XML, &config, &mut store).unwrap();

            assert_eq!(
                summary,
                MeltSummary {
                    descriptors: 3,
                    tables: 2,
                    rows: 2
                }
            );
            assert_eq!(store.table_names().unwrap(), vec!["device", "devices"]);
            assert_eq!(
                store.column_names("device").unwrap(),
                vec!["id", "name", "manufacturer"]
            );
            assert_eq!(store.row_count("device").unwrap(), 2);
        }
    }

    #[test]
    fn test_melting_twice_reuses_tables() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        melt_xml(SAMPLE_XML, &MeltConfig::default(), &mut store).unwrap();
        melt_xml(SAMPLE_XML, &MeltConfig::default(), &mut store).unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["device", "devices"]);
        assert_eq!(store.row_count("device").unwrap(), 4);
    }

    #[test]
    fn test_reserved_names_survive_sqlite() {
        let xml = "<select><table><where>here</where><id>9</id></table></select>";
        let mut store = SqliteStore::open_in_memory().unwrap();
        melt_xml(xml, &MeltConfig::default(), &mut store).unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["_select_", "_table_"]);
        assert_eq!(
            store.column_names("_select_").unwrap(),
            vec!["id", "_table__id"]
        );
        assert_eq!(store.row_count("_table_").unwrap(), 1);
    }

    #[test]
    fn test_empty_document_is_structural_error() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = melt_xml("   ", &MeltConfig::default(), &mut store).unwrap_err();
        assert!(matches!(err, MeltError::Structure(_)));
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_database_path_helpers() {
        let dir = std::env::temp_dir().join(format!("xmlmelt-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("devices.db");
        let _ = std::fs::remove_file(&db_path);

        let strategy = FlatStrategy::default();
        let descriptors = strategy
            .extract(&Document::parse(SAMPLE_XML).unwrap())
            .unwrap();
        strategy.create_database_schema(&db_path, &descriptors).unwrap();
        let rows = strategy
            .insert_data_into_database(&db_path, &descriptors)
            .unwrap();
        assert_eq!(rows, 2);

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.row_count("device").unwrap(), 2);

        drop(store);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
