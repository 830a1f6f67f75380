use crate::melt::names::quote_name;
use crate::melt::types::TableDescriptor;
use indexmap::IndexMap;

/// A single parameterized row insert for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInsertSpec {
    /// Quoted table name
    pub table: String,

    /// Column names in insertion order (unquoted)
    pub columns: Vec<String>,

    /// Column name to literal text value
    pub values: IndexMap<String, String>,
}

impl RecordInsertSpec {
    /// `INSERT INTO "t" ("a", "b") VALUES (:c1, :c2)`
    ///
    /// Placeholders are named by column position so that element names that
    /// are not valid parameter names still bind.
    pub fn to_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_name(c)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            self.placeholders().join(", ")
        )
    }

    pub fn placeholders(&self) -> Vec<String> {
        (1..=self.columns.len()).map(|i| format!(":c{}", i)).collect()
    }

    /// Placeholder/value pairs in column order
    pub fn named_values(&self) -> Vec<(String, &str)> {
        self.placeholders()
            .into_iter()
            .zip(self.columns.iter())
            .map(|(placeholder, column)| {
                let value = self.values.get(column).map(String::as_str).unwrap_or_default();
                (placeholder, value)
            })
            .collect()
    }
}

/// Turns table descriptors into row inserts
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLoader;

impl RecordLoader {
    pub fn new() -> Self {
        RecordLoader
    }

    /// One insert per descriptor that has at least one column, in descriptor order
    ///
    /// Foreign-key columns are left unpopulated.
    pub fn build(&self, descriptors: &[TableDescriptor]) -> Vec<RecordInsertSpec> {
        descriptors
            .iter()
            .filter(|d| !d.columns.is_empty())
            .map(|d| RecordInsertSpec {
                table: quote_name(&d.table),
                columns: d.columns.keys().cloned().collect(),
                values: d.columns.clone(),
            })
            .collect()
    }
}
