//! Storage backends for melted schema and rows

use crate::error::Result;
use crate::melt::names::quote_name;
use crate::melt::records::RecordInsertSpec;
use crate::schema::TableCreationSpec;
use rusqlite::{Connection, ToSql};
use std::path::Path;
use tracing::debug;

/// Executes table creation and row inserts
///
/// Each call is one unit of work: either every statement is applied or, on
/// the first failure, none are and the error is returned.
pub trait Store {
    fn apply_schema(&mut self, specs: &[TableCreationSpec]) -> Result<()>;

    /// Returns the number of rows inserted
    fn load_records(&mut self, records: &[RecordInsertSpec]) -> Result<usize>;
}

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened sqlite store");
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(SqliteStore {
            conn: Connection::open_in_memory()?,
        })
    }

    /// User table names, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Column names of `table` in declaration order
    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_name(table)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_name(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn apply_schema(&mut self, specs: &[TableCreationSpec]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for spec in specs {
            let sql = spec.to_sql();
            debug!(%sql, "creating table");
            tx.execute(&sql, [])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_records(&mut self, records: &[RecordInsertSpec]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        for record in records {
            let sql = record.to_sql();
            let named = record.named_values();
            let params: Vec<(&str, &dyn ToSql)> = named
                .iter()
                .map(|(placeholder, value)| (placeholder.as_str(), value as &dyn ToSql))
                .collect();

            let mut stmt = tx.prepare_cached(&sql)?;
            inserted += stmt.execute(params.as_slice())?;
            debug!(table = %record.table, row_id = tx.last_insert_rowid(), "inserted row");
        }
        tx.commit()?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::records::RecordLoader;
    use crate::melt::types::TableDescriptor;
    use crate::schema::SchemaBuilder;
    use crate::MeltError;

    fn descriptors() -> Vec<TableDescriptor> {
        let mut device = TableDescriptor::new("device");
        device.columns.insert("name".into(), "Device A".into());
        device.columns.insert("manufacturer".into(), "Company X".into());
        let mut devices = TableDescriptor::new("devices");
        devices.foreign_keys = vec!["device".into()];
        vec![device, devices]
    }

    #[test]
    fn test_schema_is_idempotent() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let specs = SchemaBuilder::default().build(&descriptors());

        store.apply_schema(&specs).unwrap();
        store.apply_schema(&specs).unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["device", "devices"]);
        assert_eq!(
            store.column_names("devices").unwrap(),
            vec!["id", "device_id"]
        );
    }

    #[test]
    fn test_load_records() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let descriptors = descriptors();
        store
            .apply_schema(&SchemaBuilder::default().build(&descriptors))
            .unwrap();

        let inserted = store
            .load_records(&RecordLoader::new().build(&descriptors))
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.row_count("device").unwrap(), 1);
        assert_eq!(store.row_count("devices").unwrap(), 0);

        let (name, manufacturer): (String, String) = store
            .connection()
            .query_row("SELECT name, manufacturer FROM device", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(name, "Device A");
        assert_eq!(manufacturer, "Company X");
    }

    #[test]
    fn test_failed_load_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let descriptors = descriptors();
        store
            .apply_schema(&SchemaBuilder::default().build(&descriptors))
            .unwrap();

        let mut records = RecordLoader::new().build(&descriptors);
        let mut missing = TableDescriptor::new("gadget");
        missing.columns.insert("name".into(), "nope".into());
        records.extend(RecordLoader::new().build(&[missing]));

        let err = store.load_records(&records).unwrap_err();
        assert!(matches!(err, MeltError::Storage(_)));
        assert_eq!(store.row_count("device").unwrap(), 0);
    }
}
