use crate::melt::names::quote_name;
use crate::melt::types::TableDescriptor;
use std::fmt;

/// SQL role of a generated column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`
    PrimaryKey,
    /// Leaf text
    Text,
    /// `INTEGER REFERENCES <table>(<primary key>)`
    ForeignKey { table: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Unquoted column name
    pub name: String,
    pub kind: ColumnKind,
}

/// Create-if-absent description of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCreationSpec {
    /// Quoted table name
    pub table: String,

    /// Columns in declaration order, primary key first
    pub columns: Vec<ColumnSpec>,

    primary_key: String,
}

impl TableCreationSpec {
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Render the idempotent `CREATE TABLE IF NOT EXISTS` statement
    pub fn to_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table,
            columns.join(", ")
        )
    }

    fn column_definition(&self, column: &ColumnSpec) -> String {
        let name = quote_name(&column.name);
        match &column.kind {
            ColumnKind::PrimaryKey => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name),
            ColumnKind::Text => format!("{} TEXT", name),
            ColumnKind::ForeignKey { table } => format!(
                "{} INTEGER REFERENCES {}({})",
                name,
                quote_name(table),
                quote_name(&self.primary_key)
            ),
        }
    }
}

impl fmt::Display for TableCreationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.to_sql())
    }
}

/// Builds table creation specs from melted descriptors
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    primary_key: String,
}

impl SchemaBuilder {
    pub fn new(primary_key: impl Into<String>) -> Self {
        SchemaBuilder {
            primary_key: primary_key.into(),
        }
    }

    /// One spec per descriptor, same order
    ///
    /// Same-named descriptors produce repeated specs; creation is idempotent
    /// so the first shape to reach the store wins.
    pub fn build(&self, descriptors: &[TableDescriptor]) -> Vec<TableCreationSpec> {
        descriptors.iter().map(|d| self.table_spec(d)).collect()
    }

    pub fn table_spec(&self, descriptor: &TableDescriptor) -> TableCreationSpec {
        let mut columns =
            Vec::with_capacity(1 + descriptor.columns.len() + descriptor.foreign_keys.len());

        columns.push(ColumnSpec {
            name: self.primary_key.clone(),
            kind: ColumnKind::PrimaryKey,
        });

        columns.extend(descriptor.columns.keys().map(|name| ColumnSpec {
            name: name.clone(),
            kind: ColumnKind::Text,
        }));

        columns.extend(descriptor.foreign_keys.iter().map(|fk| ColumnSpec {
            name: format!("{}_{}", fk, self.primary_key),
            kind: ColumnKind::ForeignKey { table: fk.clone() },
        }));

        TableCreationSpec {
            table: quote_name(&descriptor.table),
            columns,
            primary_key: self.primary_key.clone(),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        SchemaBuilder::new("id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices_descriptor() -> TableDescriptor {
        let mut d = TableDescriptor::new("devices");
        d.columns.insert("owner".into(), "ops".into());
        d.columns.insert("site".into(), "north".into());
        d.foreign_keys = vec!["device".into(), "_table_".into()];
        d
    }

    #[test]
    fn test_column_layout() {
        let spec = SchemaBuilder::default().table_spec(&devices_descriptor());

        assert_eq!(spec.table, "\"devices\"");
        let names: Vec<&str> = spec.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "owner", "site", "device_id", "_table__id"]);
        assert_eq!(spec.columns[0].kind, ColumnKind::PrimaryKey);
        assert_eq!(
            spec.columns[3].kind,
            ColumnKind::ForeignKey {
                table: "device".into()
            }
        );
    }

    #[test]
    fn test_create_statement() {
        let spec = SchemaBuilder::default().table_spec(&devices_descriptor());

        assert_eq!(
            spec.to_sql(),
            "CREATE TABLE IF NOT EXISTS \"devices\" (\
             \"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"owner\" TEXT, \
             \"site\" TEXT, \
             \"device_id\" INTEGER REFERENCES \"device\"(\"id\"), \
             \"_table__id\" INTEGER REFERENCES \"_table_\"(\"id\"))"
        );
        assert!(spec.to_string().ends_with(");"));
    }

    #[test]
    fn test_one_spec_per_descriptor() {
        let descriptors = vec![
            TableDescriptor::new("device"),
            TableDescriptor::new("device"),
            devices_descriptor(),
        ];
        let specs = SchemaBuilder::default().build(&descriptors);

        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0], specs[1]);
        assert_eq!(specs[0].columns.len(), 1);
    }

    #[test]
    fn test_custom_primary_key() {
        let spec = SchemaBuilder::new("pk").table_spec(&devices_descriptor());
        assert_eq!(spec.primary_key(), "pk");
        assert_eq!(spec.columns[3].name, "device_pk");
        assert!(spec.to_sql().contains("REFERENCES \"device\"(\"pk\")"));
    }
}
