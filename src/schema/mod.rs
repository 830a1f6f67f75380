//! Relational schema generation
//!
//! Turns melted table descriptors into `CREATE TABLE IF NOT EXISTS`
//! specifications: a synthetic primary key, one TEXT column per leaf and one
//! INTEGER reference column per child table.

pub mod builder;

pub use builder::{ColumnKind, ColumnSpec, SchemaBuilder, TableCreationSpec};
