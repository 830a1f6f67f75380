//! XML melting - decompose an element tree into relational tables
//!
//! Every element with children becomes a table, every text-only child a
//! column of its container, and every nested container a foreign key from the
//! enclosing table. Two strategies are available:
//!
//! - `HierarchicalStrategy` also records the enclosing table on each descriptor
//! - `FlatStrategy` records child-ward links only

pub mod extractor;
pub mod names;
pub mod records;
pub mod types;

pub use extractor::{FlatStrategy, HierarchicalStrategy, Strategy, StructureExtractor};
pub use names::{quote_name, NameSanitizer, ReservedWords};
pub use records::{RecordInsertSpec, RecordLoader};
pub use types::{MeltConfig, StrategyKind, TableDescriptor};
