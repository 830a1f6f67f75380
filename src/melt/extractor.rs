use crate::document::{Document, ElementNode};
use crate::error::{MeltError, Result};
use crate::melt::names::NameSanitizer;
use crate::melt::records::{RecordInsertSpec, RecordLoader};
use crate::melt::types::{MeltConfig, StrategyKind, TableDescriptor};
use crate::schema::{SchemaBuilder, TableCreationSpec};
use crate::store::{SqliteStore, Store};
use indexmap::IndexSet;
use std::path::Path;
use tracing::debug;

/// State shared by both linkage strategies
#[derive(Debug, Clone)]
pub struct StructureExtractor {
    sanitizer: NameSanitizer,
    primary_key: String,
}

impl StructureExtractor {
    pub fn new(config: &MeltConfig) -> Self {
        StructureExtractor {
            sanitizer: NameSanitizer::new(config.reserved_words.clone()),
            primary_key: config.primary_key.clone(),
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }
}

impl Default for StructureExtractor {
    fn default() -> Self {
        Self::new(&MeltConfig::default())
    }
}

/// Decomposes an element tree into tables and turns them into schema and rows
///
/// Implementations only decide which parent link a descriptor carries; the
/// walk, schema and record generation are shared.
pub trait Strategy {
    fn kind(&self) -> StrategyKind;

    fn extractor(&self) -> &StructureExtractor;

    /// Parent recorded on a descriptor whose enclosing container is `enclosing`
    fn parent_link(&self, enclosing: Option<&str>) -> Option<String>;

    /// Melt a document into table descriptors, children before their container
    fn extract(&self, document: &Document) -> Result<Vec<TableDescriptor>> {
        let root = document
            .root()
            .ok_or_else(|| MeltError::Structure("document has no root element".into()))?;
        Ok(self.extract_element(root))
    }

    /// Melt a tree rooted at `root`; the root always yields a descriptor
    fn extract_element(&self, root: &ElementNode) -> Vec<TableDescriptor> {
        let mut descriptors = Vec::with_capacity(root.count_containers().max(1));
        extract_structure(self, root, &mut descriptors);
        descriptors
    }

    fn build_schema(&self, descriptors: &[TableDescriptor]) -> Vec<TableCreationSpec> {
        SchemaBuilder::new(self.extractor().primary_key()).build(descriptors)
    }

    fn build_records(&self, descriptors: &[TableDescriptor]) -> Vec<RecordInsertSpec> {
        RecordLoader::new().build(descriptors)
    }

    /// Create every table in the SQLite database at `db_path`
    fn create_database_schema(
        &self,
        db_path: &Path,
        descriptors: &[TableDescriptor],
    ) -> Result<()> {
        let mut store = SqliteStore::open(db_path)?;
        store.apply_schema(&self.build_schema(descriptors))
    }

    /// Insert one row per descriptor with columns; returns the number of rows
    fn insert_data_into_database(
        &self,
        db_path: &Path,
        descriptors: &[TableDescriptor],
    ) -> Result<usize> {
        let mut store = SqliteStore::open(db_path)?;
        store.load_records(&self.build_records(descriptors))
    }
}

/// An open container during the walk
struct Frame<'a> {
    element: &'a ElementNode,
    next_child: usize,
    descriptor: TableDescriptor,
    foreign_keys: IndexSet<String>,
}

impl<'a> Frame<'a> {
    fn open<S: Strategy + ?Sized>(
        strategy: &S,
        element: &'a ElementNode,
        enclosing: Option<&str>,
    ) -> Self {
        let tag = strategy.extractor().sanitizer.sanitize(&element.name);
        Frame {
            element,
            next_child: 0,
            descriptor: TableDescriptor::new(tag).with_parent(strategy.parent_link(enclosing)),
            foreign_keys: IndexSet::new(),
        }
    }

    fn finish(self) -> TableDescriptor {
        let mut descriptor = self.descriptor;
        descriptor.foreign_keys = self.foreign_keys.into_iter().collect();
        debug!(
            table = %descriptor.table,
            columns = descriptor.columns.len(),
            foreign_keys = descriptor.foreign_keys.len(),
            parent = ?descriptor.parent,
            "extracted table descriptor"
        );
        descriptor
    }
}

/// Post-order walk shared by both strategies
///
/// Open containers live on an explicit stack; nesting depth is limited by
/// memory only.
fn extract_structure<S: Strategy + ?Sized>(
    strategy: &S,
    root: &ElementNode,
    descriptors: &mut Vec<TableDescriptor>,
) {
    let extractor = strategy.extractor();
    let mut stack = vec![Frame::open(strategy, root, None)];

    while let Some(frame) = stack.last_mut() {
        let element = frame.element;
        let Some(child) = element.children.get(frame.next_child) else {
            if let Some(done) = stack.pop() {
                descriptors.push(done.finish());
            }
            continue;
        };
        frame.next_child += 1;

        let child_name = extractor.sanitizer.sanitize(&child.name);
        if child.is_container() {
            frame.foreign_keys.insert(child_name);
            let enclosing = frame.descriptor.table.clone();
            stack.push(Frame::open(strategy, child, Some(&enclosing)));
        } else if child_name != extractor.primary_key {
            // Repeated leaf names: last value wins, first position kept
            frame
                .descriptor
                .columns
                .insert(child_name, child.text.trim().to_string());
        }
    }
}

/// Records child-ward foreign keys and a backlink to the enclosing table
#[derive(Debug, Clone, Default)]
pub struct HierarchicalStrategy {
    extractor: StructureExtractor,
}

impl HierarchicalStrategy {
    pub fn new(config: &MeltConfig) -> Self {
        HierarchicalStrategy {
            extractor: StructureExtractor::new(config),
        }
    }
}

impl Strategy for HierarchicalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hierarchical
    }

    fn extractor(&self) -> &StructureExtractor {
        &self.extractor
    }

    fn parent_link(&self, enclosing: Option<&str>) -> Option<String> {
        enclosing.map(str::to_string)
    }
}

/// Records child-ward foreign keys only
#[derive(Debug, Clone, Default)]
pub struct FlatStrategy {
    extractor: StructureExtractor,
}

impl FlatStrategy {
    pub fn new(config: &MeltConfig) -> Self {
        FlatStrategy {
            extractor: StructureExtractor::new(config),
        }
    }
}

impl Strategy for FlatStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Flat
    }

    fn extractor(&self) -> &StructureExtractor {
        &self.extractor
    }

    fn parent_link(&self, _enclosing: Option<&str>) -> Option<String> {
        None
    }
}

impl StrategyKind {
    /// Instantiate the strategy this kind names
    pub fn build(self, config: &MeltConfig) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Hierarchical => Box::new(HierarchicalStrategy::new(config)),
            StrategyKind::Flat => Box::new(FlatStrategy::new(config)),
        }
    }
}
