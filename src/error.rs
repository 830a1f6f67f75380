use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeltError {
    /// The input is not a single-rooted element tree
    #[error("Structural error: {0}")]
    Structure(String),

    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, MeltError>;
