use crate::models::{Product, ProductId};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("workbook error: {0}")]
    Workbook(String),
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: u32, reason: String },
    #[error("product id space exhausted")]
    IdsExhausted,
    #[error("backend state lock poisoned")]
    LockPoisoned,
    #[error("{0}")]
    Other(String),
}

/// Persistence contract shared by every product backend.
///
/// `update` and `delete` report whether a record with the given id existed.
/// An absent id is `Ok(false)`, never an error, and never creates a record.
pub trait ProductDao: Send + Sync {
    /// Short backend name used in logs and messages.
    fn name(&self) -> &'static str;

    /// Stores `product` under a freshly assigned id and returns the stored copy.
    /// The id carried by `product` is ignored, and an empty tag is stored as no tag.
    fn add(&self, product: Product) -> Result<Product, DaoError>;

    fn update(&self, product: &Product) -> Result<bool, DaoError>;

    fn delete(&self, id: ProductId) -> Result<bool, DaoError>;

    /// Full snapshot of all stored products. Order is backend-defined.
    fn list(&self) -> Result<Vec<Product>, DaoError>;

    /// Points the backend at a new source (file path, connection string).
    /// Backends without a configurable source accept and ignore it.
    fn configure(&self, source: &str) -> Result<(), DaoError>;
}
