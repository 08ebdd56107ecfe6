use std::fmt;

use serde::Deserialize;
use stockroom_core::{DaoError, ProductDao};
use stockroom_memory::InMemoryProductDao;
use stockroom_postgres::PostgresProductDao;
use stockroom_sheet::SheetProductDao;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Sheet,
    Postgres,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Sheet => write!(f, "sheet"),
            BackendKind::Postgres => write!(f, "postgres"),
        }
    }
}

/// Builds a fresh backend of the given kind. `source` is handed to
/// `configure`, which only the sheet backend acts on.
pub fn open_backend(kind: BackendKind, source: &str) -> Result<Box<dyn ProductDao>, DaoError> {
    let dao: Box<dyn ProductDao> = match kind {
        BackendKind::Memory => Box::new(InMemoryProductDao::new()),
        BackendKind::Sheet => Box::new(SheetProductDao::new()),
        BackendKind::Postgres => Box::new(PostgresProductDao::new()?),
    };
    dao.configure(source)?;
    tracing::info!(backend = %kind, "Backend opened");
    Ok(dao)
}
