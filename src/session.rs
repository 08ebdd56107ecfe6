use std::fmt;

use peg::{error::ParseError, str::LineCol};
use stockroom_core::{DaoError, Product, ProductDao, ProductId};
use thiserror::Error;

use crate::{
    ast::{ProductFields, Statement},
    backend::{open_backend, BackendKind},
    lexer,
};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("quantity must be a whole number, got '{0}'")]
    InvalidQuantity(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError<LineCol>),
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("{0}")]
    Storage(#[from] DaoError),
}

/// Recoverable conditions the caller should show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    NotFound(ProductId),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NotFound(id) => write!(f, "no product with id {}", id),
        }
    }
}

/// Result of one statement: the refreshed product list plus an optional warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub products: Vec<Product>,
    pub warning: Option<Warning>,
}

/// Holds the single active backend and forwards statements to it.
///
/// Switching backends replaces the reference wholesale; nothing is copied
/// from the old backend to the new one.
pub struct Session {
    dao: Box<dyn ProductDao>,
    kind: BackendKind,
    sheet_path: String,
}

impl Session {
    pub fn open(kind: BackendKind, sheet_path: impl Into<String>) -> Result<Self, DaoError> {
        let sheet_path = sheet_path.into();
        let dao = open_backend(kind, &sheet_path)?;
        Ok(Self::with_backend(kind, dao, sheet_path))
    }

    pub fn with_backend(kind: BackendKind, dao: Box<dyn ProductDao>, sheet_path: impl Into<String>) -> Self {
        Self {
            dao,
            kind,
            sheet_path: sheet_path.into(),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn dao(&self) -> &dyn ProductDao {
        self.dao.as_ref()
    }

    /// Opens the new backend first; on failure the current one stays active.
    pub fn switch(&mut self, kind: BackendKind, source: Option<&str>) -> Result<(), DaoError> {
        let source = source.unwrap_or(&self.sheet_path);
        let dao = open_backend(kind, source)?;
        tracing::info!(from = %self.kind, to = %kind, "Switched backend");
        self.dao = dao;
        self.kind = kind;
        Ok(())
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<Outcome, SessionError> {
        let warning = match statement {
            Statement::Add(fields) => {
                let stored = self.dao.add(product_from_fields(fields)?)?;
                tracing::debug!(id = stored.id, backend = self.dao.name(), "Added product");
                None
            }
            Statement::Update(id, fields) => {
                let product = product_from_fields(fields)?.with_id(*id);
                match self.dao.update(&product)? {
                    true => None,
                    false => Some(Warning::NotFound(*id)),
                }
            }
            Statement::Delete(id) => match self.dao.delete(*id)? {
                true => None,
                false => Some(Warning::NotFound(*id)),
            },
            Statement::List => None,
            Statement::Use(cmd) => {
                self.switch(cmd.kind, cmd.source.as_deref())?;
                None
            }
        };

        Ok(Outcome {
            products: self.dao.list()?,
            warning,
        })
    }

    /// Parses and runs a whole script, stopping at the first error.
    pub fn run_script(&mut self, script: &str) -> Result<Vec<Outcome>, SessionError> {
        let statements = lexer::parse(script)?;
        let mut outcomes = Vec::with_capacity(statements.len());
        for statement in &statements {
            outcomes.push(self.execute(statement)?);
        }
        Ok(outcomes)
    }
}

fn product_from_fields(fields: &ProductFields) -> Result<Product, InputError> {
    let quantity = fields
        .quantity
        .parse::<i32>()
        .map_err(|_| InputError::InvalidQuantity(fields.quantity.to_string()))?;

    let product = Product::new(&*fields.name, quantity);
    Ok(match fields.tag.as_deref() {
        Some(tag) if !tag.is_empty() => product.with_tag(tag),
        _ => product,
    })
}
