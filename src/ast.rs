use std::sync::Arc;

use stockroom_core::ProductId;

use crate::backend::BackendKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Add(ProductFields),
    Update(ProductId, ProductFields),
    Delete(ProductId),
    List,
    Use(UseCommand),
}

/// Product fields as typed by the user. The quantity stays raw text until
/// the session validates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: Arc<str>,
    pub quantity: Arc<str>,
    pub tag: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseCommand {
    pub kind: BackendKind,
    pub source: Option<Arc<str>>,
}
