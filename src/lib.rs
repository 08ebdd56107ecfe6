pub mod ast;
pub mod backend;
pub mod config;
pub mod lexer;
pub mod render;
pub mod session;

pub use stockroom_core::{DaoError, Product, ProductDao, ProductId};
