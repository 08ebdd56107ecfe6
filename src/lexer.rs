#![allow(clippy::redundant_closure_call)]

use super::ast::*;
use crate::backend::BackendKind;
use peg::{error::ParseError, str::LineCol};
use stockroom_core::ProductId;

peg::parser! {
    grammar inventory() for str {
        use std::sync::Arc;

        rule kw_add()       = ("ADD" / "add")
        rule kw_update()    = ("UPDATE" / "update")
        rule kw_delete()    = ("DELETE" / "delete")
        rule kw_list()      = ("LIST" / "list")
        rule kw_use()       = ("USE" / "use")

        rule kw_memory()    = ("MEMORY" / "memory")
        rule kw_sheet()     = ("SHEET" / "sheet")
        rule kw_postgres()  = ("POSTGRES" / "postgres")

        rule _()
            = [' ' | '\t' | '\r']

        rule __()
            = [' ' | '\t' | '\r' | '\n']

        rule num()
            = ['0'..='9']

        // e.g. '42'
        rule product_id() -> ProductId
            = id:$("-"? num()+) {? id.parse().or(Err("product id")) }

        // Anything up to the next blank. Validated later so a bad quantity can be
        // reported as an input error rather than a syntax error.
        rule raw_quantity() -> Arc<str>
            = q:$([^ ' ' | '\t' | '\r' | '\n' | ';' | '\'']+) { Arc::from(q) }

        // e.g. 'hello world', or 'Bob''s bolts' for a literal quote
        rule text() -> Arc<str>
            = "'" text:$(("''" / [^ '\'' | '\n' | '\r'])*) "'" { Arc::from(text.replace("''", "'")) }

        rule fields() -> ProductFields
            = name:text() _+ quantity:raw_quantity() tag:(_+ t:text() { t })? {
                ProductFields {
                    name,
                    quantity,
                    tag,
                }
            }

        rule use_command() -> UseCommand
            = kw_use() _+ kw_memory() { UseCommand { kind: BackendKind::Memory, source: None } }
            / kw_use() _+ kw_sheet() source:(_+ t:text() { t })? { UseCommand { kind: BackendKind::Sheet, source } }
            / kw_use() _+ kw_postgres() { UseCommand { kind: BackendKind::Postgres, source: None } }

        pub rule statement() -> Statement
            = kw_add() _+ f:fields() { Statement::Add(f) }
            / kw_update() _+ id:product_id() _+ f:fields() { Statement::Update(id, f) }
            / kw_delete() _+ id:product_id() { Statement::Delete(id) }
            / kw_list() { Statement::List }
            / u:use_command() { Statement::Use(u) }

        pub rule statements() -> Vec<Statement>
            = __* s:statement() ** (_* [';' | '\n'] __*) _* ";"? __* { s }
    }
}

pub fn parse(input: &str) -> Result<Vec<Statement>, ParseError<LineCol>> {
    inventory::statements(input)
}
