use std::fmt::Display;

use prettytable::{row, Table};
use stockroom_core::Product;

use crate::session::Outcome;

pub fn product_table(products: &[Product]) -> String {
    let mut table = Table::new();
    table.add_row(row!["ID", "Name", "Quantity", "Tag"]);
    table.add_empty_row();

    for p in products {
        table.add_row(row![p.id, p.name, p.quantity, p.tag_or_empty()]);
    }

    format!("\n{}\n", table)
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&product_table(&self.products))
    }
}
