use serde::{Deserialize, Serialize};

pub type ProductId = i32;

/// Id carried by a product that has not been stored yet. Backends overwrite it on `add`.
pub const UNASSIGNED_ID: ProductId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: i32,
    pub tag: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, quantity: i32) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            quantity,
            tag: None,
        }
    }

    /// An empty tag is treated as no tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = (!tag.is_empty()).then_some(tag);
        self
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    /// Form every backend stores: `Some("")` collapses to `None`.
    pub fn normalized(mut self) -> Self {
        if self.tag.as_deref() == Some("") {
            self.tag = None;
        }
        self
    }

    pub fn tag_or_empty(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_is_unassigned() {
        let p = Product::new("Bolt", 10).with_tag("hardware");
        assert_eq!(p.id, UNASSIGNED_ID);
        assert_eq!(p.tag.as_deref(), Some("hardware"));
    }

    #[test]
    fn empty_tag_is_no_tag() {
        assert_eq!(Product::new("Bolt", 1).with_tag("").tag, None);

        let raw = Product {
            tag: Some(String::new()),
            ..Product::new("Bolt", 1)
        };
        assert_eq!(raw.normalized(), Product::new("Bolt", 1));
    }

    #[test]
    fn with_id_keeps_other_fields() {
        let p = Product::new("Nut", -3).with_id(7);
        assert_eq!(p.id, 7);
        assert_eq!(p.name, "Nut");
        assert_eq!(p.quantity, -3);
        assert_eq!(p.tag_or_empty(), "");
    }
}
