use std::sync::{
    atomic::{AtomicI32, Ordering},
    RwLock,
};

use stockroom_core::{DaoError, Product, ProductDao, ProductId};

/// List-backed store. Ids come from a counter that starts at 1 and is never rewound,
/// so ids stay unique for the lifetime of the store even across deletes.
pub struct InMemoryProductDao {
    products: RwLock<Vec<Product>>,
    id_counter: AtomicI32,
}

impl Default for InMemoryProductDao {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductDao {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            id_counter: AtomicI32::new(1),
        }
    }

    #[cfg(test)]
    fn with_next_id(next: ProductId) -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            id_counter: AtomicI32::new(next),
        }
    }

    fn next_id(&self) -> Result<ProductId, DaoError> {
        self.id_counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| DaoError::IdsExhausted)
    }
}

impl ProductDao for InMemoryProductDao {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn add(&self, product: Product) -> Result<Product, DaoError> {
        let mut products = self.products.write().map_err(|_| DaoError::LockPoisoned)?;
        let stored = product.normalized().with_id(self.next_id()?);
        products.push(stored.clone());
        tracing::debug!(id = stored.id, "Product added");
        Ok(stored)
    }

    fn update(&self, product: &Product) -> Result<bool, DaoError> {
        let mut products = self.products.write().map_err(|_| DaoError::LockPoisoned)?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product.clone().normalized();
                tracing::debug!(id = product.id, "Product updated");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: ProductId) -> Result<bool, DaoError> {
        let mut products = self.products.write().map_err(|_| DaoError::LockPoisoned)?;
        let before = products.len();
        products.retain(|p| p.id != id);
        let removed = products.len() != before;
        if removed {
            tracing::debug!(id, "Product deleted");
        }
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<Product>, DaoError> {
        let products = self.products.read().map_err(|_| DaoError::LockPoisoned)?;
        Ok(products.clone())
    }

    fn configure(&self, _source: &str) -> Result<(), DaoError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_empty_store_assigns_id_one() {
        let dao = InMemoryProductDao::new();
        let stored = dao.add(Product::new("Bolt", 10).with_tag("hardware")).unwrap();
        assert_eq!(stored.id, 1);

        let all = dao.list().unwrap();
        assert_eq!(all, vec![Product::new("Bolt", 10).with_tag("hardware").with_id(1)]);
    }

    #[test]
    fn caller_id_is_ignored() {
        let dao = InMemoryProductDao::new();
        let stored = dao.add(Product::new("Nut", 5).with_id(42)).unwrap();
        assert_eq!(stored.id, 1);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let dao = InMemoryProductDao::new();
        let a = dao.add(Product::new("a", 1)).unwrap();
        let b = dao.add(Product::new("b", 2)).unwrap();
        assert!(dao.delete(b.id).unwrap());
        let c = dao.add(Product::new("c", 3)).unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    }

    #[test]
    fn delete_first_keeps_second() {
        let dao = InMemoryProductDao::new();
        let first = dao.add(Product::new("Bolt", 10)).unwrap();
        let second = dao.add(Product::new("Washer", 200).with_tag("hardware")).unwrap();

        assert!(dao.delete(first.id).unwrap());
        assert_eq!(dao.list().unwrap(), vec![second]);
    }

    #[test]
    fn update_replaces_in_place() {
        let dao = InMemoryProductDao::new();
        dao.add(Product::new("a", 1)).unwrap();
        let b = dao.add(Product::new("b", 2)).unwrap();
        dao.add(Product::new("c", 3)).unwrap();

        let edited = Product::new("B", 20).with_tag("x").with_id(b.id);
        assert!(dao.update(&edited).unwrap());

        let names: Vec<_> = dao.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "B", "c"]);
    }

    #[test]
    fn missing_id_is_reported_and_leaves_store_unchanged() {
        let dao = InMemoryProductDao::new();
        dao.add(Product::new("a", 1)).unwrap();
        let before = dao.list().unwrap();

        assert!(!dao.update(&Product::new("ghost", 0).with_id(99)).unwrap());
        assert!(!dao.delete(99).unwrap());
        assert_eq!(dao.list().unwrap(), before);
    }

    #[test]
    fn empty_tag_reads_back_as_stored() {
        let dao = InMemoryProductDao::new();
        let raw = Product {
            tag: Some(String::new()),
            ..Product::new("Bolt", 1)
        };
        let stored = dao.add(raw).unwrap();
        assert_eq!(stored.tag, None);
        assert_eq!(dao.list().unwrap(), vec![stored]);
    }

    #[test]
    fn counter_stops_at_id_limit() {
        let dao = InMemoryProductDao::with_next_id(ProductId::MAX - 1);
        let last = dao.add(Product::new("a", 1)).unwrap();
        assert_eq!(last.id, ProductId::MAX - 1);

        assert!(matches!(dao.add(Product::new("b", 2)), Err(DaoError::IdsExhausted)));
        assert!(matches!(dao.add(Product::new("c", 3)), Err(DaoError::IdsExhausted)));
        assert_eq!(dao.list().unwrap(), vec![last]);
    }

    #[test]
    fn list_is_a_copy() {
        let dao = InMemoryProductDao::new();
        dao.add(Product::new("a", 1)).unwrap();
        let mut snapshot = dao.list().unwrap();
        snapshot.clear();
        assert_eq!(dao.list().unwrap().len(), 1);
    }
}
