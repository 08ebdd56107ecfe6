use std::sync::{Mutex, MutexGuard};

use postgres::{Client, NoTls, Row};
use stockroom_core::{DaoError, Product, ProductDao, ProductId};

/// Fixed endpoint used by [`PostgresProductDao::new`]. It is not read from configuration.
pub const DEFAULT_CONNECTION: &str = "host=localhost port=7777 dbname=dao user=postgres password=postgres";

pub struct PostgresProductDao {
    client: Mutex<Client>,
}

impl PostgresProductDao {
    pub fn new() -> Result<Self, DaoError> {
        Self::connect(DEFAULT_CONNECTION)
    }

    pub fn connect(connection_string: &str) -> Result<Self, DaoError> {
        let client = Client::connect(connection_string, NoTls).map_err(|e| {
            tracing::error!(error = %e, "PostgreSQL connection failed");
            DaoError::ConnectionFailed(e.to_string())
        })?;

        let dao = Self {
            client: Mutex::new(client),
        };
        dao.init_schema()?;
        Ok(dao)
    }

    fn init_schema(&self) -> Result<(), DaoError> {
        let mut client = self.client()?;
        client
            .batch_execute(
                "
            CREATE TABLE IF NOT EXISTS products (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                quantity INTEGER NOT NULL,
                tag VARCHAR(255)
            );
            ",
            )
            .map_err(query_error)?;
        Ok(())
    }

    fn client(&self) -> Result<MutexGuard<'_, Client>, DaoError> {
        self.client.lock().map_err(|_| DaoError::LockPoisoned)
    }
}

fn query_error(e: postgres::Error) -> DaoError {
    tracing::warn!(error = %e, "PostgreSQL statement failed");
    DaoError::Query(e.to_string())
}

fn row_to_product(row: &Row) -> Result<Product, DaoError> {
    Ok(Product {
        id: row.try_get("id").map_err(query_error)?,
        name: row.try_get("name").map_err(query_error)?,
        quantity: row.try_get("quantity").map_err(query_error)?,
        tag: row.try_get("tag").map_err(query_error)?,
    })
}

impl ProductDao for PostgresProductDao {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn add(&self, product: Product) -> Result<Product, DaoError> {
        let product = product.normalized();
        let mut client = self.client()?;
        let row = client
            .query_one(
                "INSERT INTO products (name, quantity, tag) VALUES ($1, $2, $3) RETURNING id",
                &[&product.name, &product.quantity, &product.tag],
            )
            .map_err(query_error)?;
        let id: ProductId = row.try_get(0).map_err(query_error)?;
        tracing::debug!(id, "Product added");
        Ok(product.with_id(id))
    }

    fn update(&self, product: &Product) -> Result<bool, DaoError> {
        let product = product.clone().normalized();
        let mut client = self.client()?;
        let affected = client
            .execute(
                "UPDATE products SET name = $1, quantity = $2, tag = $3 WHERE id = $4",
                &[&product.name, &product.quantity, &product.tag, &product.id],
            )
            .map_err(query_error)?;
        tracing::debug!(id = product.id, affected, "Product update executed");
        Ok(affected > 0)
    }

    fn delete(&self, id: ProductId) -> Result<bool, DaoError> {
        let mut client = self.client()?;
        let affected = client
            .execute("DELETE FROM products WHERE id = $1", &[&id])
            .map_err(query_error)?;
        tracing::debug!(id, affected, "Product delete executed");
        Ok(affected > 0)
    }

    fn list(&self) -> Result<Vec<Product>, DaoError> {
        let mut client = self.client()?;
        let rows = client
            .query("SELECT id, name, quantity, tag FROM products ORDER BY id", &[])
            .map_err(query_error)?;
        rows.iter().map(row_to_product).collect()
    }

    fn configure(&self, source: &str) -> Result<(), DaoError> {
        tracing::debug!(source, "Ignoring source for fixed PostgreSQL endpoint");
        Ok(())
    }
}

/// These run against a live server and are skipped unless
/// `STOCKROOM_TEST_PG_URL` holds a connection string. Each test drops and
/// recreates the `products` table.
#[cfg(test)]
mod tests {
    use super::*;

    // The tests share one table.
    static DB_LOCK: Mutex<()> = Mutex::new(());

    fn fresh_dao() -> Option<(MutexGuard<'static, ()>, PostgresProductDao)> {
        let url = std::env::var("STOCKROOM_TEST_PG_URL").ok()?;
        let guard = DB_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut client = Client::connect(&url, NoTls).unwrap();
        client.batch_execute("DROP TABLE IF EXISTS products").unwrap();
        Some((guard, PostgresProductDao::connect(&url).unwrap()))
    }

    #[test]
    fn unreachable_server_is_connection_failure() {
        let result = PostgresProductDao::connect("host=127.0.0.1 port=1 user=nobody connect_timeout=1");
        assert!(matches!(result, Err(DaoError::ConnectionFailed(_))));
    }

    #[test]
    fn round_trip_and_generated_ids() {
        let Some((_guard, dao)) = fresh_dao() else { return };

        let a = dao.add(Product::new("Bolt", 10).with_tag("hardware")).unwrap();
        let b = dao.add(Product::new("Glue", -1)).unwrap();
        assert!(b.id > a.id);

        let mut all = dao.list().unwrap();
        all.sort_by_key(|p| p.id);
        assert_eq!(all, vec![a, b]);
    }

    #[test]
    fn missing_id_affects_nothing() {
        let Some((_guard, dao)) = fresh_dao() else { return };

        let a = dao.add(Product::new("Bolt", 10)).unwrap();
        assert!(!dao.update(&Product::new("ghost", 0).with_id(a.id + 100)).unwrap());
        assert!(!dao.delete(a.id + 100).unwrap());
        assert_eq!(dao.list().unwrap(), vec![a]);
    }

    #[test]
    fn update_then_delete() {
        let Some((_guard, dao)) = fresh_dao() else { return };

        let a = dao.add(Product::new("Bolt", 10)).unwrap();
        let b = dao.add(Product::new("Nut", 5)).unwrap();

        let edited = Product::new("Bolt M6", 11).with_tag("hw").with_id(a.id);
        assert!(dao.update(&edited).unwrap());
        assert!(dao.delete(b.id).unwrap());
        assert_eq!(dao.list().unwrap(), vec![edited]);
    }
}
