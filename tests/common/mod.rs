//! Helpers for integration tests.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use pushkind_common::db::{DbPool, establish_connection_pool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Inserts a category and returns its id.
    #[allow(dead_code)]
    pub fn seed_category(&self, name: &str) -> i32 {
        use pushkind_catalog::schema::categories;

        let mut conn = self.pool.get().expect("connection");
        diesel::insert_into(categories::table)
            .values(categories::name.eq(name))
            .returning(categories::id)
            .get_result(&mut conn)
            .expect("insert category")
    }

    /// Inserts a product type and returns its id.
    #[allow(dead_code)]
    pub fn seed_product_type(&self, name: &str) -> i32 {
        use pushkind_catalog::schema::product_types;

        let mut conn = self.pool.get().expect("connection");
        diesel::insert_into(product_types::table)
            .values(product_types::name.eq(name))
            .returning(product_types::id)
            .get_result(&mut conn)
            .expect("insert product type")
    }

    /// Number of rows in the product type association table.
    #[allow(dead_code)]
    pub fn count_type_links(&self) -> i64 {
        use pushkind_catalog::schema::product_type_products;

        let mut conn = self.pool.get().expect("connection");
        product_type_products::table
            .count()
            .get_result(&mut conn)
            .expect("count links")
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}
