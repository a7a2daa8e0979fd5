//! Database Module
//!
//! Embedded SurrealDB storage. The server opens a RocksDB-backed database
//! under the work directory; tests use the in-memory engine.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "warung";
const DATABASE: &str = "warung";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        let service = Self { db };
        service.init().await?;
        tracing::info!("Database opened at {db_path} (SurrealDB embedded)");
        Ok(service)
    }

    /// Open a fresh in-memory database (tests, demos)
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        let service = Self { db };
        service.init().await?;
        Ok(service)
    }

    /// Select namespace/database and apply schema definitions
    async fn init(&self) -> Result<(), AppError> {
        self.db
            .use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select database: {e}")))?;

        // Unique lookups used by login and upsert-by-phone
        self.db
            .query(
                "DEFINE INDEX IF NOT EXISTS uniq_user_email ON TABLE user FIELDS email UNIQUE; \
                 DEFINE INDEX IF NOT EXISTS uniq_customer_phone ON TABLE customer FIELDS phone UNIQUE; \
                 DEFINE INDEX IF NOT EXISTS idx_order_status ON TABLE order FIELDS status; \
                 DEFINE INDEX IF NOT EXISTS idx_order_session ON TABLE order FIELDS session_id;",
            )
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

        Ok(())
    }
}
