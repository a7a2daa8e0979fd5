//! Sequence Repository
//!
//! Single-row atomic counters backing human-readable sequential ids
//! (`BUR001`, `OPT001`, `CUS001`, ...) and the order queue number.
//!
//! Each counter is one record in the `sequence` table and every allocation
//! is a single `UPSERT ... RETURN AFTER` statement, so two concurrent
//! allocations can never observe the same value. This replaces the
//! scan-for-max pattern the queue number and id generation would otherwise
//! need, which loses updates under concurrent order placement.

use super::{BaseRepository, RepoError, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// First queue number handed out on an empty store
pub const QUEUE_START: i64 = 100;

#[derive(Clone)]
pub struct SequenceRepository {
    base: BaseRepository,
}

impl SequenceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically advance the named counter and return the new value.
    ///
    /// A missing counter record starts at `start`.
    pub async fn next_value(&self, name: &str, start: i64) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query(
                "UPSERT type::thing('sequence', $name) \
                 SET value = IF value != NONE THEN value + 1 ELSE $start END \
                 RETURN AFTER",
            )
            .bind(("name", name.to_string()))
            .bind(("start", start))
            .await?;

        let value: Option<i64> = result.take((0, "value"))?;
        value.ok_or_else(|| RepoError::Database(format!("Sequence '{}' allocation failed", name)))
    }

    /// Next sequential id for a prefix, formatted `{prefix}{n:03}`
    /// (e.g. "BUR001"; rolls over naturally to "BUR1000" after 999).
    pub async fn next_id(&self, prefix: &str) -> RepoResult<String> {
        let n = self.next_value(prefix, 1).await?;
        Ok(format!("{}{:03}", prefix, n))
    }

    /// Next human-facing queue number (first order ever gets 100).
    pub async fn next_queue_number(&self) -> RepoResult<i64> {
        self.next_value("queue", QUEUE_START).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> SequenceRepository {
        let db = DbService::new_in_memory().await.unwrap();
        SequenceRepository::new(db.db)
    }

    #[tokio::test]
    async fn test_id_formatting() {
        let seq = repo().await;
        assert_eq!(seq.next_id("BUR").await.unwrap(), "BUR001");
        assert_eq!(seq.next_id("BUR").await.unwrap(), "BUR002");
        // independent counters per prefix
        assert_eq!(seq.next_id("OPT").await.unwrap(), "OPT001");
    }

    #[tokio::test]
    async fn test_queue_starts_at_100() {
        let seq = repo().await;
        assert_eq!(seq.next_queue_number().await.unwrap(), 100);
        assert_eq!(seq.next_queue_number().await.unwrap(), 101);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct() {
        let seq = repo().await;
        let (a, b) = tokio::join!(seq.next_queue_number(), seq.next_queue_number());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a, b);
        assert_eq!(a.min(b), 100);
        assert_eq!(a.max(b), 101);
    }
}
