//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables. Each repository is a thin
//! struct over [`BaseRepository`], which holds the shared database handle.
//!
//! Multi-row invariants (stock reservation + status flip) are expressed as
//! `BEGIN TRANSACTION; ...; COMMIT TRANSACTION;` blocks; single-row
//! preconditions use conditional `UPDATE ... WHERE ... RETURN AFTER`
//! statements so the check and the write land in one storage operation.

pub mod category;
pub mod content;
pub mod customer;
pub mod menu;
pub mod option;
pub mod order;
pub mod sequence;
pub mod user;

// Re-exports
pub use category::CategoryRepository;
pub use content::ContentRepository;
pub use customer::CustomerRepository;
pub use menu::MenuRepository;
pub use option::MenuOptionRepository;
pub use order::OrderRepository;
pub use sequence::SequenceRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Strip a known table prefix from an id string ("menu:BUR001" -> "BUR001").
///
/// Also unwraps SurrealDB's angle-bracket key escaping ("user:⟨k⟩" -> "k").
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    let rest = id
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id);
    rest.strip_prefix('⟨')
        .and_then(|r| r.strip_suffix('⟩'))
        .unwrap_or(rest)
}
