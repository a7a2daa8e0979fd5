//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserCreate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id ("user:<uuid>" or bare key)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pure_id = super::strip_table_prefix(TABLE, id);
        let user: Option<User> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user account
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate email
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                data.email
            )));
        }

        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let user = User {
            id: None,
            email: data.email,
            full_name: data.full_name,
            hash_pass,
            role: data.role,
            created_at: now_millis(),
        };

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Replace the password hash of an existing user
    pub async fn update_password(&self, id: &str, new_password: &str) -> RepoResult<()> {
        let pure_id = super::strip_table_prefix(TABLE, id).to_string();
        let hash_pass = User::hash_password(new_password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE type::thing('user', $id) SET hash_pass = $hash_pass RETURN AFTER")
            .bind(("id", pure_id.clone()))
            .bind(("hash_pass", hash_pass))
            .await?;

        let updated: Vec<User> = result.take(0)?;
        if updated.is_empty() {
            return Err(RepoError::NotFound(format!("User {} not found", pure_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn sample(email: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            password: "rahasia123".to_string(),
            full_name: "Kasir Satu".to_string(),
            role: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = UserRepository::new(db.db);

        let created = repo.create(sample("kasir@warung.id")).await.unwrap();
        assert!(created.id.is_some());

        let found = repo.find_by_email("kasir@warung.id").await.unwrap();
        assert!(found.is_some());
        assert!(found.unwrap().verify_password("rahasia123").unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = UserRepository::new(db.db);

        repo.create(sample("kasir@warung.id")).await.unwrap();
        let err = repo.create(sample("kasir@warung.id")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = UserRepository::new(db.db);

        let created = repo.create(sample("admin@warung.id")).await.unwrap();
        let id = created.id.as_ref().unwrap().key().to_string();

        repo.update_password(&id, "baru456").await.unwrap();
        let user = repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(user.verify_password("baru456").unwrap());
        assert!(!user.verify_password("rahasia123").unwrap());
    }
}
