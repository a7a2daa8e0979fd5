//! Customer Repository

use super::{BaseRepository, RepoError, RepoResult, SequenceRepository};
use crate::db::models::{Customer, CustomerInput};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "customer";
const ID_PREFIX: &str = "CUS";

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
    sequences: SequenceRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    /// Find customer by phone number
    pub async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Customer>> {
        let phone_owned = phone.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM customer WHERE phone = $phone LIMIT 1")
            .bind(("phone", phone_owned))
            .await?;
        let customers: Vec<Customer> = result.take(0)?;
        Ok(customers.into_iter().next())
    }

    /// Resolve or create a customer by phone (upsert-by-phone)
    ///
    /// First order from a phone number creates the record; later orders
    /// reuse it. Name/email of an existing customer are left untouched.
    pub async fn upsert_by_phone(&self, data: CustomerInput) -> RepoResult<Customer> {
        if let Some(existing) = self.find_by_phone(&data.phone).await? {
            return Ok(existing);
        }

        let key = self.sequences.next_id(ID_PREFIX).await?;
        let customer = Customer {
            id: None,
            name: data.name,
            phone: data.phone,
            email: data.email,
            created_at: now_millis(),
        };

        let created: Option<Customer> = self
            .base
            .db()
            .create((TABLE, key))
            .content(customer)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create customer".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn budi() -> CustomerInput {
        CustomerInput {
            name: "Budi".to_string(),
            phone: "081234567890".to_string(),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_by_phone_reuses_record() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = CustomerRepository::new(db.db);

        let first = repo.upsert_by_phone(budi()).await.unwrap();
        assert_eq!(first.id.as_ref().unwrap().key().to_string(), "CUS001");

        // Same phone, different name: existing record wins
        let second = repo
            .upsert_by_phone(CustomerInput {
                name: "Budi Santoso".to_string(),
                ..budi()
            })
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Budi");

        let third = repo
            .upsert_by_phone(CustomerInput {
                name: "Sari".to_string(),
                phone: "089876543210".to_string(),
                email: None,
            })
            .await
            .unwrap();
        assert_eq!(third.id.as_ref().unwrap().key().to_string(), "CUS002");
    }
}
