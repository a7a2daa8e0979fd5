//! Category Repository

use super::{BaseRepository, RepoError, RepoResult, SequenceRepository, strip_table_prefix};
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "category";
const ID_PREFIX: &str = "CAT";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
    sequences: SequenceRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    /// Find all categories ordered by id
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY id")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let category: Option<Category> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(category)
    }

    /// Find category by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a new category with a sequential CATxxx id
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        // Check duplicate name
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let key = self.sequences.next_id(ID_PREFIX).await?;
        let category = Category {
            id: None,
            name: data.name,
            created_at: now_millis(),
        };

        let created: Option<Category> = self
            .base
            .db()
            .create((TABLE, key))
            .content(category)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Update a category
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))?;

        // Check duplicate name if changing
        if let Some(ref new_name) = data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                new_name
            )));
        }

        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query("UPDATE type::thing('category', $id) SET name = $name OR name RETURN AFTER")
            .bind(("id", pure_id.clone()))
            .bind(("name", data.name))
            .await?;

        result
            .take::<Vec<Category>>(0)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))
    }

    /// Hard delete a category; refuses while menus still reference it
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM menu WHERE kategori = type::thing('category', $id) GROUP ALL")
            .bind(("id", pure_id.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete category with menus".to_string(),
            ));
        }

        let deleted: Option<Category> = self.base.db().delete((TABLE, pure_id)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Category {} not found", id)));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_sequential_ids_and_duplicate_name() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = CategoryRepository::new(db.db);

        let a = repo
            .create(CategoryCreate {
                name: "Burger".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(a.id.as_ref().unwrap().key().to_string(), "CAT001");

        let b = repo
            .create(CategoryCreate {
                name: "Minuman".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(b.id.as_ref().unwrap().key().to_string(), "CAT002");

        let err = repo
            .create(CategoryCreate {
                name: "Burger".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
