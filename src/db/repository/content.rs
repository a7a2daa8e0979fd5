//! Storefront Content Repository
//!
//! Onboarding pages and carousel banners use small numeric sequence ids,
//! unlike the prefixed catalog ids.

use super::{BaseRepository, RepoError, RepoResult, SequenceRepository, strip_table_prefix};
use crate::db::models::{Carousel, Onboarding, OnboardingCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ContentRepository {
    base: BaseRepository,
    sequences: SequenceRepository,
}

impl ContentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    /// All onboarding pages ordered by id
    pub async fn find_all_onboarding(&self) -> RepoResult<Vec<Onboarding>> {
        let pages: Vec<Onboarding> = self
            .base
            .db()
            .query("SELECT * FROM onboarding ORDER BY id")
            .await?
            .take(0)?;
        Ok(pages)
    }

    /// Create an onboarding page
    pub async fn create_onboarding(&self, data: OnboardingCreate) -> RepoResult<Onboarding> {
        let key = self.sequences.next_value("onboarding", 1).await?;
        let page = Onboarding {
            id: None,
            title1: data.title1,
            title2: data.title2,
            description1: data.description1,
            description2: data.description2,
            image: data.image,
            image_url: data.image_url,
        };
        let created: Option<Onboarding> = self
            .base
            .db()
            .create(("onboarding", key))
            .content(page)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create onboarding".to_string()))
    }

    /// All carousel banners ordered by id
    pub async fn find_all_carousel(&self) -> RepoResult<Vec<Carousel>> {
        let banners: Vec<Carousel> = self
            .base
            .db()
            .query("SELECT * FROM carousel ORDER BY id")
            .await?
            .take(0)?;
        Ok(banners)
    }

    /// Create a carousel banner
    pub async fn create_carousel(
        &self,
        image: Option<String>,
        image_url: Option<String>,
    ) -> RepoResult<Carousel> {
        let key = self.sequences.next_value("carousel", 1).await?;
        let banner = Carousel {
            id: None,
            image,
            image_url,
        };
        let created: Option<Carousel> = self
            .base
            .db()
            .create(("carousel", key))
            .content(banner)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create carousel".to_string()))
    }

    /// Delete a carousel banner by numeric id
    pub async fn delete_carousel(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix("carousel", id);
        let key: i64 = pure_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid carousel id: {}", id)))?;
        let deleted: Option<Carousel> = self.base.db().delete(("carousel", key)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Carousel {} not found", id)));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_carousel_crud() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = ContentRepository::new(db.db);

        let banner = repo
            .create_carousel(Some("uploads/a.jpg".into()), Some("/api/image/a.jpg".into()))
            .await
            .unwrap();
        assert_eq!(banner.id.as_ref().unwrap().key().to_string(), "1");

        assert_eq!(repo.find_all_carousel().await.unwrap().len(), 1);
        assert!(repo.delete_carousel("1").await.unwrap());
        assert!(repo.find_all_carousel().await.unwrap().is_empty());

        let err = repo.delete_carousel("1").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
