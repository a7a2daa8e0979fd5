//! Menu Option Repository

use super::{BaseRepository, RepoError, RepoResult, SequenceRepository, strip_table_prefix};
use crate::db::models::{MenuOption, MenuOptionUpsert, OptionChoice};
use crate::utils::time::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "option";
const ID_PREFIX: &str = "OPT";

/// Choice ids embed the option number: `CHO<option digits><index>`
/// ("OPT001" choice 2 -> "CHO00102"), matching the catalog id convention.
fn choice_id(option_key: &str, index: usize) -> String {
    let digits = option_key.strip_prefix(ID_PREFIX).unwrap_or(option_key);
    format!("CHO{}{:02}", digits, index + 1)
}

#[derive(Clone)]
pub struct MenuOptionRepository {
    base: BaseRepository,
    sequences: SequenceRepository,
}

impl MenuOptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    /// Find all option groups ordered by id
    pub async fn find_all(&self) -> RepoResult<Vec<MenuOption>> {
        let options: Vec<MenuOption> = self
            .base
            .db()
            .query("SELECT * FROM option ORDER BY id")
            .await?
            .take(0)?;
        Ok(options)
    }

    /// Find option group by id ("option:OPT001" or "OPT001")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuOption>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let option: Option<MenuOption> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(option)
    }

    fn menu_links(menu_ids: &[String]) -> Vec<RecordId> {
        menu_ids
            .iter()
            .map(|id| {
                let pure = strip_table_prefix("menu", id);
                RecordId::from_table_key("menu", pure)
            })
            .collect()
    }

    fn build_choices(option_key: &str, data: &MenuOptionUpsert) -> Vec<OptionChoice> {
        data.choices
            .iter()
            .enumerate()
            .map(|(i, c)| OptionChoice {
                id: choice_id(option_key, i),
                name: c.name.clone(),
                price: c.price,
            })
            .collect()
    }

    /// Create a new option group with a sequential OPTxxx id
    pub async fn create(&self, data: MenuOptionUpsert) -> RepoResult<MenuOption> {
        let key = self.sequences.next_id(ID_PREFIX).await?;

        let option = MenuOption {
            id: None,
            title: data.title.clone(),
            optional: data.optional,
            max: data.max,
            choices: Self::build_choices(&key, &data),
            menus: Self::menu_links(&data.menu_ids),
            created_at: now_millis(),
        };

        let created: Option<MenuOption> =
            self.base.db().create((TABLE, key)).content(option).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu option".to_string()))
    }

    /// Replace an option group: choices are regenerated wholesale and the
    /// menu links are reset to the given list.
    pub async fn update(&self, id: &str, data: MenuOptionUpsert) -> RepoResult<MenuOption> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let existing = self
            .find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu option {} not found", id)))?;

        // id stays out of the content; the record key addresses the row
        let updated = MenuOption {
            id: None,
            title: data.title.clone(),
            optional: data.optional,
            max: data.max,
            choices: Self::build_choices(&pure_id, &data),
            menus: Self::menu_links(&data.menu_ids),
            created_at: existing.created_at,
        };

        let saved: Option<MenuOption> = self
            .base
            .db()
            .update((TABLE, pure_id.clone()))
            .content(updated)
            .await?;
        saved.ok_or_else(|| RepoError::NotFound(format!("Menu option {} not found", id)))
    }

    /// Hard delete an option group (choices are embedded, nothing else to clean)
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let deleted: Option<MenuOption> = self.base.db().delete((TABLE, pure_id)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Menu option {} not found", id)));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ChoiceInput;

    fn spicy_levels(menu_ids: Vec<String>) -> MenuOptionUpsert {
        MenuOptionUpsert {
            title: "Level Pedas".to_string(),
            optional: false,
            max: 1,
            choices: vec![
                ChoiceInput {
                    name: "Original".to_string(),
                    price: 0,
                },
                ChoiceInput {
                    name: "Pedas".to_string(),
                    price: 2_000,
                },
            ],
            menu_ids,
        }
    }

    #[test]
    fn test_choice_id_format() {
        assert_eq!(choice_id("OPT001", 0), "CHO00101");
        assert_eq!(choice_id("OPT012", 9), "CHO01210");
    }

    #[tokio::test]
    async fn test_create_generates_choice_ids() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = MenuOptionRepository::new(db.db);

        let opt = repo.create(spicy_levels(vec![])).await.unwrap();
        assert_eq!(opt.id.as_ref().unwrap().key().to_string(), "OPT001");
        assert_eq!(opt.choices[0].id, "CHO00101");
        assert_eq!(opt.choices[1].id, "CHO00102");
    }

    #[tokio::test]
    async fn test_update_regenerates_choices() {
        let db = DbService::new_in_memory().await.unwrap();
        let repo = MenuOptionRepository::new(db.db);

        let opt = repo.create(spicy_levels(vec![])).await.unwrap();
        let key = opt.id.as_ref().unwrap().key().to_string();

        let mut edited = spicy_levels(vec!["BUR001".to_string()]);
        edited.choices.push(ChoiceInput {
            name: "Extra Pedas".to_string(),
            price: 4_000,
        });

        let updated = repo.update(&key, edited).await.unwrap();
        assert_eq!(updated.choices.len(), 3);
        assert_eq!(updated.choices[2].id, "CHO00103");
        assert_eq!(updated.menus.len(), 1);
    }
}
