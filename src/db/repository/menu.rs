//! Menu Repository
//!
//! Catalog reads/writes for the `menu` table. Once stock tracking is
//! enabled on a menu, its `jumlah_stok`/`tersedia` pair belongs to the
//! stock ledger — catalog updates are rejected if they try to touch the
//! count or the flag of a tracked menu, so the ledger stays the only
//! writer and `tersedia ⇔ jumlah_stok > 0` cannot be broken from here.

use super::{BaseRepository, RepoError, RepoResult, SequenceRepository, strip_table_prefix};
use crate::db::models::{Menu, MenuCreate, MenuOption, MenuUpdate};
use crate::utils::time::now_millis;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "menu";
const ID_PREFIX: &str = "BUR";

/// Menu joined with its category name and option groups (query projection)
#[derive(Debug, Clone, Deserialize)]
pub struct MenuWithRelations {
    #[serde(flatten)]
    pub menu: Menu,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub options: Vec<MenuOption>,
}

#[derive(Clone)]
pub struct MenuRepository {
    base: BaseRepository,
    sequences: SequenceRepository,
}

impl MenuRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    /// Find all menus ordered by id
    pub async fn find_all(&self) -> RepoResult<Vec<Menu>> {
        let menus: Vec<Menu> = self
            .base
            .db()
            .query("SELECT * FROM menu ORDER BY id")
            .await?
            .take(0)?;
        Ok(menus)
    }

    /// Find all menus with category name and option groups for the storefront
    pub async fn find_all_with_relations(&self) -> RepoResult<Vec<MenuWithRelations>> {
        let menus: Vec<MenuWithRelations> = self
            .base
            .db()
            .query(
                "SELECT *, kategori.name AS category_name, \
                 (SELECT * FROM option WHERE $parent.id IN menus) AS options \
                 FROM menu ORDER BY id",
            )
            .await?
            .take(0)?;
        Ok(menus)
    }

    /// Find menu by id ("menu:BUR001" or "BUR001")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Menu>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let menu: Option<Menu> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(menu)
    }

    /// Create a new menu with a sequential BURxxx id
    ///
    /// New menus start untracked: manual availability flag, no stock count.
    pub async fn create(&self, data: MenuCreate) -> RepoResult<Menu> {
        let key = self.sequences.next_id(ID_PREFIX).await?;

        let kategori = match data.kategori {
            Some(ref cat) => {
                let pure = strip_table_prefix("category", cat);
                Some(surrealdb::RecordId::from_table_key("category", pure))
            }
            None => None,
        };

        let menu = Menu {
            id: None,
            nama: data.nama,
            deskripsi: data.deskripsi,
            harga: data.harga,
            kategori,
            image: data.image,
            image_url: data.image_url,
            status_stok: false,
            jumlah_stok: None,
            tersedia: true,
            created_at: now_millis(),
        };

        let created: Option<Menu> = self.base.db().create((TABLE, key)).content(menu).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu".to_string()))
    }

    /// Update a menu
    ///
    /// Stock configuration rules:
    /// - tracked menu: `jumlah_stok`/`tersedia` are ledger-owned, rejected here
    /// - enabling tracking: takes an initial count, flag recomputed from it
    /// - disabling tracking: count dropped, flag reverts to a manual default
    pub async fn update(&self, id: &str, data: MenuUpdate) -> RepoResult<Menu> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu {} not found", id)))?;

        let tracked_after = data.status_stok.unwrap_or(existing.status_stok);

        let (status_stok, jumlah_stok, tersedia) = match (existing.status_stok, tracked_after) {
            // Already tracked and staying tracked: ledger owns the pair
            (true, true) => {
                if data.jumlah_stok.is_some() || data.tersedia.is_some() {
                    return Err(RepoError::Validation(
                        "Stock of a tracked menu is adjusted through the stock ledger".to_string(),
                    ));
                }
                (None, None, None)
            }
            // Enabling tracking: seed the count, recompute the flag
            (false, true) => {
                let count = data.jumlah_stok.unwrap_or(0);
                if count < 0 {
                    return Err(RepoError::Validation(
                        "Initial stock count must not be negative".to_string(),
                    ));
                }
                (Some(true), Some(Some(count)), Some(count > 0))
            }
            // Disabling tracking: back to the manual flag
            (true, false) => (
                Some(false),
                Some(None),
                Some(data.tersedia.unwrap_or(true)),
            ),
            // Untracked: the flag stays manual
            (false, false) => (None, None, data.tersedia),
        };

        #[derive(Serialize)]
        struct MenuUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            nama: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            deskripsi: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            harga: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            kategori: Option<surrealdb::RecordId>,
            #[serde(skip_serializing_if = "Option::is_none")]
            image: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            image_url: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            status_stok: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            jumlah_stok: Option<Option<i64>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            tersedia: Option<bool>,
        }

        let update_data = MenuUpdateDb {
            nama: data.nama,
            deskripsi: data.deskripsi,
            harga: data.harga,
            kategori: data.kategori.map(|cat| {
                let pure = strip_table_prefix("category", &cat);
                surrealdb::RecordId::from_table_key("category", pure)
            }),
            image: data.image,
            image_url: data.image_url,
            status_stok,
            jumlah_stok,
            tersedia,
        };

        let pure_id = strip_table_prefix(TABLE, id).to_string();
        self.base
            .db()
            .query("UPDATE type::thing('menu', $id) MERGE $data")
            .bind(("id", pure_id.clone()))
            .bind(("data", update_data))
            .await?;

        self.find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu {} not found", id)))
    }

    /// Hard delete a menu (also detaches it from option groups)
    pub async fn delete(&self, id: &str) -> RepoResult<Menu> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();

        let existing = self
            .find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu {} not found", id)))?;

        self.base
            .db()
            .query("UPDATE option SET menus -= type::thing('menu', $id)")
            .bind(("id", pure_id.clone()))
            .await?;

        let _: Option<Menu> = self.base.db().delete((TABLE, pure_id)).await?;
        Ok(existing)
    }
}
