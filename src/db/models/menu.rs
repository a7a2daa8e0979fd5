//! Menu Model
//!
//! Stock invariant: for a stock-tracked menu (`status_stok = true`) the
//! availability flag `tersedia` is always recomputed from `jumlah_stok`
//! at the write boundary — it is never set independently. Untracked menus
//! keep `tersedia` as a manual flag (default true) and ignore `jumlah_stok`.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type MenuId = RecordId;

/// Menu entry (ids look like `menu:BUR001`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<MenuId>,
    pub nama: String,
    #[serde(default)]
    pub deskripsi: Option<String>,
    /// Price in whole rupiah
    pub harga: i64,
    /// Record link to category
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub kategori: Option<RecordId>,
    /// Storage path of the uploaded image
    #[serde(default)]
    pub image: Option<String>,
    /// Public URL of the uploaded image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Whether availability is governed by a numeric stock count
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub status_stok: bool,
    /// Current stock count, meaningful only when `status_stok` is true
    #[serde(default)]
    pub jumlah_stok: Option<i64>,
    /// Currently orderable
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub tersedia: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Menu {
    /// Pure id part without the table prefix (e.g. "BUR001")
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|t| t.key().to_string())
            .unwrap_or_default()
    }
}

/// Create menu payload (multipart fields; image handled separately)
#[derive(Debug, Clone, Default)]
pub struct MenuCreate {
    pub nama: String,
    pub deskripsi: Option<String>,
    pub harga: i64,
    pub kategori: Option<String>,
    pub image: Option<String>,
    pub image_url: Option<String>,
}

/// Update menu payload
///
/// Stock configuration travels here too: enabling tracking takes an
/// initial count, while count changes on an already-tracked menu must go
/// through the stock ledger.
#[derive(Debug, Clone, Default)]
pub struct MenuUpdate {
    pub nama: Option<String>,
    pub deskripsi: Option<String>,
    pub harga: Option<i64>,
    pub kategori: Option<String>,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub status_stok: Option<bool>,
    pub jumlah_stok: Option<i64>,
    pub tersedia: Option<bool>,
}
