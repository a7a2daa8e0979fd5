//! Menu Option Model
//!
//! Options (e.g. "Level Pedas", "Extra Topping") are shared between menus:
//! the option row carries the list of menu links, mirroring the direction
//! the storefront queries them from. Choices are embedded and regenerated
//! wholesale on every edit.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type MenuOptionId = RecordId;

/// Embedded option choice (ids look like `CHO00101`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChoice {
    pub id: String,
    pub name: String,
    /// Price delta in whole rupiah
    pub price: i64,
}

/// Menu option group (ids look like `option:OPT001`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuOption {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<MenuOptionId>,
    pub title: String,
    pub optional: bool,
    /// Maximum number of selectable choices
    pub max: i64,
    #[serde(default)]
    pub choices: Vec<OptionChoice>,
    /// Menus this option applies to
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub menus: Vec<RecordId>,
    pub created_at: i64,
}

/// Choice input for create/update
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceInput {
    pub name: String,
    pub price: i64,
}

/// Create/update payload
#[derive(Debug, Clone, Deserialize)]
pub struct MenuOptionUpsert {
    pub title: String,
    pub optional: bool,
    pub max: i64,
    pub choices: Vec<ChoiceInput>,
    /// Pure menu ids ("BUR001")
    pub menu_ids: Vec<String>,
}
