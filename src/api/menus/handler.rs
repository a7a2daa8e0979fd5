//! Menu API Handlers
//!
//! Catalog CRUD (multipart, image-backed), the formatted storefront
//! listing, and the stock ledger endpoints.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};

use crate::api::upload::handler::store_image;
use crate::core::ServerState;
use crate::db::models::{Menu, MenuCreate, MenuUpdate};
use crate::db::repository::{MenuRepository, menu::MenuWithRelations};
use crate::stock::StockLedger;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// Parsed multipart payload: text fields + optional image file
struct MultipartPayload {
    fields: HashMap<String, String>,
    image: Option<(String, Vec<u8>)>,
}

impl MultipartPayload {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "image.jpg".to_string());
                image = Some((filename, field.bytes().await?.to_vec()));
            } else {
                fields.insert(name, field.text().await?);
            }
        }

        Ok(Self { fields, image })
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|s| s.trim().to_string())
    }

    fn parse_i64(&self, name: &str) -> Result<Option<i64>, AppError> {
        match self.fields.get(name) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AppError::validation(format!("{} must be an integer", name))),
            None => Ok(None),
        }
    }

    fn parse_bool(&self, name: &str) -> Result<Option<bool>, AppError> {
        match self.fields.get(name) {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map(Some)
                .map_err(|_| AppError::validation(format!("{} must be true or false", name))),
            None => Ok(None),
        }
    }
}

/// GET /api/menus - 获取所有菜单 (raw catalog rows)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Menu>>>> {
    let repo = MenuRepository::new(state.get_db());
    let menus = repo.find_all().await?;
    Ok(ok_with_message(menus, "Menus retrieved successfully"))
}

/// GET /api/menus/:id - 获取单个菜单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Menu>>> {
    let repo = MenuRepository::new(state.get_db());
    let menu = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", id)))?;
    Ok(ok_with_message(menu, "Menu retrieved successfully"))
}

/// POST /api/menus - 创建菜单 (multipart: nama, deskripsi, harga, kategori, image)
pub async fn create(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Menu>>> {
    let payload = MultipartPayload::read(multipart).await?;

    let nama = payload
        .text("nama")
        .ok_or_else(|| AppError::validation("nama is required"))?;
    validate_required_text(&nama, "nama", MAX_NAME_LEN)?;
    let deskripsi = payload.text("deskripsi");
    validate_optional_text(&deskripsi, "deskripsi", MAX_NOTE_LEN)?;
    let harga = payload
        .parse_i64("harga")?
        .ok_or_else(|| AppError::validation("harga is required"))?;
    if harga < 0 {
        return Err(AppError::validation("harga must not be negative"));
    }

    let stored = match payload.image {
        Some((ref filename, ref data)) => Some(store_image(&state, data, filename)?),
        None => None,
    };

    let repo = MenuRepository::new(state.get_db());
    let menu = repo
        .create(MenuCreate {
            nama,
            deskripsi,
            harga,
            kategori: payload.text("kategori").filter(|s| !s.is_empty()),
            image: stored.as_ref().map(|s| s.filename.clone()),
            image_url: stored.as_ref().map(|s| s.url.clone()),
        })
        .await?;

    Ok(ok_with_message(menu, "Menu created successfully"))
}

/// PUT /api/menus/:id - 更新菜单
///
/// Accepts the same multipart fields as create, all optional, plus the
/// stock configuration fields (status_stok, jumlah_stok, tersedia).
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Menu>>> {
    let payload = MultipartPayload::read(multipart).await?;

    let nama = payload.text("nama");
    if let Some(ref nama) = nama {
        validate_required_text(nama, "nama", MAX_NAME_LEN)?;
    }
    let deskripsi = payload.text("deskripsi");
    validate_optional_text(&deskripsi, "deskripsi", MAX_NOTE_LEN)?;
    let harga = payload.parse_i64("harga")?;
    if harga.is_some_and(|h| h < 0) {
        return Err(AppError::validation("harga must not be negative"));
    }

    let stored = match payload.image {
        Some((ref filename, ref data)) => Some(store_image(&state, data, filename)?),
        None => None,
    };

    let repo = MenuRepository::new(state.get_db());
    let menu = repo
        .update(
            &id,
            MenuUpdate {
                nama,
                deskripsi,
                harga,
                kategori: payload.text("kategori").filter(|s| !s.is_empty()),
                image: stored.as_ref().map(|s| s.filename.clone()),
                image_url: stored.as_ref().map(|s| s.url.clone()),
                status_stok: payload.parse_bool("status_stok")?,
                jumlah_stok: payload.parse_i64("jumlah_stok")?,
                tersedia: payload.parse_bool("tersedia")?,
            },
        )
        .await?;

    Ok(ok_with_message(menu, "Menu updated successfully"))
}

/// DELETE /api/menus/:id - 删除菜单
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Menu>>> {
    let repo = MenuRepository::new(state.get_db());
    let menu = repo.delete(&id).await?;
    Ok(ok_with_message(menu, "Menu deleted successfully"))
}

// =============================================================================
// Storefront listing
// =============================================================================

/// Choice entry in the storefront option map
#[derive(Debug, Serialize)]
struct DishChoice {
    name: String,
    price: i64,
}

/// Option entry in the storefront option map
#[derive(Debug, Serialize)]
struct DishOption {
    max: i64,
    optional: bool,
    choices: Vec<DishChoice>,
}

/// Storefront dish view, shaped for the customer app
#[derive(Debug, Serialize)]
pub struct Dish {
    id: String,
    name: String,
    price: i64,
    description: Option<String>,
    image: Option<String>,
    images: Vec<String>,
    tersedia: bool,
    #[serde(rename = "isReady")]
    is_ready: bool,
    stock: Option<i64>,
    /// Category names (single-element today)
    menu: Vec<String>,
    option: serde_json::Map<String, serde_json::Value>,
}

fn format_dish(row: MenuWithRelations) -> Dish {
    let mut option_map = serde_json::Map::new();
    for opt in row.options {
        let dish_opt = DishOption {
            max: opt.max,
            optional: opt.optional,
            choices: opt
                .choices
                .into_iter()
                .map(|c| DishChoice {
                    name: c.name,
                    price: c.price,
                })
                .collect(),
        };
        if let Ok(value) = serde_json::to_value(&dish_opt) {
            option_map.insert(opt.title, value);
        }
    }

    let menu = row.menu;
    Dish {
        id: menu.key(),
        name: menu.nama,
        price: menu.harga,
        description: menu.deskripsi,
        images: menu.image_url.iter().cloned().collect(),
        image: menu.image_url,
        tersedia: menu.tersedia,
        is_ready: menu.tersedia,
        stock: menu.jumlah_stok,
        menu: vec![
            row.category_name
                .unwrap_or_else(|| "Uncategorized".to_string()),
        ],
        option: option_map,
    }
}

/// GET /api/dishes - 顾客端菜单列表 (含分类名和选项组)
pub async fn dishes(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Dish>>>> {
    let repo = MenuRepository::new(state.get_db());
    let rows = repo.find_all_with_relations().await?;
    let dishes: Vec<Dish> = rows.into_iter().map(format_dish).collect();
    Ok(ok_with_message(dishes, "Dishes retrieved successfully"))
}

// =============================================================================
// Stock ledger endpoints
// =============================================================================

/// Stock adjustment payload
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub quantity: i64,
}

/// POST /api/menus/:id/stock/reserve - 预留库存
pub async fn reserve_stock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<Json<AppResponse<Menu>>> {
    let ledger = StockLedger::new(state.get_db());
    let menu = ledger.reserve(&id, payload.quantity).await?;
    Ok(ok_with_message(menu, "Stock reserved"))
}

/// POST /api/menus/:id/stock/restock - 补货
pub async fn restock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<Json<AppResponse<Menu>>> {
    let ledger = StockLedger::new(state.get_db());
    let menu = ledger.restock(&id, payload.quantity).await?;
    Ok(ok_with_message(menu, "Stock replenished"))
}

/// POST /api/menus/:id/stock/reduce - 手动扣减库存
pub async fn reduce_stock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<Json<AppResponse<Menu>>> {
    let ledger = StockLedger::new(state.get_db());
    let menu = ledger.reduce(&id, payload.quantity).await?;
    Ok(ok_with_message(menu, "Stock reduced"))
}
