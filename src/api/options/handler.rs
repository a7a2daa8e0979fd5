//! Menu Option API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{MenuOption, MenuOptionUpsert};
use crate::db::repository::MenuOptionRepository;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

fn validate_payload(payload: &MenuOptionUpsert) -> Result<(), AppError> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    if payload.max <= 0 {
        return Err(AppError::validation("max must be positive"));
    }
    if payload.choices.is_empty() {
        return Err(AppError::validation("choices must not be empty"));
    }
    for choice in &payload.choices {
        validate_required_text(&choice.name, "choice name", MAX_NAME_LEN)?;
    }
    Ok(())
}

/// GET /api/options - 获取所有选项组
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<MenuOption>>>> {
    let repo = MenuOptionRepository::new(state.get_db());
    let options = repo.find_all().await?;
    Ok(ok_with_message(
        options,
        "Menu options fetched successfully",
    ))
}

/// GET /api/options/:id - 获取单个选项组
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<MenuOption>>> {
    let repo = MenuOptionRepository::new(state.get_db());
    let option = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu option {} not found", id)))?;
    Ok(ok_with_message(option, "Menu option fetched successfully"))
}

/// POST /api/options - 创建选项组
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuOptionUpsert>,
) -> AppResult<Json<AppResponse<MenuOption>>> {
    validate_payload(&payload)?;

    let repo = MenuOptionRepository::new(state.get_db());
    let option = repo.create(payload).await?;
    Ok(ok_with_message(option, "Menu option created successfully"))
}

/// PUT /api/options/:id - 更新选项组 (choices 整体重建)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuOptionUpsert>,
) -> AppResult<Json<AppResponse<MenuOption>>> {
    validate_payload(&payload)?;

    let repo = MenuOptionRepository::new(state.get_db());
    let option = repo.update(&id, payload).await?;
    Ok(ok_with_message(option, "Menu option updated successfully"))
}

/// DELETE /api/options/:id - 删除选项组
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let repo = MenuOptionRepository::new(state.get_db());
    let result = repo.delete(&id).await?;
    Ok(ok_with_message(result, "Menu option deleted successfully"))
}
