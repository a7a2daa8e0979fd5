//! Authentication Handlers
//!
//! Handles registration, login, profile and password changes.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{UserCreate, UserInfo};
use crate::db::repository::UserRepository;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// POST /api/auth/register - 注册用户
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<UserCreate>,
) -> AppResult<Json<AppResponse<UserInfo>>> {
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;
    validate_required_text(&req.full_name, "full_name", MAX_NAME_LEN)?;
    if req.role != "admin" && req.role != "user" {
        return Err(AppError::validation("role must be 'admin' or 'user'"));
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo.create(req).await?;

    tracing::info!(email = %user.email, role = %user.role, "User registered");
    Ok(ok_with_message(
        user.into(),
        "User registered successfully",
    ))
}

/// POST /api/auth/login - 登录
///
/// Authenticates credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_email(&req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent account enumeration
    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
            if !password_valid {
                tracing::warn!(target: "security", email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            u
        }
        None => {
            tracing::warn!(target: "security", email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let token = state
        .jwt_service()
        .generate_token(&user_id, &user.email, &user.full_name, &user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user_id, email = %user.email, "User logged in");

    Ok(ok_with_message(
        LoginResponse {
            token,
            user: user.into(),
        },
        "Login successful",
    ))
}

/// GET /api/auth/profile - 当前用户信息
pub async fn profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<UserInfo>>> {
    let repo = UserRepository::new(state.get_db());
    let profile = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;
    Ok(crate::utils::ok(profile.into()))
}

/// Change password payload
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword", default)]
    pub current_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// PUT /api/auth/password - 修改密码
pub async fn change_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    validate_required_text(&req.new_password, "newPassword", MAX_PASSWORD_LEN)?;

    let repo = UserRepository::new(state.get_db());

    // Verify current password first when provided
    if let Some(ref current) = req.current_password {
        let existing = repo
            .find_by_id(&user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile not found"))?;
        let valid = existing
            .verify_password(current)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::invalid("Current password is incorrect"));
        }
    }

    repo.update_password(&user.id, &req.new_password).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(ok_with_message((), "Password changed successfully"))
}

/// POST /api/auth/logout - 登出
///
/// Stateless JWT: the client drops the token; this endpoint exists for
/// audit logging symmetry.
pub async fn logout(
    user: CurrentUser,
) -> AppResult<Json<AppResponse<()>>> {
    tracing::info!(user_id = %user.id, email = %user.email, "User logged out");
    Ok(ok_with_message((), "Logout successful"))
}
