//! Storefront Content Handlers
//!
//! Onboarding pages and carousel banners for the customer app.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;

use crate::api::upload::handler::store_image;
use crate::core::ServerState;
use crate::db::models::{Carousel, Onboarding, OnboardingCreate};
use crate::db::repository::ContentRepository;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// Onboarding page shaped for the customer app
#[derive(Debug, Serialize)]
pub struct OnboardingView {
    pub id: String,
    pub title1: String,
    pub title2: String,
    pub image: Option<String>,
    pub description1: String,
    pub description2: String,
}

impl From<Onboarding> for OnboardingView {
    fn from(page: Onboarding) -> Self {
        Self {
            id: page.id.as_ref().map(|t| t.key().to_string()).unwrap_or_default(),
            title1: page.title1,
            title2: page.title2,
            image: page.image_url,
            description1: page.description1,
            description2: page.description2,
        }
    }
}

/// Carousel banner shaped for the customer app
#[derive(Debug, Serialize)]
pub struct CarouselView {
    pub id: String,
    pub banner: Option<String>,
}

impl From<Carousel> for CarouselView {
    fn from(banner: Carousel) -> Self {
        Self {
            id: banner.id.as_ref().map(|t| t.key().to_string()).unwrap_or_default(),
            banner: banner.image_url,
        }
    }
}

/// GET /api/onboarding - 获取引导页
pub async fn list_onboarding(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<OnboardingView>>>> {
    let repo = ContentRepository::new(state.get_db());
    let pages = repo.find_all_onboarding().await?;
    Ok(ok_with_message(
        pages.into_iter().map(Into::into).collect(),
        "Onboarding retrieved successfully",
    ))
}

/// POST /api/onboarding - 创建引导页 (multipart + image)
pub async fn create_onboarding(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<OnboardingView>>> {
    let mut data = OnboardingCreate::default();
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "image.jpg".to_string());
                image = Some((filename, field.bytes().await?.to_vec()));
            }
            "title1" => data.title1 = field.text().await?,
            "title2" => data.title2 = field.text().await?,
            "description1" => data.description1 = field.text().await?,
            "description2" => data.description2 = field.text().await?,
            _ => {}
        }
    }

    validate_required_text(&data.title1, "title1", MAX_NAME_LEN)?;
    validate_required_text(&data.description1, "description1", MAX_NOTE_LEN)?;

    if let Some((ref filename, ref bytes)) = image {
        let stored = store_image(&state, bytes, filename)?;
        data.image = Some(stored.filename);
        data.image_url = Some(stored.url);
    }

    let repo = ContentRepository::new(state.get_db());
    let page = repo.create_onboarding(data).await?;
    Ok(ok_with_message(
        page.into(),
        "Onboarding created successfully",
    ))
}

/// GET /api/carousel - 获取轮播图
pub async fn list_carousel(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<CarouselView>>>> {
    let repo = ContentRepository::new(state.get_db());
    let banners = repo.find_all_carousel().await?;
    Ok(ok_with_message(
        banners.into_iter().map(Into::into).collect(),
        "Carousel retrieved successfully",
    ))
}

/// POST /api/carousel - 创建轮播图 (multipart image)
pub async fn create_carousel(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<CarouselView>>> {
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "image.jpg".to_string());
            image = Some((filename, field.bytes().await?.to_vec()));
        }
    }

    let (filename, bytes) =
        image.ok_or_else(|| AppError::validation("image field is required"))?;
    let stored = store_image(&state, &bytes, &filename)?;

    let repo = ContentRepository::new(state.get_db());
    let banner = repo
        .create_carousel(Some(stored.filename), Some(stored.url))
        .await?;
    Ok(ok_with_message(
        banner.into(),
        "Carousel created successfully",
    ))
}

/// DELETE /api/carousel/:id - 删除轮播图
pub async fn delete_carousel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let repo = ContentRepository::new(state.get_db());
    let result = repo.delete_carousel(&id).await?;
    Ok(ok_with_message(result, "Carousel deleted successfully"))
}
