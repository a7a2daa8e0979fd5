//! Storefront Content Models
//!
//! Onboarding pages and carousel banners shown by the customer app.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Onboarding page (ids look like `onboarding:1`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Onboarding {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub title1: String,
    pub title2: String,
    pub description1: String,
    pub description2: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Carousel banner (ids look like `carousel:1`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carousel {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Onboarding create payload (multipart fields; image handled separately)
#[derive(Debug, Clone, Default)]
pub struct OnboardingCreate {
    pub title1: String,
    pub title2: String,
    pub description1: String,
    pub description2: String,
    pub image: Option<String>,
    pub image_url: Option<String>,
}
