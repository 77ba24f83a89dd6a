use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::lookup::LookupItem;
use crate::services::lookup_service::LookupList;
use crate::utils::validation::{
    deserialize_optional_flag, deserialize_optional_id, validate_not_blank,
};

/// Body for creating or replacing a department, employment or experience row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LookupPayload {
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub title_en: String,
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub title_id: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupResponse {
    pub id: i64,
    pub title_en: String,
    pub title_id: String,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LookupItem> for LookupResponse {
    fn from(value: LookupItem) -> Self {
        Self {
            id: value.id,
            title_en: value.title_en,
            title_id: value.title_id,
            is_active: value.is_active,
            created_by: value.created_by,
            updated_by: value.updated_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupListResponse {
    pub items: Vec<LookupResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<LookupList> for LookupListResponse {
    fn from(value: LookupList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LookupListQuery {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub per_page: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_active: Option<bool>,
    pub search: Option<String>,
}
