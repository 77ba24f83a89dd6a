use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::vacancy::{DepartmentVacancyCount, VacancyRecord};
use crate::services::vacancy_service::VacancyList;
use crate::utils::slug::slugify;
use crate::utils::validation::{
    deserialize_optional_flag, deserialize_optional_id, validate_not_blank, validate_work_mode,
};

/// Body of `POST /vacancies` and `PUT /vacancies/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct VacancyPayload {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title_en: String,
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title_id: String,
    pub department_id: i64,
    pub employment_id: Option<i64>,
    pub experience_id: i64,
    #[validate(custom(function = "validate_work_mode"))]
    pub work_mode: Option<String>,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub requirements_en: Option<String>,
    pub requirements_id: Option<String>,
    pub responsibilities_en: Option<String>,
    pub responsibilities_id: Option<String>,
    pub posted_date: NaiveDate,
    pub closed_date: Option<NaiveDate>,
    pub urgent: Option<bool>,
    pub is_active: Option<bool>,
}

impl VacancyPayload {
    /// Field checks plus the close-after-post rule.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if let Some(closed) = self.closed_date {
            if closed < self.posted_date {
                return Err(Error::invalid(
                    "closed_date",
                    "The closed date must be a date after or equal to posted date.",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupRef {
    pub id: i64,
    pub title_en: String,
    pub title_id: String,
}

impl LookupRef {
    fn from_parts(id: Option<i64>, title_en: Option<String>, title_id: Option<String>) -> Option<Self> {
        Some(Self {
            id: id?,
            title_en: title_en?,
            title_id: title_id?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VacancyResponse {
    pub id: i64,
    pub slug: String,
    pub title_en: String,
    pub title_id: String,
    pub department_id: i64,
    pub employment_id: Option<i64>,
    pub experience_id: i64,
    pub department: Option<LookupRef>,
    pub employment: Option<LookupRef>,
    pub experience: Option<LookupRef>,
    pub work_mode: Option<String>,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub requirements_en: Option<String>,
    pub requirements_id: Option<String>,
    pub responsibilities_en: Option<String>,
    pub responsibilities_id: Option<String>,
    pub posted_date: NaiveDate,
    pub closed_date: Option<NaiveDate>,
    pub urgent: bool,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VacancyRecord> for VacancyResponse {
    fn from(value: VacancyRecord) -> Self {
        let v = value.vacancy;
        Self {
            id: v.id,
            slug: slugify(&v.title_en),
            department: LookupRef::from_parts(
                Some(v.department_id),
                value.department_title_en,
                value.department_title_id,
            ),
            employment: LookupRef::from_parts(
                v.employment_id,
                value.employment_title_en,
                value.employment_title_id,
            ),
            experience: LookupRef::from_parts(
                Some(v.experience_id),
                value.experience_title_en,
                value.experience_title_id,
            ),
            title_en: v.title_en,
            title_id: v.title_id,
            department_id: v.department_id,
            employment_id: v.employment_id,
            experience_id: v.experience_id,
            work_mode: v.work_mode,
            description_en: v.description_en,
            description_id: v.description_id,
            requirements_en: v.requirements_en,
            requirements_id: v.requirements_id,
            responsibilities_en: v.responsibilities_en,
            responsibilities_id: v.responsibilities_id,
            posted_date: v.posted_date,
            closed_date: v.closed_date,
            urgent: v.urgent,
            is_active: v.is_active,
            created_by: v.created_by,
            updated_by: v.updated_by,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VacancyListResponse {
    pub items: Vec<VacancyResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<VacancyList> for VacancyListResponse {
    fn from(value: VacancyList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

/// Filters shared by every vacancy listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VacancyFilterQuery {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub department_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub employment_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub experience_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_urgent: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VacancyListQuery {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub department_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub employment_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub experience_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_urgent: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub per_page: Option<i64>,
}

impl VacancyListQuery {
    pub fn filter(&self) -> VacancyFilterQuery {
        VacancyFilterQuery {
            department_id: self.department_id,
            employment_id: self.employment_id,
            experience_id: self.experience_id,
            is_active: self.is_active,
            is_urgent: self.is_urgent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelatedVacancyQuery {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub department_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub current_vacancy_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiryReport {
    pub inactivated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LatestVacancy {
    pub id: i64,
    pub title_en: String,
    pub title_id: String,
    pub work_mode: Option<String>,
    pub urgent: bool,
    pub is_active: bool,
    pub posted_date: NaiveDate,
    pub closed_date: Option<NaiveDate>,
    pub department_name: String,
    pub experience_level: String,
}

impl From<VacancyRecord> for LatestVacancy {
    fn from(value: VacancyRecord) -> Self {
        let v = value.vacancy;
        Self {
            id: v.id,
            title_en: v.title_en,
            title_id: v.title_id,
            work_mode: v.work_mode,
            urgent: v.urgent,
            is_active: v.is_active,
            posted_date: v.posted_date,
            closed_date: v.closed_date,
            department_name: value.department_title_en.unwrap_or_else(|| "N/A".to_string()),
            experience_level: value.experience_title_en.unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentCountResponse {
    pub id: i64,
    pub title_en: String,
    pub vacancy_count: i64,
}

impl From<DepartmentVacancyCount> for DepartmentCountResponse {
    fn from(value: DepartmentVacancyCount) -> Self {
        Self {
            id: value.id,
            title_en: value.title_en,
            vacancy_count: value.vacancy_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VacancyStatisticsResponse {
    pub total_vacancies: i64,
    pub active_vacancies: i64,
    pub urgent_vacancies: i64,
    pub total_departments: i64,
    pub total_experiences: i64,
    pub latest_vacancies: Vec<LatestVacancy>,
    pub vacancies_by_department: Vec<DepartmentCountResponse>,
}
