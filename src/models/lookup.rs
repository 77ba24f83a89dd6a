use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The small reference tables a vacancy points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Department,
    Employment,
    Experience,
}

impl LookupKind {
    pub const fn table(self) -> &'static str {
        match self {
            LookupKind::Department => "departments",
            LookupKind::Employment => "employments",
            LookupKind::Experience => "experiences",
        }
    }

    /// Column on `vacancies` referencing this table.
    pub const fn vacancy_column(self) -> &'static str {
        match self {
            LookupKind::Department => "department_id",
            LookupKind::Employment => "employment_id",
            LookupKind::Experience => "experience_id",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LookupKind::Department => "Department",
            LookupKind::Employment => "Employment",
            LookupKind::Experience => "Experience",
        }
    }

    pub const fn plural_label(self) -> &'static str {
        match self {
            LookupKind::Department => "Departments",
            LookupKind::Employment => "Employments",
            LookupKind::Experience => "Experiences",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LookupItem {
    pub id: i64,
    pub title_en: String,
    pub title_id: String,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
