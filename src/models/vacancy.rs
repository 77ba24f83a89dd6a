use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `vacancies` table. `_en`/`_id` suffixes on text columns are the
/// English and Indonesian translations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    pub id: i64,
    pub title_en: String,
    pub title_id: String,
    pub department_id: i64,
    pub employment_id: Option<i64>,
    pub experience_id: i64,
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

impl Vacancy {
    /// Public listing rule: active, already posted, and not past its close date.
    pub fn is_visible_on(&self, today: NaiveDate) -> bool {
        self.is_active
            && self.posted_date <= today
            && self.closed_date.map_or(true, |closed| closed >= today)
    }

    /// Active but past its close date; the sweeper turns these inactive.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.is_active && self.closed_date.is_some_and(|closed| closed < today)
    }
}

/// Vacancy joined with the titles of the lookup rows it references.
#[derive(Debug, Clone, FromRow)]
pub struct VacancyRecord {
    #[sqlx(flatten)]
    pub vacancy: Vacancy,
    pub department_title_en: Option<String>,
    pub department_title_id: Option<String>,
    pub employment_title_en: Option<String>,
    pub employment_title_id: Option<String>,
    pub experience_title_en: Option<String>,
    pub experience_title_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DepartmentVacancyCount {
    pub id: i64,
    pub title_en: String,
    pub vacancy_count: i64,
}

#[cfg(test)]
pub(crate) fn sample_vacancy(posted: NaiveDate, closed: Option<NaiveDate>, active: bool) -> Vacancy {
    Vacancy {
        id: 1,
        title_en: "Senior Backend Engineer".into(),
        title_id: "Insinyur Backend Senior".into(),
        department_id: 1,
        employment_id: None,
        experience_id: 1,
        work_mode: Some("Remote".into()),
        description_en: None,
        description_id: None,
        requirements_en: None,
        requirements_id: None,
        responsibilities_en: None,
        responsibilities_id: None,
        posted_date: posted,
        closed_date: closed,
        urgent: false,
        is_active: active,
        created_by: Some("EMP-1".into()),
        updated_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
