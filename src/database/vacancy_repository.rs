use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::database::pagination::{Pagination, SortOrder};
use crate::dto::vacancy_dto::VacancyPayload;
use crate::error::Result;
use crate::models::lookup::LookupKind;
use crate::models::user::{Actor, SYSTEM_ACTOR};
use crate::models::vacancy::{DepartmentVacancyCount, VacancyRecord};

const SELECT_VACANCY: &str = r#"
    SELECT
        v.id, v.title_en, v.title_id, v.department_id, v.employment_id, v.experience_id,
        v.work_mode, v.description_en, v.description_id, v.requirements_en, v.requirements_id,
        v.responsibilities_en, v.responsibilities_id, v.posted_date, v.closed_date,
        v.urgent, v.is_active, v.created_by, v.updated_by, v.created_at, v.updated_at,
        d.title_en AS department_title_en, d.title_id AS department_title_id,
        em.title_en AS employment_title_en, em.title_id AS employment_title_id,
        ex.title_en AS experience_title_en, ex.title_id AS experience_title_id
    FROM vacancies v
    LEFT JOIN departments d ON d.id = v.department_id
    LEFT JOIN employments em ON em.id = v.employment_id
    LEFT JOIN experiences ex ON ex.id = v.experience_id
"#;

/// Optional equality filters applied to vacancy listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VacancyFilter {
    pub department_id: Option<i64>,
    pub employment_id: Option<i64>,
    pub experience_id: Option<i64>,
    pub is_active: Option<bool>,
    pub urgent: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    TitleEn,
    TitleId,
    PostedDate,
    ClosedDate,
    Urgent,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Accepts plain column names and the legacy `v_`-prefixed ones.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim();
        let name = name.strip_prefix("v_").unwrap_or(name);
        let field = match name {
            "id" => SortField::Id,
            "title_en" => SortField::TitleEn,
            "title_id" => SortField::TitleId,
            "posted_date" => SortField::PostedDate,
            "closed_date" => SortField::ClosedDate,
            "urgent" | "is_urgent" => SortField::Urgent,
            "is_active" => SortField::IsActive,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            _ => return None,
        };
        Some(field)
    }

    const fn column(self) -> &'static str {
        match self {
            SortField::Id => "v.id",
            SortField::TitleEn => "v.title_en",
            SortField::TitleId => "v.title_id",
            SortField::PostedDate => "v.posted_date",
            SortField::ClosedDate => "v.closed_date",
            SortField::Urgent => "v.urgent",
            SortField::IsActive => "v.is_active",
            SortField::CreatedAt => "v.created_at",
            SortField::UpdatedAt => "v.updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacancySort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for VacancySort {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct VacancyCounts {
    pub total: i64,
    pub active: i64,
    pub urgent: i64,
}

/// All SQL touching the `vacancies` table.
#[derive(Clone)]
pub struct VacancyRepository {
    pool: PgPool,
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &VacancyFilter) {
    if let Some(id) = filter.department_id {
        qb.push(" AND v.department_id = ").push_bind(id);
    }
    if let Some(id) = filter.employment_id {
        qb.push(" AND v.employment_id = ").push_bind(id);
    }
    if let Some(id) = filter.experience_id {
        qb.push(" AND v.experience_id = ").push_bind(id);
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND v.is_active = ").push_bind(active);
    }
    if let Some(urgent) = filter.urgent {
        qb.push(" AND v.urgent = ").push_bind(urgent);
    }
}

fn push_visible(qb: &mut QueryBuilder<'_, Postgres>, today: NaiveDate) {
    qb.push(" AND v.is_active AND v.posted_date <= ")
        .push_bind(today)
        .push(" AND (v.closed_date IS NULL OR v.closed_date >= ")
        .push_bind(today)
        .push(")");
}

fn push_sort(qb: &mut QueryBuilder<'_, Postgres>, sort: VacancySort) {
    qb.push(" ORDER BY ")
        .push(sort.field.column())
        .push(" ")
        .push(sort.order.as_sql());
    // Stable pages when the sort column has ties.
    if sort.field != SortField::Id {
        qb.push(", v.id ").push(sort.order.as_sql());
    }
}

impl VacancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &VacancyFilter,
        sort: VacancySort,
        page: Pagination,
    ) -> Result<(Vec<VacancyRecord>, i64)> {
        let mut items_query = QueryBuilder::<Postgres>::new(SELECT_VACANCY);
        items_query.push(" WHERE TRUE");
        push_filter(&mut items_query, filter);
        push_sort(&mut items_query, sort);
        items_query
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = items_query
            .build_query_as::<VacancyRecord>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vacancies v WHERE TRUE");
        push_filter(&mut total_query, filter);
        let total: i64 = total_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self, filter: &VacancyFilter, sort: VacancySort) -> Result<Vec<VacancyRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_VACANCY);
        query.push(" WHERE TRUE");
        push_filter(&mut query, filter);
        push_sort(&mut query, sort);
        let items = query
            .build_query_as::<VacancyRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Publicly visible vacancies, urgent first, then the ones closing soonest.
    #[instrument(skip(self))]
    pub async fn list_visible(&self, filter: &VacancyFilter, today: NaiveDate) -> Result<Vec<VacancyRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_VACANCY);
        query.push(" WHERE TRUE");
        push_visible(&mut query, today);
        push_filter(&mut query, filter);
        query.push(" ORDER BY v.urgent DESC, v.closed_date ASC NULLS LAST, v.id DESC");
        let items = query
            .build_query_as::<VacancyRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Random sample of visible vacancies in one department.
    #[instrument(skip(self))]
    pub async fn list_related(
        &self,
        department_id: i64,
        exclude_id: Option<i64>,
        limit: i64,
        today: NaiveDate,
    ) -> Result<Vec<VacancyRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_VACANCY);
        query.push(" WHERE v.department_id = ").push_bind(department_id);
        push_visible(&mut query, today);
        if let Some(id) = exclude_id {
            query.push(" AND v.id <> ").push_bind(id);
        }
        query.push(" ORDER BY RANDOM() LIMIT ").push_bind(limit);
        let items = query
            .build_query_as::<VacancyRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<VacancyRecord>> {
        let sql = format!("{} WHERE v.id = $1", SELECT_VACANCY);
        let record = sqlx::query_as::<_, VacancyRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    /// First vacancy (lowest id) whose hyphenated, lower-cased title in either
    /// language equals `slug`.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<VacancyRecord>> {
        let sql = format!(
            "{} WHERE LOWER(REPLACE(TRIM(v.title_en), ' ', '-')) = $1 \
             OR LOWER(REPLACE(TRIM(v.title_id), ' ', '-')) = $1 \
             ORDER BY v.id ASC LIMIT 1",
            SELECT_VACANCY
        );
        let record = sqlx::query_as::<_, VacancyRecord>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    pub async fn lookup_exists(&self, kind: LookupKind, id: i64) -> Result<bool> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", kind.table());
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    #[instrument(skip(self, payload))]
    pub async fn insert(&self, payload: &VacancyPayload, actor: &Actor) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO vacancies (
                title_en, title_id, department_id, employment_id, experience_id,
                work_mode, description_en, description_id, requirements_en, requirements_id,
                responsibilities_en, responsibilities_id, posted_date, closed_date,
                urgent, is_active, created_by
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9, $10,
                $11, $12, $13, $14,
                COALESCE($15, FALSE), COALESCE($16, TRUE), $17
            )
            RETURNING id
            "#,
        )
        .bind(&payload.title_en)
        .bind(&payload.title_id)
        .bind(payload.department_id)
        .bind(payload.employment_id)
        .bind(payload.experience_id)
        .bind(&payload.work_mode)
        .bind(&payload.description_en)
        .bind(&payload.description_id)
        .bind(&payload.requirements_en)
        .bind(&payload.requirements_id)
        .bind(&payload.responsibilities_en)
        .bind(&payload.responsibilities_id)
        .bind(payload.posted_date)
        .bind(payload.closed_date)
        .bind(payload.urgent)
        .bind(payload.is_active)
        .bind(&actor.employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Replaces the content fields; omitted flags keep their stored value.
    /// Returns false when no row has `id`.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: &VacancyPayload, actor: &Actor) -> Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE vacancies
            SET
                title_en = $2,
                title_id = $3,
                department_id = $4,
                employment_id = $5,
                experience_id = $6,
                work_mode = $7,
                description_en = $8,
                description_id = $9,
                requirements_en = $10,
                requirements_id = $11,
                responsibilities_en = $12,
                responsibilities_id = $13,
                posted_date = $14,
                closed_date = $15,
                urgent = COALESCE($16, urgent),
                is_active = COALESCE($17, is_active),
                updated_by = $18,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.title_en)
        .bind(&payload.title_id)
        .bind(payload.department_id)
        .bind(payload.employment_id)
        .bind(payload.experience_id)
        .bind(&payload.work_mode)
        .bind(&payload.description_en)
        .bind(&payload.description_id)
        .bind(&payload.requirements_en)
        .bind(&payload.requirements_id)
        .bind(&payload.responsibilities_en)
        .bind(&payload.responsibilities_id)
        .bind(payload.posted_date)
        .bind(payload.closed_date)
        .bind(payload.urgent)
        .bind(payload.is_active)
        .bind(&actor.employee_id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM vacancies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Single bulk statement flipping every active vacancy closed before
    /// `today` to inactive.
    pub async fn deactivate_expired(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE vacancies
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = $3
            WHERE is_active = TRUE
              AND closed_date IS NOT NULL
              AND closed_date < $1
            "#,
        )
        .bind(today)
        .bind(SYSTEM_ACTOR)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    pub async fn counts(&self) -> Result<VacancyCounts> {
        let counts = sqlx::query_as::<_, VacancyCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_active) AS active,
                COUNT(*) FILTER (WHERE is_active AND urgent) AS urgent
            FROM vacancies
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn count_lookup(&self, kind: LookupKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let total: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn latest(&self, limit: i64) -> Result<Vec<VacancyRecord>> {
        let sql = format!(
            "{} ORDER BY v.created_at DESC, v.id DESC LIMIT $1",
            SELECT_VACANCY
        );
        let items = sqlx::query_as::<_, VacancyRecord>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn active_count_by_department(&self) -> Result<Vec<DepartmentVacancyCount>> {
        let rows = sqlx::query_as::<_, DepartmentVacancyCount>(
            r#"
            SELECT d.id, d.title_en, COUNT(v.id) FILTER (WHERE v.is_active) AS vacancy_count
            FROM departments d
            LEFT JOIN vacancies v ON v.department_id = d.id
            GROUP BY d.id, d.title_en
            ORDER BY d.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
