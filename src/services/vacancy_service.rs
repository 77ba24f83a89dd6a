use std::sync::Arc;

use chrono::FixedOffset;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::database::pagination::{Pagination, SortOrder};
use crate::database::vacancy_repository::{SortField, VacancyFilter, VacancyRepository, VacancySort};
use crate::dto::vacancy_dto::{
    RelatedVacancyQuery, VacancyFilterQuery, VacancyListQuery, VacancyPayload,
    VacancyStatisticsResponse,
};
use crate::error::{Error, FieldErrors, Result};
use crate::models::lookup::LookupKind;
use crate::models::user::Actor;
use crate::models::vacancy::VacancyRecord;
use crate::services::expiry_service::ExpiryService;
use crate::utils::slug::{parse_numeric_id, slugify};
use crate::utils::time::Clock;

pub const DEFAULT_RELATED_LIMIT: i64 = 2;
pub const MAX_RELATED_LIMIT: i64 = 20;
const LATEST_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct VacancyService {
    repo: VacancyRepository,
    expiry: ExpiryService,
}

pub struct VacancyList {
    pub items: Vec<VacancyRecord>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

fn to_filter(query: &VacancyFilterQuery) -> VacancyFilter {
    VacancyFilter {
        department_id: query.department_id,
        employment_id: query.employment_id,
        experience_id: query.experience_id,
        is_active: query.is_active,
        urgent: query.is_urgent,
    }
}

fn parse_sort(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<VacancySort> {
    let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
        None => SortField::Id,
        Some(raw) => SortField::parse(raw)
            .ok_or_else(|| Error::invalid("sort_by", format!("The sort field {} is not supported.", raw)))?,
    };
    let order = SortOrder::parse(sort_order, SortOrder::Desc)?;
    Ok(VacancySort { field, order })
}

fn related_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_RELATED_LIMIT)
        .clamp(1, MAX_RELATED_LIMIT)
}

impl VacancyService {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        let repo = VacancyRepository::new(pool);
        let expiry = ExpiryService::new(repo.clone(), clock, offset);
        Self { repo, expiry }
    }

    pub fn expiry(&self) -> &ExpiryService {
        &self.expiry
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: VacancyListQuery) -> Result<VacancyList> {
        let sort = parse_sort(query.sort_by.as_deref(), query.sort_order.as_deref())?;
        let page = Pagination::new(query.page, query.per_page);
        self.expiry.sweep_inline().await?;

        let (items, total) = self.repo.list(&to_filter(&query.filter()), sort, page).await?;
        Ok(VacancyList {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self, query: VacancyListQuery) -> Result<Vec<VacancyRecord>> {
        let sort = parse_sort(query.sort_by.as_deref(), query.sort_order.as_deref())?;
        self.expiry.sweep_inline().await?;
        self.repo.list_all(&to_filter(&query.filter()), sort).await
    }

    /// Publicly visible vacancies. `is_active` from the query is ignored since
    /// visibility already requires it.
    #[instrument(skip(self))]
    pub async fn list_active(&self, query: VacancyFilterQuery) -> Result<Vec<VacancyRecord>> {
        let today = self.expiry.sweep_inline().await?;
        let filter = VacancyFilter {
            is_active: None,
            ..to_filter(&query)
        };
        let items = self.repo.list_visible(&filter, today).await?;
        debug_assert!(items.iter().all(|r| r.vacancy.is_visible_on(today)));
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<VacancyRecord> {
        self.expiry.sweep_inline().await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    /// Numeric identifiers are ids, anything else is a title slug.
    #[instrument(skip(self))]
    pub async fn detail(&self, identifier: &str) -> Result<VacancyRecord> {
        self.expiry.sweep_inline().await?;
        let record = match parse_numeric_id(identifier) {
            Some(id) => self.repo.find_by_id(id).await?,
            None => self.repo.find_by_slug(&slugify(identifier)).await?,
        };
        record.ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn related(&self, query: RelatedVacancyQuery) -> Result<Vec<VacancyRecord>> {
        let department_id = query
            .department_id
            .ok_or_else(|| Error::invalid("department_id", "Department ID is required"))?;
        let today = self.expiry.sweep_inline().await?;
        let items = self
            .repo
            .list_related(
                department_id,
                query.current_vacancy_id,
                related_limit(query.limit),
                today,
            )
            .await?;
        debug_assert!(items.iter().all(|r| r.vacancy.is_visible_on(today)));
        Ok(items)
    }

    async fn check_references(&self, payload: &VacancyPayload) -> Result<()> {
        let mut refs = vec![
            (LookupKind::Department, "department_id", payload.department_id),
            (LookupKind::Experience, "experience_id", payload.experience_id),
        ];
        if let Some(id) = payload.employment_id {
            refs.push((LookupKind::Employment, "employment_id", id));
        }

        let mut errors = FieldErrors::new();
        for (kind, field, id) in refs {
            if !self.repo.lookup_exists(kind, id).await? {
                errors.insert(
                    field.to_string(),
                    vec![format!("The selected {} is invalid.", field.replace('_', " "))],
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Invalid(errors))
        }
    }

    #[instrument(skip(self, payload), fields(title = %payload.title_en))]
    pub async fn create(&self, payload: VacancyPayload, actor: &Actor) -> Result<VacancyRecord> {
        payload.check()?;
        self.check_references(&payload).await?;

        let id = self.repo.insert(&payload, actor).await?;
        info!(vacancy_id = id, actor = %actor.employee_id, "Vacancy created");
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Vacancy {} vanished after insert", id)))?;
        self.warn_if_already_expired(&record);
        Ok(record)
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: VacancyPayload, actor: &Actor) -> Result<VacancyRecord> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(Error::NotFound("Vacancy not found".to_string()));
        }
        payload.check()?;
        self.check_references(&payload).await?;

        if !self.repo.update(id, &payload, actor).await? {
            return Err(Error::NotFound("Vacancy not found".to_string()));
        }
        info!(vacancy_id = id, actor = %actor.employee_id, "Vacancy updated");
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))?;
        self.warn_if_already_expired(&record);
        Ok(record)
    }

    fn warn_if_already_expired(&self, record: &VacancyRecord) {
        let today = self.expiry.today_at(self.expiry.now());
        if record.vacancy.is_expired_on(today) {
            warn!(
                vacancy_id = record.vacancy.id,
                closed_date = ?record.vacancy.closed_date,
                "Saved an active vacancy whose close date has passed; the next sweep will inactivate it"
            );
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(Error::NotFound("Vacancy not found".to_string()));
        }
        info!(vacancy_id = id, "Vacancy deleted");
        Ok(())
    }

    /// Manual sweep; returns how many vacancies were inactivated.
    pub async fn check_expired(&self) -> Result<u64> {
        self.expiry.sweep().await
    }

    #[instrument(skip(self))]
    pub async fn statistics(&self) -> Result<VacancyStatisticsResponse> {
        let counts = self.repo.counts().await?;
        let total_departments = self.repo.count_lookup(LookupKind::Department).await?;
        let total_experiences = self.repo.count_lookup(LookupKind::Experience).await?;
        let latest = self.repo.latest(LATEST_LIMIT).await?;
        let by_department = self.repo.active_count_by_department().await?;

        Ok(VacancyStatisticsResponse {
            total_vacancies: counts.total,
            active_vacancies: counts.active,
            urgent_vacancies: counts.urgent,
            total_departments,
            total_experiences,
            latest_vacancies: latest.into_iter().map(Into::into).collect(),
            vacancies_by_department: by_department.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_newest_id() {
        assert_eq!(parse_sort(None, None).unwrap(), VacancySort::default());
        assert_eq!(parse_sort(Some(" "), Some("")).unwrap(), VacancySort::default());
    }

    #[test]
    fn unknown_sort_field_is_a_validation_error() {
        match parse_sort(Some("salary"), None) {
            Err(Error::Invalid(errors)) => assert!(errors.contains_key("sort_by")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn legacy_sort_names_still_work() {
        let sort = parse_sort(Some("v_closed_date"), Some("asc")).unwrap();
        assert_eq!(sort.field, SortField::ClosedDate);
        assert_eq!(sort.order, SortOrder::Asc);
    }

    #[test]
    fn related_limit_is_clamped() {
        assert_eq!(related_limit(None), 2);
        assert_eq!(related_limit(Some(0)), 1);
        assert_eq!(related_limit(Some(500)), 20);
        assert_eq!(related_limit(Some(5)), 5);
    }

    #[test]
    fn filter_query_maps_urgent_flag() {
        let filter = to_filter(&VacancyFilterQuery {
            department_id: Some(4),
            is_urgent: Some(true),
            ..Default::default()
        });
        assert_eq!(filter.department_id, Some(4));
        assert_eq!(filter.urgent, Some(true));
        assert_eq!(filter.is_active, None);
    }
}
