use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::database::pagination::{Pagination, SortOrder};
use crate::dto::lookup_dto::{LookupListQuery, LookupPayload};
use crate::error::{Error, Result};
use crate::models::lookup::{LookupItem, LookupKind};
use crate::models::user::Actor;

const LOOKUP_COLUMNS: &str =
    "id, title_en, title_id, is_active, created_by, updated_by, created_at, updated_at";

/// Postgres `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct LookupService {
    pool: PgPool,
}

pub struct LookupList {
    pub items: Vec<LookupItem>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Maps a requested sort column onto a real one. Legacy per-table prefixes
/// (`d_`, `em_`, `ex_`) are tolerated.
fn sort_column(raw: Option<&str>) -> Result<&'static str> {
    let Some(name) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok("id");
    };
    let bare = ["d_", "em_", "ex_"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name);
    match bare {
        "id" => Ok("id"),
        "title_en" => Ok("title_en"),
        "title_id" => Ok("title_id"),
        "is_active" => Ok("is_active"),
        "created_at" => Ok("created_at"),
        "updated_at" => Ok("updated_at"),
        _ => Err(Error::invalid(
            "sort_by",
            format!("The sort field {} is not supported.", name),
        )),
    }
}

/// Makes `%`, `_` and `\` match literally inside an ILIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_lookup_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &LookupListQuery) {
    if let Some(active) = query.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (title_en ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR title_id ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn not_found(kind: LookupKind) -> Error {
    Error::NotFound(format!("{} not found", kind.label()))
}

fn in_use(kind: LookupKind) -> Error {
    Error::BadRequest(format!(
        "Cannot delete {} with associated vacancies. Remove the vacancies first.",
        kind.label().to_lowercase()
    ))
}

impl LookupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, kind: LookupKind, query: LookupListQuery) -> Result<LookupList> {
        let column = sort_column(query.sort_by.as_deref())?;
        let order = SortOrder::parse(query.sort_order.as_deref(), SortOrder::Asc)?;
        let page = Pagination::new(query.page, query.per_page);

        let mut items_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            LOOKUP_COLUMNS,
            kind.table()
        ));
        push_lookup_filter(&mut items_query, &query);
        items_query
            .push(format!(" ORDER BY {} {}", column, order.as_sql()))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = items_query
            .build_query_as::<LookupItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} WHERE TRUE", kind.table()));
        push_lookup_filter(&mut total_query, &query);
        let total: i64 = total_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(LookupList {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn all(&self, kind: LookupKind, query: LookupListQuery) -> Result<Vec<LookupItem>> {
        let column = sort_column(query.sort_by.as_deref())?;
        let order = SortOrder::parse(query.sort_order.as_deref(), SortOrder::Asc)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            LOOKUP_COLUMNS,
            kind.table()
        ));
        push_lookup_filter(&mut qb, &query);
        qb.push(format!(" ORDER BY {} {}", column, order.as_sql()));
        let items = qb.build_query_as::<LookupItem>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn get(&self, kind: LookupKind, id: i64) -> Result<LookupItem> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", LOOKUP_COLUMNS, kind.table());
        sqlx::query_as::<_, LookupItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(kind))
    }

    #[instrument(skip(self, payload))]
    pub async fn create(&self, kind: LookupKind, payload: LookupPayload, actor: &Actor) -> Result<LookupItem> {
        payload.validate()?;
        let sql = format!(
            "INSERT INTO {} (title_en, title_id, is_active, created_by) \
             VALUES ($1, $2, COALESCE($3, TRUE), $4) RETURNING {}",
            kind.table(),
            LOOKUP_COLUMNS
        );
        let item = sqlx::query_as::<_, LookupItem>(&sql)
            .bind(&payload.title_en)
            .bind(&payload.title_id)
            .bind(payload.is_active)
            .bind(&actor.employee_id)
            .fetch_one(&self.pool)
            .await?;
        info!(kind = kind.label(), id = item.id, "Lookup row created");
        Ok(item)
    }

    #[instrument(skip(self, payload))]
    pub async fn update(
        &self,
        kind: LookupKind,
        id: i64,
        payload: LookupPayload,
        actor: &Actor,
    ) -> Result<LookupItem> {
        payload.validate()?;
        let sql = format!(
            "UPDATE {} SET title_en = $2, title_id = $3, is_active = COALESCE($4, is_active), \
             updated_by = $5, updated_at = NOW() WHERE id = $1 RETURNING {}",
            kind.table(),
            LOOKUP_COLUMNS
        );
        sqlx::query_as::<_, LookupItem>(&sql)
            .bind(id)
            .bind(&payload.title_en)
            .bind(&payload.title_id)
            .bind(payload.is_active)
            .bind(&actor.employee_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(kind))
    }

    /// Refuses to delete a row any vacancy still points at.
    #[instrument(skip(self))]
    pub async fn delete(&self, kind: LookupKind, id: i64) -> Result<()> {
        self.get(kind, id).await?;

        let sql = format!(
            "SELECT COUNT(*) FROM vacancies WHERE {} = $1",
            kind.vacancy_column()
        );
        let referenced: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if referenced > 0 {
            return Err(in_use(kind));
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let res = match sqlx::query(&sql).bind(id).execute(&self.pool).await {
            Ok(res) => res,
            // A vacancy was attached between the count and the delete.
            Err(sqlx::Error::Database(db))
                if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
            {
                warn!(kind = kind.label(), id, "Delete blocked by foreign key");
                return Err(in_use(kind));
            }
            Err(e) => return Err(e.into()),
        };
        if res.rows_affected() == 0 {
            return Err(not_found(kind));
        }
        info!(kind = kind.label(), id, "Lookup row deleted");
        Ok(())
    }
}
