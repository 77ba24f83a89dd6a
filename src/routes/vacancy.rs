use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use crate::{
    dto::{
        api_response::ApiResponse,
        vacancy_dto::{
            ExpiryReport, RelatedVacancyQuery, VacancyFilterQuery, VacancyListQuery,
            VacancyListResponse, VacancyPayload, VacancyResponse, VacancyStatisticsResponse,
        },
    },
    error::{Error, Result},
    models::user::Actor,
    services::expiry_service::report_message,
    utils::slug::parse_numeric_id,
    AppState,
};

fn path_id(raw: &str) -> Result<i64> {
    parse_numeric_id(raw).ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
}

fn into_responses(items: Vec<crate::models::vacancy::VacancyRecord>) -> Vec<VacancyResponse> {
    items.into_iter().map(VacancyResponse::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/vacancies",
    responses(
        (status = 200, description = "Paginated vacancies", body = VacancyListResponse),
        (status = 422, description = "Invalid filter, sort or page")
    )
)]
#[axum::debug_handler]
pub async fn list_vacancies(
    State(state): State<AppState>,
    query: std::result::Result<Query<VacancyListQuery>, QueryRejection>,
) -> Result<ApiResponse<VacancyListResponse>> {
    let Query(query) = query?;
    let list = state.vacancy_service.list(query).await?;
    Ok(ApiResponse::ok(
        "Vacancies retrieved successfully",
        VacancyListResponse::from(list),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/all",
    responses((status = 200, description = "Every vacancy matching the filters", body = [VacancyResponse]))
)]
#[axum::debug_handler]
pub async fn list_all_vacancies(
    State(state): State<AppState>,
    query: std::result::Result<Query<VacancyListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<VacancyResponse>>> {
    let Query(query) = query?;
    let items = state.vacancy_service.list_all(query).await?;
    Ok(ApiResponse::ok(
        "Vacancies retrieved successfully",
        into_responses(items),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/active",
    responses((status = 200, description = "Publicly visible vacancies", body = [VacancyResponse]))
)]
#[axum::debug_handler]
pub async fn list_active_vacancies(
    State(state): State<AppState>,
    query: std::result::Result<Query<VacancyFilterQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<VacancyResponse>>> {
    let Query(query) = query?;
    let items = state.vacancy_service.list_active(query).await?;
    Ok(ApiResponse::ok(
        "Active vacancies retrieved successfully",
        into_responses(items),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/statistics",
    responses(
        (status = 200, description = "Vacancy counters for the HR dashboard", body = VacancyStatisticsResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn vacancy_statistics(
    State(state): State<AppState>,
) -> Result<ApiResponse<VacancyStatisticsResponse>> {
    let stats = state.vacancy_service.statistics().await?;
    Ok(ApiResponse::ok(
        "Vacancy statistics retrieved successfully",
        stats,
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/getVacancyDetail/{identifier}",
    params(("identifier" = String, Path, description = "Numeric id or title slug")),
    responses(
        (status = 200, description = "Vacancy found", body = VacancyResponse),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn vacancy_detail(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<ApiResponse<VacancyResponse>> {
    let record = state.vacancy_service.detail(&identifier).await?;
    Ok(ApiResponse::ok(
        "Vacancy retrieved successfully",
        VacancyResponse::from(record),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/getRelatedVacancies",
    responses(
        (status = 200, description = "Random visible vacancies from one department", body = [VacancyResponse]),
        (status = 422, description = "Department ID is required")
    )
)]
#[axum::debug_handler]
pub async fn related_vacancies(
    State(state): State<AppState>,
    query: std::result::Result<Query<RelatedVacancyQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<VacancyResponse>>> {
    let Query(query) = query?;
    let items = state.vacancy_service.related(query).await?;
    Ok(ApiResponse::ok(
        "Related vacancies retrieved successfully",
        into_responses(items),
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/check-expired",
    responses(
        (status = 200, description = "Expired vacancies inactivated", body = ExpiryReport),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn check_expired(State(state): State<AppState>) -> Result<ApiResponse<ExpiryReport>> {
    let inactivated = state.vacancy_service.check_expired().await?;
    Ok(ApiResponse::ok(
        report_message(inactivated),
        ExpiryReport { inactivated },
    ))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}",
    params(("id" = i64, Path, description = "Vacancy ID")),
    responses(
        (status = 200, description = "Vacancy found", body = VacancyResponse),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vacancy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<VacancyResponse>> {
    let record = state.vacancy_service.get(path_id(&id)?).await?;
    Ok(ApiResponse::ok(
        "Vacancy retrieved successfully",
        VacancyResponse::from(record),
    ))
}

#[utoipa::path(
    post,
    path = "/api/vacancies",
    request_body = VacancyPayload,
    responses(
        (status = 201, description = "Vacancy created", body = VacancyResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_vacancy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: std::result::Result<Json<VacancyPayload>, JsonRejection>,
) -> Result<ApiResponse<VacancyResponse>> {
    let Json(payload) = payload?;
    let record = state.vacancy_service.create(payload, &actor).await?;
    Ok(ApiResponse::created(
        "Vacancy created successfully",
        VacancyResponse::from(record),
    ))
}

#[utoipa::path(
    put,
    path = "/api/vacancies/{id}",
    params(("id" = i64, Path, description = "Vacancy ID")),
    request_body = VacancyPayload,
    responses(
        (status = 200, description = "Vacancy updated", body = VacancyResponse),
        (status = 404, description = "Vacancy not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_vacancy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<VacancyPayload>, JsonRejection>,
) -> Result<ApiResponse<VacancyResponse>> {
    let id = path_id(&id)?;
    let Json(payload) = payload?;
    let record = state.vacancy_service.update(id, payload, &actor).await?;
    Ok(ApiResponse::ok(
        "Vacancy updated successfully",
        VacancyResponse::from(record),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}",
    params(("id" = i64, Path, description = "Vacancy ID")),
    responses(
        (status = 200, description = "Vacancy deleted"),
        (status = 404, description = "Vacancy not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_vacancy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    state.vacancy_service.delete(path_id(&id)?).await?;
    Ok(ApiResponse::message("Vacancy deleted successfully"))
}
