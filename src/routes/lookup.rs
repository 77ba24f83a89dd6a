use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};

use crate::{
    dto::{
        api_response::ApiResponse,
        lookup_dto::{LookupListQuery, LookupListResponse, LookupPayload, LookupResponse},
    },
    error::{Error, Result},
    middleware::auth::require_actor,
    models::{lookup::LookupKind, user::Actor},
    utils::slug::parse_numeric_id,
    AppState,
};

type QueryResult = std::result::Result<Query<LookupListQuery>, QueryRejection>;
type PayloadResult = std::result::Result<Json<LookupPayload>, JsonRejection>;

fn path_id(kind: LookupKind, raw: &str) -> Result<i64> {
    parse_numeric_id(raw).ok_or_else(|| Error::NotFound(format!("{} not found", kind.label())))
}

#[utoipa::path(
    get,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "departments, employments or experiences")),
    responses(
        (status = 200, description = "Paginated lookup rows", body = LookupListResponse),
        (status = 422, description = "Invalid sort or page")
    )
)]
pub async fn list_lookups(
    kind: LookupKind,
    State(state): State<AppState>,
    query: QueryResult,
) -> Result<ApiResponse<LookupListResponse>> {
    let Query(query) = query?;
    let list = state.lookup_service.list(kind, query).await?;
    Ok(ApiResponse::ok(
        format!("{} retrieved successfully", kind.plural_label()),
        LookupListResponse::from(list),
    ))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/all",
    params(("kind" = String, Path, description = "departments, employments or experiences")),
    responses((status = 200, description = "Every lookup row", body = [LookupResponse]))
)]
pub async fn all_lookups(
    kind: LookupKind,
    State(state): State<AppState>,
    query: QueryResult,
) -> Result<ApiResponse<Vec<LookupResponse>>> {
    let Query(query) = query?;
    let items = state.lookup_service.all(kind, query).await?;
    Ok(ApiResponse::ok(
        format!("{} retrieved successfully", kind.plural_label()),
        items.into_iter().map(LookupResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "departments, employments or experiences"),
        ("id" = i64, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Lookup row", body = LookupResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn show_lookup(
    kind: LookupKind,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<LookupResponse>> {
    let item = state.lookup_service.get(kind, path_id(kind, &id)?).await?;
    Ok(ApiResponse::ok(
        format!("{} retrieved successfully", kind.label()),
        LookupResponse::from(item),
    ))
}

#[utoipa::path(
    post,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "departments, employments or experiences")),
    request_body = LookupPayload,
    responses(
        (status = 201, description = "Lookup row created", body = LookupResponse),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn store_lookup(
    kind: LookupKind,
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: PayloadResult,
) -> Result<ApiResponse<LookupResponse>> {
    let Json(payload) = payload?;
    let item = state.lookup_service.create(kind, payload, &actor).await?;
    Ok(ApiResponse::created(
        format!("{} created successfully", kind.label()),
        LookupResponse::from(item),
    ))
}

#[utoipa::path(
    put,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "departments, employments or experiences"),
        ("id" = i64, Path, description = "Row ID")
    ),
    request_body = LookupPayload,
    responses(
        (status = 200, description = "Lookup row updated", body = LookupResponse),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_lookup(
    kind: LookupKind,
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    payload: PayloadResult,
) -> Result<ApiResponse<LookupResponse>> {
    let id = path_id(kind, &id)?;
    let Json(payload) = payload?;
    let item = state.lookup_service.update(kind, id, payload, &actor).await?;
    Ok(ApiResponse::ok(
        format!("{} updated successfully", kind.label()),
        LookupResponse::from(item),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "departments, employments or experiences"),
        ("id" = i64, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Lookup row deleted"),
        (status = 400, description = "Still referenced by vacancies"),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn destroy_lookup(
    kind: LookupKind,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    state
        .lookup_service
        .delete(kind, path_id(kind, &id)?)
        .await?;
    Ok(ApiResponse::message(format!(
        "{} deleted successfully",
        kind.label()
    )))
}

/// Routes for one lookup table, meant to be nested under `/api/{table}`.
/// Reads are public, writes go through [`require_actor`].
pub fn lookup_router(kind: LookupKind, state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route(
            "/",
            get(move |state: State<AppState>, query: QueryResult| list_lookups(kind, state, query)),
        )
        .route(
            "/all",
            get(move |state: State<AppState>, query: QueryResult| all_lookups(kind, state, query)),
        )
        .route(
            "/:id",
            get(move |state: State<AppState>, id: Path<String>| show_lookup(kind, state, id)),
        );

    let writes = Router::new()
        .route(
            "/",
            post(
                move |state: State<AppState>, actor: Extension<Actor>, payload: PayloadResult| {
                    store_lookup(kind, state, actor, payload)
                },
            ),
        )
        .route(
            "/:id",
            put(
                move |state: State<AppState>,
                      actor: Extension<Actor>,
                      id: Path<String>,
                      payload: PayloadResult| {
                    update_lookup(kind, state, actor, id, payload)
                },
            )
            .delete(move |state: State<AppState>, id: Path<String>| {
                destroy_lookup(kind, state, id)
            }),
        )
        .route_layer(from_fn_with_state(state, require_actor));

    reads.merge(writes)
}
