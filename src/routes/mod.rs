pub mod docs;
pub mod health;
pub mod lookup;
pub mod vacancy;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::middleware::auth::require_actor;
use crate::models::lookup::LookupKind;
use crate::AppState;

fn vacancy_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(vacancy::list_vacancies))
        .route("/all", get(vacancy::list_all_vacancies))
        .route("/active", get(vacancy::list_active_vacancies))
        .route(
            "/getVacancyDetail/:identifier",
            get(vacancy::vacancy_detail),
        )
        .route("/getRelatedVacancies", get(vacancy::related_vacancies))
        .route("/:id", get(vacancy::get_vacancy));

    let protected = Router::new()
        .route("/", post(vacancy::create_vacancy))
        .route("/statistics", get(vacancy::vacancy_statistics))
        .route("/check-expired", get(vacancy::check_expired))
        .route(
            "/:id",
            put(vacancy::update_vacancy).delete(vacancy::delete_vacancy),
        )
        .route_layer(from_fn_with_state(state, require_actor));

    public.merge(protected)
}

/// Every HTTP route, state attached. Middleware that applies to the whole
/// app (tracing, CORS) is layered by the caller.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/vacancies", vacancy_router(state.clone()))
        .nest(
            "/departments",
            lookup::lookup_router(LookupKind::Department, state.clone()),
        )
        .nest(
            "/employments",
            lookup::lookup_router(LookupKind::Employment, state.clone()),
        )
        .nest(
            "/experiences",
            lookup::lookup_router(LookupKind::Experience, state.clone()),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .nest("/api", api)
        .with_state(state)
}
