use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::dto::{
    lookup_dto::{LookupListResponse, LookupPayload, LookupResponse},
    vacancy_dto::{
        DepartmentCountResponse, ExpiryReport, LatestVacancy, LookupRef, VacancyListResponse,
        VacancyPayload, VacancyResponse, VacancyStatisticsResponse,
    },
};
use crate::routes::{health, lookup, vacancy};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        vacancy::list_vacancies,
        vacancy::list_all_vacancies,
        vacancy::list_active_vacancies,
        vacancy::vacancy_statistics,
        vacancy::vacancy_detail,
        vacancy::related_vacancies,
        vacancy::check_expired,
        vacancy::get_vacancy,
        vacancy::create_vacancy,
        vacancy::update_vacancy,
        vacancy::delete_vacancy,
        lookup::list_lookups,
        lookup::all_lookups,
        lookup::show_lookup,
        lookup::store_lookup,
        lookup::update_lookup,
        lookup::destroy_lookup,
    ),
    components(schemas(
        VacancyPayload,
        VacancyResponse,
        VacancyListResponse,
        LookupRef,
        ExpiryReport,
        LatestVacancy,
        DepartmentCountResponse,
        VacancyStatisticsResponse,
        LookupPayload,
        LookupResponse,
        LookupListResponse,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
