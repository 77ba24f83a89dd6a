pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    expiry_service::ExpiryService, identity_service::IdentityService,
    lookup_service::LookupService, vacancy_service::VacancyService,
};
use crate::utils::time::Clock;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub vacancy_service: VacancyService,
    pub lookup_service: LookupService,
    pub identity_service: IdentityService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let vacancy_service =
            VacancyService::new(pool.clone(), clock, config.business_utc_offset);
        let lookup_service = LookupService::new(pool.clone());
        let identity_service =
            IdentityService::new(config.auth_api_base_url.clone(), config.auth_timeout_secs)?;

        Ok(Self {
            pool,
            vacancy_service,
            lookup_service,
            identity_service,
        })
    }

    pub fn expiry(&self) -> &ExpiryService {
        self.vacancy_service.expiry()
    }
}
