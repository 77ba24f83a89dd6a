use chrono::FixedOffset;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::error::Result;
use crate::services::expiry_service::{report_message, ExpiryService};

/// Registers the daily expiry sweep and starts the scheduler.
pub async fn start_expiry_scheduler(
    expiry: ExpiryService,
    cron: &str,
    offset: FixedOffset,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async_tz(cron, offset, move |_uuid, _lock| {
        let expiry = expiry.clone();
        Box::pin(async move {
            match expiry.sweep().await {
                Ok(count) => info!(count, "{}", report_message(count)),
                Err(e) => error!(error = ?e, "Scheduled expiry sweep failed"),
            }
        })
    })?;
    scheduler.add(job).await?;
    scheduler.start().await?;

    info!(cron, offset = %offset, "Expiry sweep scheduled");
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use sqlx::postgres::PgPoolOptions;

    use crate::config::{parse_utc_offset, DEFAULT_EXPIRY_SWEEP_CRON};
    use crate::database::vacancy_repository::VacancyRepository;
    use crate::utils::time::FixedClock;

    fn expiry(offset: FixedOffset) -> ExpiryService {
        // Never connects: the daily job does not fire during the test.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/careers_unused")
            .unwrap();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        ExpiryService::new(VacancyRepository::new(pool), Arc::new(clock), offset)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn default_daily_job_registers() {
        let offset = parse_utc_offset("+07:00").unwrap();
        let mut scheduler = start_expiry_scheduler(expiry(offset), DEFAULT_EXPIRY_SWEEP_CRON, offset)
            .await
            .unwrap();
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_cron_is_an_error() {
        let offset = parse_utc_offset("+07:00").unwrap();
        assert!(start_expiry_scheduler(expiry(offset), "every midnight", offset)
            .await
            .is_err());
    }
}
