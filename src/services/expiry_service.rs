use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{info, instrument};

use crate::database::vacancy_repository::VacancyRepository;
use crate::error::Result;
use crate::utils::time::{business_date, Clock};

/// Flips active vacancies whose close date has passed to inactive.
#[derive(Clone)]
pub struct ExpiryService {
    repo: VacancyRepository,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl ExpiryService {
    pub fn new(repo: VacancyRepository, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            repo,
            clock,
            offset,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        business_date(now, self.offset)
    }

    /// One bulk update against everything closed before the day `now` falls on.
    /// Running it again with the same `now` changes nothing.
    #[instrument(skip(self))]
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let today = self.today_at(now);
        let inactivated = self.repo.deactivate_expired(today, now).await?;
        if inactivated > 0 {
            info!(inactivated, %today, "Inactivated expired vacancies");
        }
        Ok(inactivated)
    }

    /// Manual sweep; the count is reported back to the caller.
    pub async fn sweep(&self) -> Result<u64> {
        self.sweep_at(self.now()).await
    }

    /// Sweep run ahead of a read. The count is dropped; the business day the
    /// sweep ran against is returned so the read uses the same "today".
    pub async fn sweep_inline(&self) -> Result<NaiveDate> {
        let now = self.now();
        self.sweep_at(now).await?;
        Ok(self.today_at(now))
    }
}

pub fn report_message(inactivated: u64) -> String {
    format!("Successfully inactivated {} expired vacancies.", inactivated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_message_matches_wire_text() {
        assert_eq!(report_message(0), "Successfully inactivated 0 expired vacancies.");
        assert_eq!(report_message(3), "Successfully inactivated 3 expired vacancies.");
    }
}
