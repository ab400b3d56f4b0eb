//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::db::repository::FullRepository;
use crate::services::job_tracker::JobTracker;
use crate::services::statistics::StatisticsOptions;

/// State shared by every handler. Cheap to clone; everything inside is
/// reference-counted or small.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub job_tracker: JobTracker,
    /// Statistics tuning applied to every computation (leniency, clock pin).
    pub statistics: StatisticsOptions,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            repository,
            verifier,
            job_tracker: JobTracker::new(),
            statistics: StatisticsOptions::default(),
        }
    }

    pub fn with_statistics_options(mut self, options: StatisticsOptions) -> Self {
        self.statistics = options;
        self
    }
}
