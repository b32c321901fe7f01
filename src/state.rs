use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Repository;
use crate::middleware::RateLimiter;
use crate::services::{CaseService, DispatchNotifier, Notifier, NotifyError, ProfileService};

/// Shared handles injected into every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Arc<dyn Repository>,
    pub notifier: Arc<dyn Notifier>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire the default notifier (store + optional webhook) from config
    pub fn new(config: AppConfig, repo: Arc<dyn Repository>) -> Result<Self, NotifyError> {
        let notifier = DispatchNotifier::new(repo.clone(), &config.notify)?;
        Ok(Self {
            config: Arc::new(config),
            repo,
            notifier: Arc::new(notifier),
            limiter: Arc::new(RateLimiter::new()),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn cases(&self) -> CaseService {
        CaseService::new(self.repo.clone(), self.notifier.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.repo.clone())
    }
}
