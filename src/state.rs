use crate::client::CarbonApi;
use crate::logger::{ActivityLogger, Navigator, Route};
use crate::models::BackfillPolicy;
use crate::storage::ActivityCache;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub logger: Arc<ActivityLogger>,
    pub api: Arc<dyn CarbonApi>,
    pub cache: Arc<dyn ActivityCache>,
    pub redirect: PendingRedirect,
}

impl AppState {
    pub fn new(api: Arc<dyn CarbonApi>, cache: Arc<dyn ActivityCache>) -> Self {
        let redirect = PendingRedirect::default();
        let logger = ActivityLogger::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            Arc::new(redirect.clone()),
        )
        .with_policy(BackfillPolicy::SingleCategoryDemo);
        Self {
            logger: Arc::new(logger),
            api,
            cache,
            redirect,
        }
    }
}

/// Navigation requested by the logger, consumed by the next page load.
#[derive(Clone, Default)]
pub struct PendingRedirect {
    route: Arc<Mutex<Option<Route>>>,
}

impl PendingRedirect {
    pub fn take(&self) -> Option<Route> {
        self.slot().take()
    }

    /// Drops a navigation nobody followed, so a later page load stays put.
    pub fn clear(&self) {
        if let Some(route) = self.slot().take() {
            debug!(?route, "discarding stale navigation");
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Route>> {
        self.route
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for PendingRedirect {
    fn navigate(&self, route: Route) {
        info!(?route, "navigation requested");
        *self.slot() = Some(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_consumed_once() {
        let redirect = PendingRedirect::default();
        redirect.navigate(Route::Dashboard);
        assert_eq!(redirect.take(), Some(Route::Dashboard));
        assert_eq!(redirect.take(), None);
    }

    #[test]
    fn cleared_navigation_is_not_followed() {
        let redirect = PendingRedirect::default();
        redirect.navigate(Route::Dashboard);
        redirect.clear();
        assert_eq!(redirect.take(), None);
    }
}
