use std::sync::{Arc, RwLock};

use crate::calendar::{FeedInfo, FeedKey, ResolvedCalendar, Service, ServiceException, ServiceKey};

use super::{CalendarStore, StoreError};

/// a [`CalendarStore`] held entirely in memory. the resolved calendar is
/// published as an immutable snapshot and swapped on replace, so readers
/// holding a snapshot are never affected by a running refresh.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    feed_infos: Vec<FeedInfo>,
    services: Vec<Service>,
    exceptions: Vec<ServiceException>,
    resolved: RwLock<Arc<ResolvedCalendar>>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    pub fn add_feed_info(&mut self, feed_info: FeedInfo) {
        self.feed_infos.push(feed_info);
    }

    pub fn add_service(&mut self, service: Service) {
        self.services.push(service);
    }

    pub fn add_exception(&mut self, exception: ServiceException) {
        self.exceptions.push(exception);
    }

    /// the currently published calendar.
    pub fn snapshot(&self) -> Result<Arc<ResolvedCalendar>, StoreError> {
        let guard = self
            .resolved
            .read()
            .map_err(|e| StoreError::LockError(format!("reading resolved calendar: {e}")))?;
        Ok(guard.clone())
    }
}

impl CalendarStore for InMemoryStore {
    fn list_services(&self, feed: Option<FeedKey>) -> Result<Vec<Service>, StoreError> {
        Ok(self
            .services
            .iter()
            .filter(|s| feed.is_none_or(|f| s.feed == f))
            .cloned()
            .collect())
    }

    fn list_exceptions(&self, service: ServiceKey) -> Result<Vec<ServiceException>, StoreError> {
        Ok(self
            .exceptions
            .iter()
            .filter(|e| e.service == service)
            .cloned()
            .collect())
    }

    fn list_feed_infos(&self) -> Result<Vec<FeedInfo>, StoreError> {
        Ok(self.feed_infos.clone())
    }

    fn replace_resolved_calendar(&self, calendar: &ResolvedCalendar) -> Result<(), StoreError> {
        let next = Arc::new(calendar.clone());
        let mut guard = self
            .resolved
            .write()
            .map_err(|e| StoreError::LockError(format!("replacing resolved calendar: {e}")))?;
        *guard = next;
        Ok(())
    }

    fn load_resolved_calendar(&self) -> Result<ResolvedCalendar, StoreError> {
        self.snapshot().map(|c| c.as_ref().clone())
    }
}
