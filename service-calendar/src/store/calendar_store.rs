use crate::calendar::{FeedInfo, FeedKey, ResolvedCalendar, Service, ServiceException, ServiceKey};

use super::StoreError;

/// the persistence boundary of calendar resolution. a refresh reads services,
/// exceptions and feed_info records through this trait and writes the
/// resolved calendar back in one call.
pub trait CalendarStore {
    /// all services, or only those of one feed.
    fn list_services(&self, feed: Option<FeedKey>) -> Result<Vec<Service>, StoreError>;

    fn list_exceptions(&self, service: ServiceKey) -> Result<Vec<ServiceException>, StoreError>;

    /// every feed_info record in the store, regardless of feed.
    fn list_feed_infos(&self) -> Result<Vec<FeedInfo>, StoreError>;

    /// replaces the stored calendar with `calendar`. implementations must make
    /// the swap atomic: readers see either the old calendar or the new one.
    fn replace_resolved_calendar(&self, calendar: &ResolvedCalendar) -> Result<(), StoreError>;

    fn load_resolved_calendar(&self) -> Result<ResolvedCalendar, StoreError>;
}
