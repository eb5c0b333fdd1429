use crate::store::StoreError;

use super::{FeedKey, ServiceKey};

#[derive(thiserror::Error, Debug)]
pub enum CalendarError {
    #[error("{service} ('{service_id}') belongs to {feed}, which has no feed_info entry")]
    MissingFeedInfo {
        service: ServiceKey,
        service_id: String,
        feed: FeedKey,
    },
    #[error("{service} ('{service_id}') has no start date and its feed_info has no start date")]
    UnresolvedStartDate {
        service: ServiceKey,
        service_id: String,
    },
    #[error("{service} ('{service_id}') is unbounded: no end date on the service or its feed_info")]
    UnboundedService {
        service: ServiceKey,
        service_id: String,
    },
    #[error("unknown calendar_dates exception_type {0}, expected 1 (added) or 2 (removed)")]
    InvalidExceptionType(i64),
    #[error("refresh aborted, {failed} service(s) could not be expanded: {source}")]
    RefreshAborted {
        failed: usize,
        source: Box<CalendarError>,
    },
    #[error(transparent)]
    StoreError(#[from] StoreError),
}
