//! resolution of GTFS service calendars into concrete (service, date) pairs.
//!
//! a [`Service`] describes a weekly pattern over a date interval, an
//! [`ExceptionSet`] adds or removes individual dates, and the
//! [`FeedValidityIndex`] lets a later feed generation claim dates away from an
//! earlier one. [`CalendarExpander`] combines the three for one service and
//! [`RefreshOrchestrator`] rebuilds the [`ResolvedCalendar`] for a whole store.
mod calendar_error;
mod calendar_expander;
pub mod date;
mod feed_info;
mod feed_validity_index;
mod keys;
mod refresh_config;
mod refresh_orchestrator;
mod refresh_summary;
mod resolved_calendar;
mod service;
mod service_error_policy;
mod service_exception;
mod weekday_pattern;

pub use calendar_error::CalendarError;
pub use calendar_expander::CalendarExpander;
pub use feed_info::{FeedInfo, ValidityWindow};
pub use feed_validity_index::FeedValidityIndex;
pub use keys::{FeedKey, ServiceKey};
pub use refresh_config::RefreshConfig;
pub use refresh_orchestrator::{resolve_calendar, RefreshOrchestrator};
pub use refresh_summary::{RefreshSummary, SkippedService};
pub use resolved_calendar::ResolvedCalendar;
pub use service::Service;
pub use service_error_policy::ServiceErrorPolicy;
pub use service_exception::{ExceptionSet, ExceptionType, ServiceException};
pub use weekday_pattern::WeekdayPattern;
