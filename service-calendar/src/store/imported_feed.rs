use chrono::NaiveDate;

use crate::calendar::{ExceptionType, WeekdayPattern};

/// the calendar-relevant records of one imported feed, before the store has
/// assigned keys. services and exceptions refer to each other by GTFS
/// `service_id`.
#[derive(Clone, Debug, Default)]
pub struct ImportedFeed {
    pub name: String,
    pub feed_info: Option<ImportedFeedInfo>,
    pub services: Vec<ImportedService>,
    pub exceptions: Vec<ImportedException>,
}

#[derive(Clone, Debug)]
pub struct ImportedFeedInfo {
    pub publisher_name: String,
    pub publisher_url: String,
    pub lang: String,
    pub version: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct ImportedService {
    pub service_id: String,
    pub pattern: WeekdayPattern,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct ImportedException {
    pub service_id: String,
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}
