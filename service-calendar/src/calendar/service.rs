use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{FeedKey, ServiceKey, WeekdayPattern};

/// one recurring schedule definition, as stored (calendar.txt row plus its
/// owning feed). missing dates fall back to the owning feed's
/// [`super::FeedInfo`] validity window during expansion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub key: ServiceKey,
    pub feed: FeedKey,
    /// GTFS `service_id`, unique only within `feed`
    pub service_id: String,
    pub pattern: WeekdayPattern,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
