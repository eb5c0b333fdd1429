use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// store identifier of a feed. GTFS has no feed identifier of its own, so this
/// is assigned by the persistence layer when a feed is imported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedKey(pub i64);

/// store identifier of a service row. GTFS `service_id` values are only unique
/// within a feed, so resolved dates are keyed on this instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceKey(pub i64);

impl Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feed {}", self.0)
    }
}

impl Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service {}", self.0)
    }
}
