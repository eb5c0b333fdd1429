use serde::{Deserialize, Serialize};

use super::ServiceKey;

/// counts reported by a finished refresh.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// services read from the store
    pub services: usize,
    /// services that expanded successfully, including those with no dates
    pub expanded: usize,
    pub skipped: usize,
    /// (service, date) pairs written
    pub dates: usize,
    pub failures: Vec<SkippedService>,
}

/// a service left out of the resolved calendar under the skip policy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedService {
    pub service: ServiceKey,
    pub service_id: String,
    pub reason: String,
}
