use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// what a refresh does when a single service cannot be expanded
/// (missing feed_info, unresolvable dates).
#[derive(Serialize, Deserialize, Debug, ValueEnum, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorPolicy {
    /// abort the refresh, leaving the previously resolved calendar in place
    Fail,
    /// log the failure, leave the service without dates, and keep going
    #[default]
    Skip,
}
