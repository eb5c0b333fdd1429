use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CalendarError, ServiceKey};

/// calendar_dates.txt `exception_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionType {
    /// service runs on the date even if the weekly pattern says otherwise
    Added,
    /// service does not run on the date even if the weekly pattern says it does
    Removed,
}

impl ExceptionType {
    pub fn code(&self) -> i64 {
        match self {
            ExceptionType::Added => 1,
            ExceptionType::Removed => 2,
        }
    }
}

impl TryFrom<i64> for ExceptionType {
    type Error = CalendarError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ExceptionType::Added),
            2 => Ok(ExceptionType::Removed),
            other => Err(CalendarError::InvalidExceptionType(other)),
        }
    }
}

impl From<gtfs_structures::Exception> for ExceptionType {
    fn from(value: gtfs_structures::Exception) -> Self {
        match value {
            gtfs_structures::Exception::Added => ExceptionType::Added,
            gtfs_structures::Exception::Deleted => ExceptionType::Removed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceException {
    pub service: ServiceKey,
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}

/// the point overrides of a single service, split by type.
///
/// added dates are seeded into the expansion result before the weekly pattern
/// is evaluated and are never retracted, so an added date wins over a removed
/// one for the same day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExceptionSet {
    added: BTreeSet<NaiveDate>,
    removed: BTreeSet<NaiveDate>,
}

impl ExceptionSet {
    /// collects the exceptions that belong to `service`, ignoring the rest.
    pub fn for_service<'a, I>(service: ServiceKey, exceptions: I) -> ExceptionSet
    where
        I: IntoIterator<Item = &'a ServiceException>,
    {
        let mut set = ExceptionSet::default();
        for exception in exceptions.into_iter().filter(|e| e.service == service) {
            set.insert(exception.date, exception.exception_type);
        }
        set
    }

    pub fn insert(&mut self, date: NaiveDate, exception_type: ExceptionType) {
        match exception_type {
            ExceptionType::Added => self.added.insert(date),
            ExceptionType::Removed => self.removed.insert(date),
        };
    }

    pub fn added(&self) -> impl Iterator<Item = &NaiveDate> {
        self.added.iter()
    }

    pub fn is_removed(&self, date: &NaiveDate) -> bool {
        self.removed.contains(date)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
