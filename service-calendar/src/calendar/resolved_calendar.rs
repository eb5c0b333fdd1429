use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ServiceKey;

/// the materialized (service, date) pairs of a full expansion. a derived
/// cache: every refresh builds a new one and replaces the old one wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCalendar {
    pairs: BTreeSet<(ServiceKey, NaiveDate)>,
}

impl ResolvedCalendar {
    pub fn new() -> ResolvedCalendar {
        ResolvedCalendar::default()
    }

    pub fn insert(&mut self, service: ServiceKey, date: NaiveDate) -> bool {
        self.pairs.insert((service, date))
    }

    pub fn insert_dates<I>(&mut self, service: ServiceKey, dates: I)
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.pairs.extend(dates.into_iter().map(|d| (service, d)));
    }

    pub fn contains(&self, service: &ServiceKey, date: &NaiveDate) -> bool {
        self.pairs.contains(&(*service, *date))
    }

    /// the dates of one service, in ascending order.
    pub fn dates_for_service(&self, service: &ServiceKey) -> impl Iterator<Item = NaiveDate> + '_ {
        let key = *service;
        self.pairs
            .range((key, NaiveDate::MIN)..=(key, NaiveDate::MAX))
            .map(|(_, d)| *d)
    }

    /// first and last date of one service, if it runs at all.
    pub fn date_range(&self, service: &ServiceKey) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.dates_for_service(service);
        let first = dates.next()?;
        let last = dates.last().unwrap_or(first);
        Some((first, last))
    }

    /// every service that runs on `date`.
    pub fn services_active_on(&self, date: &NaiveDate) -> BTreeSet<ServiceKey> {
        self.pairs
            .iter()
            .filter(|(_, d)| d == date)
            .map(|(s, _)| *s)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ServiceKey, NaiveDate)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(ServiceKey, NaiveDate)> for ResolvedCalendar {
    fn from_iter<T: IntoIterator<Item = (ServiceKey, NaiveDate)>>(iter: T) -> Self {
        ResolvedCalendar {
            pairs: iter.into_iter().collect(),
        }
    }
}
