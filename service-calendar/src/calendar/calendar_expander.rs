use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::date::date_ops;
use super::{CalendarError, ExceptionSet, FeedValidityIndex, Service};

/// expands a single service into the exact set of dates it runs on.
pub struct CalendarExpander<'a> {
    index: &'a FeedValidityIndex,
}

impl<'a> CalendarExpander<'a> {
    pub fn new(index: &'a FeedValidityIndex) -> CalendarExpander<'a> {
        CalendarExpander { index }
    }

    /// computes the active dates of `service`.
    ///
    /// # Arguments
    ///
    /// * `service` - the service to expand. missing start/end dates are taken
    ///   from the feed_info of the service's feed
    /// * `exceptions` - the calendar_dates overrides of this service
    ///
    /// # Returns
    ///
    /// every added exception date, plus each date in the resolved interval
    /// whose weekday is active, is not removed by an exception, and is not
    /// claimed by a bounded validity window of a later-starting feed.
    pub fn expand(
        &self,
        service: &Service,
        exceptions: &ExceptionSet,
    ) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        let feed_info =
            self.index
                .feed_info(&service.feed)
                .ok_or_else(|| CalendarError::MissingFeedInfo {
                    service: service.key,
                    service_id: service.service_id.clone(),
                    feed: service.feed,
                })?;
        let start = service.start_date.or(feed_info.start_date).ok_or_else(|| {
            CalendarError::UnresolvedStartDate {
                service: service.key,
                service_id: service.service_id.clone(),
            }
        })?;
        let end = service.end_date.or(feed_info.end_date).ok_or_else(|| {
            CalendarError::UnboundedService {
                service: service.key,
                service_id: service.service_id.clone(),
            }
        })?;

        // added dates go in first and are never taken back out
        let mut dates: BTreeSet<NaiveDate> = exceptions.added().copied().collect();

        let mut current = Some(start);
        while let Some(date) = current.filter(|d| *d <= end) {
            let superseding = feed_info
                .start_date
                .and_then(|own_start| self.index.superseding_window(&own_start, &date));
            if let Some(claimed_until) = superseding.and_then(|w| w.end_date) {
                // the whole claimed span belongs to the later feed
                current = date_ops::next_day(claimed_until);
                continue;
            }
            // an open-ended superseding window does not stop the weekly pattern

            if !exceptions.is_removed(&date) && service.pattern.is_active(&date) {
                dates.insert(date);
            }
            current = date_ops::next_day(date);
        }

        Ok(dates)
    }
}
