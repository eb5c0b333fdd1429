use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use kdam::{Bar, BarBuilder, BarExt};
use rayon::prelude::*;

use crate::store::{CalendarStore, StoreError};

use super::{
    CalendarError, CalendarExpander, ExceptionSet, FeedInfo, FeedValidityIndex, RefreshConfig,
    RefreshSummary, ResolvedCalendar, Service, ServiceErrorPolicy, ServiceKey, SkippedService,
};

/// rebuilds the resolved calendar of a store from scratch.
///
/// the new calendar is assembled off to the side and handed to the store in a
/// single `replace_resolved_calendar` call, so a refresh that fails part way
/// leaves the previous calendar in place. calls to [`RefreshOrchestrator::refresh`]
/// on the same orchestrator run one at a time.
pub struct RefreshOrchestrator {
    config: RefreshConfig,
    running: Mutex<()>,
}

impl RefreshOrchestrator {
    pub fn new(config: RefreshConfig) -> RefreshOrchestrator {
        RefreshOrchestrator {
            config,
            running: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// reads every service, exception and feed_info from `store`, expands all
    /// services and replaces the stored calendar with the result.
    pub fn refresh<S>(&self, store: &S) -> Result<RefreshSummary, CalendarError>
    where
        S: CalendarStore + ?Sized,
    {
        let _running = self
            .running
            .lock()
            .map_err(|e| StoreError::LockError(format!("waiting for running refresh: {e}")))?;

        let services = store.list_services(None)?;
        let feed_infos = store.list_feed_infos()?;
        let mut exceptions = HashMap::with_capacity(services.len());
        for service in services.iter() {
            let rows = store.list_exceptions(service.key)?;
            if !rows.is_empty() {
                exceptions.insert(service.key, ExceptionSet::for_service(service.key, &rows));
            }
        }
        log::info!(
            "refreshing calendar of {} services across {} feed_info records",
            services.len(),
            feed_infos.len()
        );

        let (calendar, summary) =
            match resolve_calendar(&services, &feed_infos, &exceptions, &self.config) {
                Ok(resolved) => resolved,
                Err(e) => {
                    log::error!("{e}");
                    return Err(e);
                }
            };

        store.replace_resolved_calendar(&calendar)?;
        log::info!(
            "resolved {} dates for {} services ({} skipped)",
            summary.dates,
            summary.expanded,
            summary.skipped
        );
        Ok(summary)
    }
}

/// expands every service against one shared [`FeedValidityIndex`] without
/// touching any store.
///
/// # Arguments
///
/// * `services` - every service to expand
/// * `feed_infos` - every feed_info record, across all feeds
/// * `exceptions` - exception sets by service. services without an entry have
///   no exceptions
/// * `config` - parallelism, progress and service error policy
///
/// # Returns
///
/// the resolved calendar along with a summary of the run, or the first
/// service error when the policy is [`ServiceErrorPolicy::Fail`].
pub fn resolve_calendar(
    services: &[Service],
    feed_infos: &[FeedInfo],
    exceptions: &HashMap<ServiceKey, ExceptionSet>,
    config: &RefreshConfig,
) -> Result<(ResolvedCalendar, RefreshSummary), CalendarError> {
    let index = FeedValidityIndex::new(feed_infos);
    let expander = CalendarExpander::new(&index);
    let no_exceptions = ExceptionSet::default();
    let bar = progress_bar(config, services.len());

    let expand = |service: &Service| -> Result<BTreeSet<NaiveDate>, CalendarError> {
        let result = expander.expand(
            service,
            exceptions.get(&service.key).unwrap_or(&no_exceptions),
        );
        if let Some(bar) = &bar {
            if let Ok(mut bar) = bar.lock() {
                let _ = bar.update(1);
            }
        }
        result
    };
    let results: Vec<Result<BTreeSet<NaiveDate>, CalendarError>> = if config.parallelize {
        services.par_iter().map(expand).collect()
    } else {
        services.iter().map(expand).collect()
    };
    if bar.is_some() {
        eprintln!();
    }

    let mut calendar = ResolvedCalendar::new();
    let mut summary = RefreshSummary {
        services: services.len(),
        ..Default::default()
    };
    let mut errors = vec![];
    for (service, result) in services.iter().zip(results) {
        match result {
            Ok(dates) => {
                log::debug!(
                    "{} ('{}') runs on {} dates",
                    service.key,
                    service.service_id,
                    dates.len()
                );
                summary.expanded += 1;
                calendar.insert_dates(service.key, dates);
            }
            Err(e) => match config.on_service_error {
                ServiceErrorPolicy::Skip => {
                    log::warn!("skipping service: {e}");
                    summary.skipped += 1;
                    summary.failures.push(SkippedService {
                        service: service.key,
                        service_id: service.service_id.clone(),
                        reason: e.to_string(),
                    });
                }
                ServiceErrorPolicy::Fail => errors.push(e),
            },
        }
    }

    let failed = errors.len();
    if let Some(first) = errors.into_iter().next() {
        return Err(CalendarError::RefreshAborted {
            failed,
            source: Box::new(first),
        });
    }

    summary.dates = calendar.len();
    Ok((calendar, summary))
}

fn progress_bar(config: &RefreshConfig, total: usize) -> Option<Arc<Mutex<Bar>>> {
    if !config.progress {
        return None;
    }
    match BarBuilder::default()
        .desc("expanding services")
        .total(total)
        .build()
    {
        Ok(bar) => Some(Arc::new(Mutex::new(bar))),
        Err(e) => {
            log::warn!("progress bar unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calendar::{ExceptionType, FeedKey, ServiceException, WeekdayPattern};
    use crate::store::InMemoryStore;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feed_info(feed: i64, start: NaiveDate, end: Option<NaiveDate>) -> FeedInfo {
        FeedInfo {
            feed: FeedKey(feed),
            publisher_name: format!("publisher {feed}"),
            publisher_url: String::from("https://example.com"),
            lang: String::from("en"),
            version: None,
            start_date: Some(start),
            end_date: end,
        }
    }

    fn service(
        key: i64,
        feed: i64,
        pattern: WeekdayPattern,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Service {
        Service {
            key: ServiceKey(key),
            feed: FeedKey(feed),
            service_id: format!("service-{key}"),
            pattern,
            start_date: start,
            end_date: end,
        }
    }

    /// two generations of the same agency: the second feed takes over
    /// 2024-01-08..=2024-01-10 from the first.
    fn two_feed_store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.add_feed_info(feed_info(1, date(2024, 1, 1), Some(date(2024, 1, 14))));
        store.add_feed_info(feed_info(2, date(2024, 1, 8), Some(date(2024, 1, 10))));
        store.add_service(service(
            1,
            1,
            WeekdayPattern::WEEKDAYS,
            Some(date(2024, 1, 1)),
            Some(date(2024, 1, 14)),
        ));
        store.add_service(service(2, 2, WeekdayPattern::EVERY_DAY, None, None));
        store.add_exception(ServiceException {
            service: ServiceKey(1),
            date: date(2024, 1, 3),
            exception_type: ExceptionType::Removed,
        });
        store.add_exception(ServiceException {
            service: ServiceKey(1),
            date: date(2024, 1, 6),
            exception_type: ExceptionType::Added,
        });
        store
    }

    #[test]
    fn test_refresh_resolves_across_feeds() {
        let store = two_feed_store();
        let orchestrator = RefreshOrchestrator::new(RefreshConfig::default());
        let summary = orchestrator.refresh(&store).unwrap();

        let calendar = store.load_resolved_calendar().unwrap();
        let first: Vec<NaiveDate> = calendar.dates_for_service(&ServiceKey(1)).collect();
        assert_eq!(
            first,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 2),
                date(2024, 1, 4),
                date(2024, 1, 5),
                date(2024, 1, 6),
                date(2024, 1, 11),
                date(2024, 1, 12),
            ]
        );
        let second: Vec<NaiveDate> = calendar.dates_for_service(&ServiceKey(2)).collect();
        assert_eq!(
            second,
            vec![date(2024, 1, 8), date(2024, 1, 9), date(2024, 1, 10)]
        );
        assert_eq!(summary.services, 2);
        assert_eq!(summary.expanded, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.dates, 10);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let store = two_feed_store();
        let orchestrator = RefreshOrchestrator::new(RefreshConfig::default());
        let first_summary = orchestrator.refresh(&store).unwrap();
        let first = store.load_resolved_calendar().unwrap();
        let second_summary = orchestrator.refresh(&store).unwrap();
        let second = store.load_resolved_calendar().unwrap();
        assert_eq!(first, second);
        assert_eq!(first_summary, second_summary);
    }

    #[test]
    fn test_refresh_of_empty_store() {
        let store = InMemoryStore::new();
        let summary = RefreshOrchestrator::new(RefreshConfig::default())
            .refresh(&store)
            .unwrap();
        assert_eq!(summary, RefreshSummary::default());
        assert!(store.load_resolved_calendar().unwrap().is_empty());
    }

    #[test]
    fn test_skip_policy_keeps_other_services() {
        let mut store = two_feed_store();
        // feed 3 has no feed_info
        store.add_service(service(3, 3, WeekdayPattern::EVERY_DAY, None, None));
        // open-ended service in an open-ended feed
        store.add_feed_info(feed_info(4, date(2024, 2, 1), None));
        store.add_service(service(4, 4, WeekdayPattern::EVERY_DAY, None, None));

        let summary = RefreshOrchestrator::new(RefreshConfig::default())
            .refresh(&store)
            .unwrap();
        assert_eq!(summary.services, 4);
        assert_eq!(summary.expanded, 2);
        assert_eq!(summary.skipped, 2);
        let skipped: Vec<ServiceKey> = summary.failures.iter().map(|f| f.service).collect();
        assert_eq!(skipped, vec![ServiceKey(3), ServiceKey(4)]);

        let calendar = store.load_resolved_calendar().unwrap();
        assert_eq!(calendar.len(), 10);
        assert_eq!(calendar.date_range(&ServiceKey(3)), None);
    }

    #[test]
    fn test_fail_policy_leaves_previous_calendar() {
        let mut store = two_feed_store();
        let orchestrator = RefreshOrchestrator::new(RefreshConfig::default());
        orchestrator.refresh(&store).unwrap();
        let before = store.load_resolved_calendar().unwrap();

        store.add_service(service(3, 3, WeekdayPattern::EVERY_DAY, None, None));
        let failing = RefreshOrchestrator::new(RefreshConfig {
            on_service_error: ServiceErrorPolicy::Fail,
            ..Default::default()
        });
        let result = failing.refresh(&store);
        match result {
            Err(CalendarError::RefreshAborted { failed, source }) => {
                assert_eq!(failed, 1);
                assert!(matches!(*source, CalendarError::MissingFeedInfo { .. }));
            }
            other => panic!("expected aborted refresh, found {other:?}"),
        }
        assert_eq!(store.load_resolved_calendar().unwrap(), before);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(42);
        let base = date(2024, 1, 1);
        let mut feed_infos = vec![];
        let mut services = vec![];
        let mut exceptions = HashMap::new();
        for feed in 1..=4 {
            let start = base + chrono::Days::new(rng.random_range(0..60));
            let end = start + chrono::Days::new(rng.random_range(0..90));
            feed_infos.push(feed_info(feed, start, Some(end)));
            for _ in 0..10 {
                let key = services.len() as i64 + 1;
                let flags: [bool; 7] = std::array::from_fn(|_| rng.random_bool(0.5));
                services.push(service(key, feed, WeekdayPattern(flags), None, None));
                let mut set = ExceptionSet::default();
                for _ in 0..rng.random_range(0..4) {
                    let d = start + chrono::Days::new(rng.random_range(0..30));
                    let t = if rng.random_bool(0.5) {
                        ExceptionType::Added
                    } else {
                        ExceptionType::Removed
                    };
                    set.insert(d, t);
                }
                exceptions.insert(ServiceKey(key), set);
            }
        }

        let sequential =
            resolve_calendar(&services, &feed_infos, &exceptions, &RefreshConfig::default())
                .unwrap();
        let parallel_config = RefreshConfig {
            parallelize: true,
            ..Default::default()
        };
        let parallel =
            resolve_calendar(&services, &feed_infos, &exceptions, &parallel_config).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.1.expanded, 40);
    }
}
