use std::collections::HashSet;
use std::path::Path;

use gtfs_structures::{Calendar, CalendarDate, RawGtfs};

use crate::calendar::{FeedKey, WeekdayPattern};
use crate::store::{
    ImportedException, ImportedFeed, ImportedFeedInfo, ImportedService, SqliteStore,
};

use super::CalendarAppError;

/// reads calendar.txt, calendar_dates.txt and feed_info.txt from a GTFS
/// archive (zip file or directory) and stores them as a new feed.
///
/// # Arguments
///
/// * `store` - destination database
/// * `input` - path to the GTFS archive
/// * `feed_name` - name of the new feed. defaults to the archive file stem
///
/// # Returns
///
/// the key of the newly created feed
pub fn import_archive(
    store: &SqliteStore,
    input: &Path,
    feed_name: Option<&str>,
) -> Result<FeedKey, CalendarAppError> {
    let input_str = input.to_str().ok_or_else(|| {
        CalendarAppError::OtherError(format!("non-UTF-8 path: {}", input.display()))
    })?;
    let name = match feed_name {
        Some(n) => n.to_string(),
        None => input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(input_str)
            .to_string(),
    };

    log::info!("reading GTFS archive {input_str}");
    let raw = RawGtfs::new(input_str)?;
    let calendars = raw.calendar.transpose()?.unwrap_or_default();
    let calendar_dates = raw.calendar_dates.transpose()?.unwrap_or_default();
    let feed_infos = raw.feed_info.transpose()?.unwrap_or_default();

    let feed = imported_feed(name, &calendars, &calendar_dates, feed_infos);
    let key = store.insert_feed(&feed)?;
    log::info!(
        "imported '{}' as {key}: {} services, {} calendar_dates",
        feed.name,
        feed.services.len(),
        feed.exceptions.len()
    );
    Ok(key)
}

/// converts parsed GTFS rows into an [`ImportedFeed`]. a service_id that only
/// appears in calendar_dates.txt becomes a service that runs on no weekdays
/// and has no dates of its own.
pub fn imported_feed(
    name: String,
    calendars: &[Calendar],
    calendar_dates: &[CalendarDate],
    feed_infos: Vec<gtfs_structures::FeedInfo>,
) -> ImportedFeed {
    if feed_infos.len() > 1 {
        log::warn!(
            "feed '{name}' has {} feed_info rows, only the first is kept",
            feed_infos.len()
        );
    }
    let feed_info = feed_infos
        .into_iter()
        .next()
        .map(|info| ImportedFeedInfo {
            publisher_name: info.name,
            publisher_url: info.url,
            lang: info.lang,
            version: info.version,
            start_date: info.start_date,
            end_date: info.end_date,
        });
    if feed_info.is_none() {
        log::warn!("feed '{name}' has no feed_info.txt, its services cannot be resolved");
    }

    let mut services: Vec<ImportedService> = calendars
        .iter()
        .map(|c| ImportedService {
            service_id: c.id.clone(),
            pattern: WeekdayPattern::from_flags(
                c.monday,
                c.tuesday,
                c.wednesday,
                c.thursday,
                c.friday,
                c.saturday,
                c.sunday,
            ),
            start_date: Some(c.start_date),
            end_date: Some(c.end_date),
        })
        .collect();

    let mut known: HashSet<String> = services.iter().map(|s| s.service_id.clone()).collect();
    for calendar_date in calendar_dates.iter() {
        if known.insert(calendar_date.service_id.clone()) {
            services.push(ImportedService {
                service_id: calendar_date.service_id.clone(),
                pattern: WeekdayPattern::NEVER,
                start_date: None,
                end_date: None,
            });
        }
    }

    let exceptions = calendar_dates
        .iter()
        .map(|cd| ImportedException {
            service_id: cd.service_id.clone(),
            date: cd.date,
            exception_type: cd.exception_type.into(),
        })
        .collect();

    ImportedFeed {
        name,
        feed_info,
        services,
        exceptions,
    }
}
