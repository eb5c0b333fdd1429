use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::calendar::{
    ExceptionType, FeedInfo, FeedKey, ResolvedCalendar, Service, ServiceException, ServiceKey,
    WeekdayPattern,
};

use super::{CalendarStore, ImportedFeed, StoreError};

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS feed (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS feed_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    feed_id INTEGER NOT NULL UNIQUE REFERENCES feed(id) ON DELETE CASCADE,
    publisher_name TEXT NOT NULL,
    publisher_url TEXT NOT NULL,
    lang TEXT NOT NULL,
    version TEXT,
    start_date TEXT,
    end_date TEXT
);
CREATE TABLE IF NOT EXISTS service (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    feed_id INTEGER NOT NULL REFERENCES feed(id) ON DELETE CASCADE,
    service_id TEXT NOT NULL,
    monday INTEGER NOT NULL,
    tuesday INTEGER NOT NULL,
    wednesday INTEGER NOT NULL,
    thursday INTEGER NOT NULL,
    friday INTEGER NOT NULL,
    saturday INTEGER NOT NULL,
    sunday INTEGER NOT NULL,
    start_date TEXT,
    end_date TEXT,
    UNIQUE (feed_id, service_id)
);
CREATE TABLE IF NOT EXISTS service_date (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_id INTEGER NOT NULL REFERENCES service(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    exception_type INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_service_date_service_id ON service_date (service_id);
CREATE TABLE IF NOT EXISTS service_dates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_id INTEGER NOT NULL REFERENCES service(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    UNIQUE (service_id, date)
);
CREATE INDEX IF NOT EXISTS idx_service_dates_date ON service_dates (date);
";

/// a [`CalendarStore`] backed by a SQLite database. the resolved calendar
/// lives in the `service_dates` table and is replaced inside a single
/// transaction, so other connections keep reading the previous calendar
/// until the new one is committed.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// opens (or creates) the database at `path` and ensures the schema exists.
    pub fn open(path: &Path) -> Result<SqliteStore, StoreError> {
        let conn = Connection::open(path)?;
        SqliteStore::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<SqliteStore, StoreError> {
        let conn = Connection::open_in_memory()?;
        SqliteStore::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<SqliteStore, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self, action: &str) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(format!("{action}: {e}")))
    }

    /// writes a feed with its feed_info, services and exceptions in one
    /// transaction and returns the key assigned to the feed.
    pub fn insert_feed(&self, feed: &ImportedFeed) -> Result<FeedKey, StoreError> {
        let mut conn = self.lock("importing feed")?;
        let tx = conn.transaction()?;

        tx.execute("INSERT INTO feed (name) VALUES (?1)", params![feed.name])?;
        let feed_key = FeedKey(tx.last_insert_rowid());

        if let Some(info) = &feed.feed_info {
            tx.execute(
                "INSERT INTO feed_info (feed_id, publisher_name, publisher_url, lang, version, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    feed_key.0,
                    info.publisher_name,
                    info.publisher_url,
                    info.lang,
                    info.version,
                    info.start_date,
                    info.end_date
                ],
            )?;
        }

        let mut service_keys: HashMap<&str, i64> = HashMap::with_capacity(feed.services.len());
        {
            let mut insert_service = tx.prepare(
                "INSERT INTO service (feed_id, service_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for service in feed.services.iter() {
                let [mon, tue, wed, thu, fri, sat, sun] = service.pattern.0;
                insert_service.execute(params![
                    feed_key.0,
                    service.service_id,
                    mon,
                    tue,
                    wed,
                    thu,
                    fri,
                    sat,
                    sun,
                    service.start_date,
                    service.end_date
                ])?;
                service_keys.insert(service.service_id.as_str(), tx.last_insert_rowid());
            }

            let mut insert_exception = tx.prepare(
                "INSERT INTO service_date (service_id, date, exception_type) VALUES (?1, ?2, ?3)",
            )?;
            for exception in feed.exceptions.iter() {
                let service_key = service_keys
                    .get(exception.service_id.as_str())
                    .ok_or_else(|| {
                        StoreError::InvalidRecord(format!(
                            "calendar_dates entry on {} refers to unknown service_id '{}'",
                            exception.date, exception.service_id
                        ))
                    })?;
                insert_exception.execute(params![
                    service_key,
                    exception.date,
                    exception.exception_type.code()
                ])?;
            }
        }

        tx.commit()?;
        Ok(feed_key)
    }

    /// finds a service by feed and GTFS `service_id`.
    pub fn find_service(
        &self,
        feed: FeedKey,
        service_id: &str,
    ) -> Result<Option<ServiceKey>, StoreError> {
        let conn = self.lock("finding service")?;
        let key = conn
            .query_row(
                "SELECT id FROM service WHERE feed_id = ?1 AND service_id = ?2",
                params![feed.0, service_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(key.map(ServiceKey))
    }
}

fn service_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Service> {
    Ok(Service {
        key: ServiceKey(row.get(0)?),
        feed: FeedKey(row.get(1)?),
        service_id: row.get(2)?,
        pattern: WeekdayPattern::from_flags(
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
        ),
        start_date: row.get(10)?,
        end_date: row.get(11)?,
    })
}

const SELECT_SERVICES: &str = "SELECT id, feed_id, service_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday, start_date, end_date FROM service";

impl CalendarStore for SqliteStore {
    fn list_services(&self, feed: Option<FeedKey>) -> Result<Vec<Service>, StoreError> {
        let conn = self.lock("listing services")?;
        let services = match feed {
            None => {
                let mut stmt = conn.prepare(&format!("{SELECT_SERVICES} ORDER BY id"))?;
                let rows = stmt.query_map([], service_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            Some(f) => {
                let mut stmt =
                    conn.prepare(&format!("{SELECT_SERVICES} WHERE feed_id = ?1 ORDER BY id"))?;
                let rows = stmt.query_map(params![f.0], service_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(services)
    }

    fn list_exceptions(&self, service: ServiceKey) -> Result<Vec<ServiceException>, StoreError> {
        let conn = self.lock("listing exceptions")?;
        let mut stmt = conn.prepare(
            "SELECT date, exception_type FROM service_date WHERE service_id = ?1 ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![service.0], |row| {
                Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(date, code)| {
                let exception_type = ExceptionType::try_from(code)
                    .map_err(|e| StoreError::InvalidRecord(format!("{service} on {date}: {e}")))?;
                Ok(ServiceException {
                    service,
                    date,
                    exception_type,
                })
            })
            .collect()
    }

    fn list_feed_infos(&self) -> Result<Vec<FeedInfo>, StoreError> {
        let conn = self.lock("listing feed_info")?;
        let mut stmt = conn.prepare(
            "SELECT feed_id, publisher_name, publisher_url, lang, version, start_date, end_date
             FROM feed_info ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FeedInfo {
                feed: FeedKey(row.get(0)?),
                publisher_name: row.get(1)?,
                publisher_url: row.get(2)?,
                lang: row.get(3)?,
                version: row.get(4)?,
                start_date: row.get(5)?,
                end_date: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn replace_resolved_calendar(&self, calendar: &ResolvedCalendar) -> Result<(), StoreError> {
        let mut conn = self.lock("replacing resolved calendar")?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM service_dates", [])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO service_dates (service_id, date) VALUES (?1, ?2)")?;
            for (service, date) in calendar.iter() {
                insert.execute(params![service.0, date])?;
            }
        }
        tx.commit()?;
        log::debug!(
            "replaced {removed} service_dates rows with {} rows",
            calendar.len()
        );
        Ok(())
    }

    fn load_resolved_calendar(&self) -> Result<ResolvedCalendar, StoreError> {
        let conn = self.lock("loading resolved calendar")?;
        let mut stmt = conn.prepare("SELECT service_id, date FROM service_dates")?;
        let rows = stmt.query_map([], |row| {
            Ok((ServiceKey(row.get(0)?), row.get::<_, NaiveDate>(1)?))
        })?;
        Ok(rows.collect::<Result<ResolvedCalendar, _>>()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::{ImportedException, ImportedFeedInfo, ImportedService};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_feed() -> ImportedFeed {
        ImportedFeed {
            name: String::from("sample"),
            feed_info: Some(ImportedFeedInfo {
                publisher_name: String::from("Sample Transit"),
                publisher_url: String::from("https://example.com"),
                lang: String::from("en"),
                version: Some(String::from("2024.1")),
                start_date: Some(date(2024, 1, 1)),
                end_date: None,
            }),
            services: vec![
                ImportedService {
                    service_id: String::from("weekday"),
                    pattern: WeekdayPattern::WEEKDAYS,
                    start_date: Some(date(2024, 1, 1)),
                    end_date: Some(date(2024, 1, 14)),
                },
                ImportedService {
                    service_id: String::from("special"),
                    pattern: WeekdayPattern::NEVER,
                    start_date: None,
                    end_date: None,
                },
            ],
            exceptions: vec![
                ImportedException {
                    service_id: String::from("weekday"),
                    date: date(2024, 1, 3),
                    exception_type: ExceptionType::Removed,
                },
                ImportedException {
                    service_id: String::from("special"),
                    date: date(2024, 1, 6),
                    exception_type: ExceptionType::Added,
                },
            ],
        }
    }

    #[test]
    fn test_insert_and_list_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let feed = store.insert_feed(&sample_feed()).unwrap();

        let feed_infos = store.list_feed_infos().unwrap();
        assert_eq!(feed_infos.len(), 1);
        assert_eq!(feed_infos[0].feed, feed);
        assert_eq!(feed_infos[0].start_date, Some(date(2024, 1, 1)));
        assert_eq!(feed_infos[0].end_date, None);

        let services = store.list_services(Some(feed)).unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].pattern, WeekdayPattern::WEEKDAYS);
        assert_eq!(services[0].end_date, Some(date(2024, 1, 14)));
        assert_eq!(services[1].start_date, None);

        let weekday = store.find_service(feed, "weekday").unwrap().unwrap();
        let exceptions = store.list_exceptions(weekday).unwrap();
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].exception_type, ExceptionType::Removed);
        assert_eq!(store.find_service(feed, "missing").unwrap(), None);
    }

    #[test]
    fn test_unknown_service_in_exceptions_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut feed = sample_feed();
        feed.exceptions.push(ImportedException {
            service_id: String::from("nope"),
            date: date(2024, 1, 2),
            exception_type: ExceptionType::Added,
        });
        let result = store.insert_feed(&feed);
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
        assert!(store.list_services(None).unwrap().is_empty());
        assert!(store.list_feed_infos().unwrap().is_empty());
    }

    #[test]
    fn test_replace_resolved_calendar_discards_previous_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let feed = store.insert_feed(&sample_feed()).unwrap();
        let weekday = store.find_service(feed, "weekday").unwrap().unwrap();
        let special = store.find_service(feed, "special").unwrap().unwrap();

        let first: ResolvedCalendar = [(weekday, date(2024, 1, 1)), (weekday, date(2024, 1, 2))]
            .into_iter()
            .collect();
        store.replace_resolved_calendar(&first).unwrap();
        assert_eq!(store.load_resolved_calendar().unwrap(), first);

        let second: ResolvedCalendar = [(special, date(2024, 1, 6))].into_iter().collect();
        store.replace_resolved_calendar(&second).unwrap();
        assert_eq!(store.load_resolved_calendar().unwrap(), second);
    }
}
