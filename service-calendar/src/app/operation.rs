use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{value_parser, Subcommand};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::calendar::date::date_codec::gtfs::GTFS_DATE_FORMAT;
use crate::calendar::{FeedKey, RefreshConfig, RefreshOrchestrator, ServiceErrorPolicy};
use crate::store::{CalendarStore, SqliteStore};

use super::{export_ops, import_ops, CalendarAppError};

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum CalendarOperation {
    /// import calendar.txt, calendar_dates.txt and feed_info.txt of a GTFS archive as a new feed
    Import {
        /// SQLite database, created if missing
        #[arg(long)]
        database: String,
        /// GTFS zip archive or directory
        #[arg(long)]
        input: String,
        /// name of the new feed, defaults to the archive file name
        #[arg(long)]
        feed_name: Option<String>,
    },
    /// rebuild the resolved calendar of every service in the database
    Refresh {
        #[arg(long)]
        database: String,
        /// .toml or .json file with refresh settings
        #[arg(long)]
        configuration_file: Option<String>,
        /// expand services in parallel, overriding the configuration file
        #[arg(long, default_value_t = false)]
        parallelize: bool,
        /// overrides the configured service error policy
        #[arg(long, value_enum)]
        on_service_error: Option<ServiceErrorPolicy>,
    },
    /// print the resolved dates of one service
    Dates {
        #[arg(long)]
        database: String,
        /// feed key assigned at import
        #[arg(long)]
        feed: i64,
        #[arg(long)]
        service_id: String,
    },
    /// print every service that runs on a date
    Active {
        #[arg(long)]
        database: String,
        #[arg(long, value_parser = value_parser!(NaiveDate))]
        date: NaiveDate,
    },
    /// write the resolved calendar to CSV, gzip-compressed if the file ends in .gz
    Export {
        #[arg(long)]
        database: String,
        #[arg(long)]
        output_file: String,
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
}

impl CalendarOperation {
    pub fn run(&self) -> Result<(), CalendarAppError> {
        match self {
            CalendarOperation::Import {
                database,
                input,
                feed_name,
            } => {
                let store = SqliteStore::open(Path::new(database))?;
                let key = import_ops::import_archive(
                    &store,
                    Path::new(input),
                    feed_name.as_deref(),
                )?;
                println!("{}", key.0);
                Ok(())
            }
            CalendarOperation::Refresh {
                database,
                configuration_file,
                parallelize,
                on_service_error,
            } => {
                let mut config = match configuration_file {
                    Some(f) => RefreshConfig::from_file(&PathBuf::from(f)).map_err(|e| {
                        CalendarAppError::ConfigurationError {
                            msg: format!("'{f}'"),
                            source: e,
                        }
                    })?,
                    None => RefreshConfig::default(),
                };
                if *parallelize {
                    config.parallelize = true;
                }
                if let Some(policy) = on_service_error {
                    config.on_service_error = *policy;
                }
                let store = SqliteStore::open(Path::new(database))?;
                let summary = RefreshOrchestrator::new(config).refresh(&store)?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
                Ok(())
            }
            CalendarOperation::Dates {
                database,
                feed,
                service_id,
            } => {
                let store = SqliteStore::open(Path::new(database))?;
                let service = store
                    .find_service(FeedKey(*feed), service_id)?
                    .ok_or_else(|| {
                        CalendarAppError::OtherError(format!(
                            "no service '{service_id}' in feed {feed}"
                        ))
                    })?;
                let calendar = store.load_resolved_calendar()?;
                for date in calendar.dates_for_service(&service) {
                    println!("{}", date.format(GTFS_DATE_FORMAT));
                }
                Ok(())
            }
            CalendarOperation::Active { database, date } => {
                let store = SqliteStore::open(Path::new(database))?;
                let calendar = store.load_resolved_calendar()?;
                let active = calendar.services_active_on(date);
                let services = store.list_services(None)?;
                for service in services
                    .iter()
                    .filter(|s| active.contains(&s.key))
                    .sorted_by_key(|s| (s.feed, s.service_id.clone()))
                {
                    println!("{},{}", service.feed.0, service.service_id);
                }
                Ok(())
            }
            CalendarOperation::Export {
                database,
                output_file,
                overwrite,
            } => {
                let store = SqliteStore::open(Path::new(database))?;
                let calendar = store.load_resolved_calendar()?;
                let services = store.list_services(None)?;
                let rows = export_ops::write_calendar(
                    &calendar,
                    &services,
                    Path::new(output_file),
                    *overwrite,
                )?;
                log::info!("wrote {rows} rows to {output_file}");
                Ok(())
            }
        }
    }
}
