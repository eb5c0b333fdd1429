use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use flate2::{write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};

use crate::calendar::date::date_codec;
use crate::calendar::{ResolvedCalendar, Service, ServiceKey};

use super::CalendarAppError;

/// one row of an exported calendar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub feed_id: i64,
    pub service_id: String,
    #[serde(
        serialize_with = "date_codec::gtfs::serialize_naive_date",
        deserialize_with = "date_codec::gtfs::deserialize_naive_date"
    )]
    pub date: NaiveDate,
}

/// writes `calendar` as CSV with one row per (service, date), ordered by
/// service and date. output ending in `.gz` is gzip-compressed.
///
/// # Returns
///
/// the number of rows written
pub fn write_calendar(
    calendar: &ResolvedCalendar,
    services: &[Service],
    output_file: &Path,
    overwrite: bool,
) -> Result<usize, CalendarAppError> {
    let mut writer = create_writer(output_file, overwrite)?;
    let lookup: HashMap<ServiceKey, &Service> = services.iter().map(|s| (s.key, s)).collect();

    let mut rows = 0;
    for (service_key, date) in calendar.iter() {
        let service = lookup.get(service_key).ok_or_else(|| {
            CalendarAppError::OtherError(format!(
                "resolved calendar refers to unknown {service_key}"
            ))
        })?;
        writer.serialize(ExportRow {
            feed_id: service.feed.0,
            service_id: service.service_id.clone(),
            date: *date,
        })?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

fn create_writer(
    output_file: &Path,
    overwrite: bool,
) -> Result<csv::Writer<Box<dyn Write>>, CalendarAppError> {
    if output_file.exists() && !overwrite {
        return Err(CalendarAppError::OtherError(format!(
            "{} already exists, use --overwrite to replace it",
            output_file.display()
        )));
    }
    let file = File::create(output_file)?;
    let inner: Box<dyn Write> = match output_file.extension().and_then(|e| e.to_str()) {
        Some("gz") => Box::new(GzEncoder::new(file, Compression::default())),
        _ => Box::new(file),
    };
    Ok(csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(inner))
}
