use crate::calendar::CalendarError;
use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum CalendarAppError {
    #[error("failure reading refresh configuration {msg}: {source}")]
    ConfigurationError {
        msg: String,
        source: config::ConfigError,
    },
    #[error(transparent)]
    CalendarError(#[from] CalendarError),
    #[error(transparent)]
    StoreError(#[from] StoreError),
    #[error("failure reading GTFS archive: {source}")]
    GtfsError {
        #[from]
        source: gtfs_structures::Error,
    },
    #[error("failure writing output: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure writing CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("failure encoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
    #[error("{0}")]
    OtherError(String),
}
