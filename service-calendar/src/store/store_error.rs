#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sqlite failure: {source}")]
    SqliteError {
        #[from]
        source: rusqlite::Error,
    },
    #[error("store lock poisoned while {0}")]
    LockError(String),
    #[error("invalid record in store: {0}")]
    InvalidRecord(String),
}
