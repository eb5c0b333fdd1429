mod calendar_store;
mod imported_feed;
mod memory_store;
mod sqlite_store;
mod store_error;

pub use calendar_store::CalendarStore;
pub use imported_feed::{ImportedException, ImportedFeed, ImportedFeedInfo, ImportedService};
pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;
pub use store_error::StoreError;
