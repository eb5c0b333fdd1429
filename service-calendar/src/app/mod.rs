mod app_error;
mod calendar_app;
pub mod export_ops;
pub mod import_ops;
mod operation;

pub use app_error::CalendarAppError;
pub use calendar_app::CalendarApp;
pub use operation::CalendarOperation;
