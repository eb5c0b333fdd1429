pub mod app;
pub mod calendar;
pub mod store;
