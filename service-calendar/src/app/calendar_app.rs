use super::CalendarOperation;
use clap::Parser;

/// command line tool for importing GTFS calendars into a SQLite database and
/// resolving them into concrete service dates
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CalendarApp {
    #[command(subcommand)]
    pub op: CalendarOperation,
}
