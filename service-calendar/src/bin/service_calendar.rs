//! imports GTFS calendars into a SQLite database and resolves them, across
//! feed generations, into the concrete dates each service runs on.
use clap::Parser;
use service_calendar::app::CalendarApp;

fn main() {
    env_logger::init();
    let args = CalendarApp::parse();
    if let Err(e) = args.op.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
