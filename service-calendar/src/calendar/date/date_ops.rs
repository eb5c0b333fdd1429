use chrono::{Datelike, NaiveDate};

/// the calendar day after `date`, or None at the end of the representable range.
pub fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}

/// position of the weekday of `date` in a Monday-first week, so Monday is 0
/// and Sunday is 6 (ISO weekday number minus one).
pub fn weekday_index(date: &NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}
