use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::date::date_ops;

/// weekly recurrence of a service, indexed Monday (0) through Sunday (6).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekdayPattern(pub [bool; 7]);

impl WeekdayPattern {
    pub const WEEKDAYS: WeekdayPattern =
        WeekdayPattern([true, true, true, true, true, false, false]);
    pub const EVERY_DAY: WeekdayPattern = WeekdayPattern([true; 7]);
    pub const NEVER: WeekdayPattern = WeekdayPattern([false; 7]);

    #[allow(clippy::too_many_arguments)]
    pub fn from_flags(
        monday: bool,
        tuesday: bool,
        wednesday: bool,
        thursday: bool,
        friday: bool,
        saturday: bool,
        sunday: bool,
    ) -> WeekdayPattern {
        WeekdayPattern([
            monday, tuesday, wednesday, thursday, friday, saturday, sunday,
        ])
    }

    /// true if the weekday of `date` is enabled in this pattern.
    pub fn is_active(&self, date: &NaiveDate) -> bool {
        self.0[date_ops::weekday_index(date)]
    }
}
