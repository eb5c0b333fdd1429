use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::FeedKey;

/// feed_info.txt of one feed. its date range is the feed's primary validity
/// window: the default bounds of the feed's services, and the range this feed
/// claims from any earlier-starting feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedInfo {
    pub feed: FeedKey,
    pub publisher_name: String,
    pub publisher_url: String,
    pub lang: String,
    pub version: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// absent means the feed is open-ended
    pub end_date: Option<NaiveDate>,
}

impl FeedInfo {
    /// the validity window of this feed, if it has a start date.
    pub fn window(&self) -> Option<ValidityWindow> {
        self.start_date.map(|start_date| ValidityWindow {
            start_date,
            end_date: self.end_date,
        })
    }
}

/// an inclusive date range with an optional end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl ValidityWindow {
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start_date <= *date && self.end_date.is_none_or(|end| *date <= end)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounded_window_contains() {
        let window = ValidityWindow {
            start_date: date(2024, 1, 8),
            end_date: Some(date(2024, 1, 10)),
        };
        assert!(!window.contains(&date(2024, 1, 7)));
        assert!(window.contains(&date(2024, 1, 8)));
        assert!(window.contains(&date(2024, 1, 10)));
        assert!(!window.contains(&date(2024, 1, 11)));
    }

    #[test]
    fn test_open_ended_window_contains_everything_after_start() {
        let window = ValidityWindow {
            start_date: date(2024, 1, 8),
            end_date: None,
        };
        assert!(!window.contains(&date(2024, 1, 7)));
        assert!(window.contains(&date(2030, 6, 1)));
    }
}
