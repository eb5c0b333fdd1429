use std::collections::HashMap;

use chrono::NaiveDate;

use super::{FeedInfo, FeedKey, ValidityWindow};

/// every feed_info validity window in the store, sorted by start date, plus
/// a lookup of each feed's own feed_info. built once per refresh so that
/// per-day supersession checks never go back to the store.
#[derive(Debug, Default)]
pub struct FeedValidityIndex {
    windows: Vec<ValidityWindow>,
    feed_infos: HashMap<FeedKey, FeedInfo>,
}

impl FeedValidityIndex {
    pub fn new(feed_infos: &[FeedInfo]) -> FeedValidityIndex {
        let mut windows: Vec<ValidityWindow> =
            feed_infos.iter().filter_map(FeedInfo::window).collect();
        windows.sort();

        let mut by_feed = HashMap::with_capacity(feed_infos.len());
        for feed_info in feed_infos {
            if by_feed.contains_key(&feed_info.feed) {
                log::warn!(
                    "{} has more than one feed_info entry, using the first",
                    feed_info.feed
                );
                continue;
            }
            by_feed.insert(feed_info.feed, feed_info.clone());
        }

        FeedValidityIndex {
            windows,
            feed_infos: by_feed,
        }
    }

    pub fn feed_info(&self, feed: &FeedKey) -> Option<&FeedInfo> {
        self.feed_infos.get(feed)
    }

    /// finds the window, among all feeds, that claims `date` away from a feed
    /// whose own window starts at `own_start`.
    ///
    /// candidates start strictly after `own_start`, on or before `date`, and
    /// either end on or after `date` or are open-ended. of those, the one with
    /// the earliest start is returned.
    pub fn superseding_window(
        &self,
        own_start: &NaiveDate,
        date: &NaiveDate,
    ) -> Option<ValidityWindow> {
        let first_later = self.windows.partition_point(|w| w.start_date <= *own_start);
        self.windows[first_later..]
            .iter()
            .take_while(|w| w.start_date <= *date)
            .find(|w| w.contains(date))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feed_info(feed: i64, start: Option<NaiveDate>, end: Option<NaiveDate>) -> FeedInfo {
        FeedInfo {
            feed: FeedKey(feed),
            publisher_name: format!("publisher {feed}"),
            publisher_url: String::from("https://example.com"),
            lang: String::from("en"),
            version: None,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_no_later_window() {
        let index = FeedValidityIndex::new(&[feed_info(
            1,
            Some(date(2024, 1, 1)),
            Some(date(2024, 1, 31)),
        )]);
        assert_eq!(
            index.superseding_window(&date(2024, 1, 1), &date(2024, 1, 15)),
            None
        );
        assert!(index.feed_info(&FeedKey(1)).is_some());
        assert!(index.feed_info(&FeedKey(2)).is_none());
    }

    #[test]
    fn test_later_window_supersedes_only_inside_its_range() {
        let index = FeedValidityIndex::new(&[
            feed_info(1, Some(date(2024, 1, 1)), Some(date(2024, 1, 31))),
            feed_info(2, Some(date(2024, 1, 8)), Some(date(2024, 1, 10))),
        ]);
        let own_start = date(2024, 1, 1);
        assert_eq!(index.superseding_window(&own_start, &date(2024, 1, 7)), None);
        assert_eq!(
            index.superseding_window(&own_start, &date(2024, 1, 9)),
            Some(ValidityWindow {
                start_date: date(2024, 1, 8),
                end_date: Some(date(2024, 1, 10)),
            })
        );
        assert_eq!(index.superseding_window(&own_start, &date(2024, 1, 11)), None);
    }

    #[test]
    fn test_window_starting_on_or_before_own_start_is_ignored() {
        let index = FeedValidityIndex::new(&[
            feed_info(1, Some(date(2024, 1, 8)), Some(date(2024, 1, 31))),
            feed_info(2, Some(date(2024, 1, 1)), Some(date(2024, 1, 20))),
            feed_info(3, Some(date(2024, 1, 8)), Some(date(2024, 1, 12))),
        ]);
        // windows starting on the same day as the feed's own window are not later
        assert_eq!(
            index.superseding_window(&date(2024, 1, 8), &date(2024, 1, 10)),
            None
        );
        assert_eq!(
            index
                .superseding_window(&date(2024, 1, 1), &date(2024, 1, 10))
                .map(|w| w.start_date),
            Some(date(2024, 1, 8))
        );
    }

    #[test]
    fn test_earliest_starting_window_wins() {
        let index = FeedValidityIndex::new(&[
            feed_info(1, Some(date(2024, 1, 1)), None),
            feed_info(2, Some(date(2024, 1, 10)), Some(date(2024, 1, 20))),
            feed_info(3, Some(date(2024, 1, 5)), Some(date(2024, 1, 15))),
        ]);
        let found = index.superseding_window(&date(2024, 1, 1), &date(2024, 1, 12));
        assert_eq!(
            found,
            Some(ValidityWindow {
                start_date: date(2024, 1, 5),
                end_date: Some(date(2024, 1, 15)),
            })
        );
    }

    #[test]
    fn test_earlier_window_ended_falls_through_to_later_one() {
        let index = FeedValidityIndex::new(&[
            feed_info(1, Some(date(2024, 1, 1)), None),
            feed_info(2, Some(date(2024, 1, 5)), Some(date(2024, 1, 6))),
            feed_info(3, Some(date(2024, 1, 10)), Some(date(2024, 1, 20))),
        ]);
        let found = index.superseding_window(&date(2024, 1, 1), &date(2024, 1, 12));
        assert_eq!(found.map(|w| w.start_date), Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_open_ended_candidate_and_missing_start() {
        let index = FeedValidityIndex::new(&[
            feed_info(1, Some(date(2024, 1, 1)), Some(date(2024, 12, 31))),
            feed_info(2, Some(date(2024, 6, 1)), None),
            feed_info(3, None, Some(date(2024, 3, 1))),
        ]);
        assert_eq!(index.len(), 2);
        let found = index.superseding_window(&date(2024, 1, 1), &date(2024, 9, 1));
        assert_eq!(
            found,
            Some(ValidityWindow {
                start_date: date(2024, 6, 1),
                end_date: None,
            })
        );
        assert_eq!(index.superseding_window(&date(2024, 1, 1), &date(2024, 2, 1)), None);
    }
}
