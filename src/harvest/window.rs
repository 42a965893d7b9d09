use chrono::{Days, NaiveDate, NaiveTime};

/// Half-open harvest date window `[start, end)`
///
/// Timestamps are UTC-midnight epoch seconds of the two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Normalizes a user-selected date pair into a valid window
    ///
    /// Equal dates become a one-day window; a reversed pair is swapped and
    /// widened by one day so the later date stays included; an already
    /// ordered pair is kept as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use seine::harvest::DateWindow;
    ///
    /// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
    ///
    /// let same = DateWindow::from_selection(d(2024, 5, 1), d(2024, 5, 1));
    /// assert_eq!(same.start(), d(2024, 5, 1));
    /// assert_eq!(same.end(), d(2024, 5, 2));
    ///
    /// let reversed = DateWindow::from_selection(d(2024, 5, 5), d(2024, 5, 1));
    /// assert_eq!(reversed.start(), d(2024, 5, 1));
    /// assert_eq!(reversed.end(), d(2024, 5, 6));
    /// ```
    pub fn from_selection(first: NaiveDate, second: NaiveDate) -> Self {
        if first == second {
            Self {
                start: first,
                end: first.checked_add_days(Days::new(1)).unwrap_or(first),
            }
        } else if first > second {
            Self {
                start: second,
                end: first.checked_add_days(Days::new(1)).unwrap_or(first),
            }
        } else {
            Self {
                start: first,
                end: second,
            }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end date
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Window start as UTC-midnight epoch seconds
    pub fn start_ts(&self) -> i64 {
        self.start.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// Window end as UTC-midnight epoch seconds (exclusive)
    pub fn end_ts(&self) -> i64 {
        self.end.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// Whether a post timestamp falls inside the window
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start_ts() <= timestamp && timestamp < self.end_ts()
    }
}
