use chrono::{Days, NaiveDate};

/// Half-open date interval `[start, end)`.
///
/// `end` is `None` when the bound would fall past the last representable date,
/// in which case the window runs to the end of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date.checked_add_days(Days::new(1)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.map_or(true, |end| date < end)
    }
}
