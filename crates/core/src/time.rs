//! Local calendar helpers. Dates are judged in Helsinki time.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Europe::Helsinki;

/// Today's date in Helsinki.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&Helsinki).date_naive()
}

/// 1 January of the year `years_back` years before `today`.
#[must_use]
pub fn start_of_year(today: NaiveDate, years_back: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year() - years_back, 1, 1).unwrap_or(NaiveDate::MIN)
}
