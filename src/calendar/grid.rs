use std::collections::BTreeMap;
use std::iter::successors;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, Duration, Month, Weekday};

/// Number of day cells in a month grid: six weeks of seven days, enough to
/// cover any month whatever weekday it starts on
pub(crate) const GRID_DAYS: usize = 42;

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// Sparse mapping from `YYYY-MM-DD` keys to the number of unfinished to-dos
/// on that day
pub(crate) type RemainingByDate = BTreeMap<String, u32>;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Column (0-6) of `wd` in a week beginning on `self`
    pub(crate) fn column(self, wd: Weekday) -> u8 {
        match self {
            WeekStart::Monday => wd.number_days_from_monday(),
            WeekStart::Sunday => wd.number_days_from_sunday(),
        }
    }
}

impl FromStr for WeekStart {
    type Err = ParseWeekStartError;

    fn from_str(s: &str) -> Result<WeekStart, ParseWeekStartError> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(WeekStart::Monday),
            "sun" | "sunday" => Ok(WeekStart::Sunday),
            _ => Err(ParseWeekStartError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid week start {0:?}; expected \"monday\" or \"sunday\"")]
pub(crate) struct ParseWeekStartError(String);

/// Renders `date` as the zero-padded `YYYY-MM-DD` key used for both cell
/// identity and remaining-count lookups.
///
/// Years before 1 CE get a leading `-` ahead of the four year digits
/// (`-0005-01-01`).  Keys compare in date order only for years 0 through
/// 9999.
pub(crate) fn date_key(date: Date) -> String {
    let year = date.year();
    let sign = if year < 0 { "-" } else { "" };
    format!(
        "{sign}{:04}-{:02}-{:02}",
        year.unsigned_abs(),
        u8::from(date.month()),
        date.day()
    )
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DayCell {
    pub(crate) date: Date,
    pub(crate) in_current_month: bool,
    pub(crate) key: String,
    pub(crate) remaining: u32,
    pub(crate) is_selected: bool,
    pub(crate) is_today: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
// Invariant: `cells` holds exactly GRID_DAYS consecutive days, the first of
// which falls on the week start
pub(crate) struct MonthGrid {
    year: i32,
    month: Month,
    cells: Vec<DayCell>,
}

impl MonthGrid {
    pub(crate) fn build(
        selected: Date,
        anchor: Option<Date>,
        today: Date,
        remaining: &RemainingByDate,
        week_start: WeekStart,
    ) -> Result<MonthGrid, OutOfTimeError> {
        let anchor = anchor.unwrap_or(selected);
        let first = first_of_month(anchor)?;
        let leading = week_start.column(first.weekday());
        let start = first
            .checked_sub(Duration::days(i64::from(leading)))
            .ok_or(OutOfTimeError)?;
        let cells = successors(Some(start), |d| d.next_day())
            .take(GRID_DAYS)
            .map(|date| {
                let key = date_key(date);
                DayCell {
                    date,
                    in_current_month: date.year() == anchor.year()
                        && date.month() == anchor.month(),
                    remaining: remaining.get(&key).copied().unwrap_or(0),
                    key,
                    is_selected: date == selected,
                    is_today: date == today,
                }
            })
            .collect::<Vec<_>>();
        if cells.len() < GRID_DAYS {
            return Err(OutOfTimeError);
        }
        Ok(MonthGrid {
            year: anchor.year(),
            month: anchor.month(),
            cells,
        })
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    #[cfg(test)]
    pub(crate) fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub(crate) fn get(&self, index: usize) -> Option<&DayCell> {
        self.cells.get(index)
    }

    /// Total remaining count over the days belonging to the anchor month
    pub(crate) fn month_remaining(&self) -> u32 {
        self.cells
            .iter()
            .filter(|c| c.in_current_month)
            .map(|c| c.remaining)
            .sum()
    }

    pub(crate) fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.cells.chunks(DAYS_IN_WEEK)
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

pub(crate) fn first_of_month(date: Date) -> Result<Date, OutOfTimeError> {
    Date::from_calendar_date(date.year(), date.month(), 1).map_err(|_| OutOfTimeError)
}

/// Returns the first day of the month `delta` months away from `date`'s
pub(crate) fn shift_month(date: Date, delta: i32) -> Result<Date, OutOfTimeError> {
    let index = date
        .year()
        .checked_mul(12)
        .and_then(|y| y.checked_add(i32::from(u8::from(date.month())) - 1))
        .and_then(|i| i.checked_add(delta))
        .ok_or(OutOfTimeError)?;
    let year = index.div_euclid(12);
    let month = u8::try_from(index.rem_euclid(12) + 1).map_err(|_| OutOfTimeError)?;
    let month = Month::try_from(month).map_err(|_| OutOfTimeError)?;
    Date::from_calendar_date(year, month, 1).map_err(|_| OutOfTimeError)
}
