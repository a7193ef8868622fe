use super::grid::{shift_month, MonthGrid, OutOfTimeError, RemainingByDate, WeekStart};
use super::widget::CalendarLayout;
use time::{Date, Duration};

static MONDAY_LABELS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

static SUNDAY_LABELS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Everything the cached grid depends on
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct GridKey {
    anchor: Date,
    selected: Date,
    today: Date,
    week_start: WeekStart,
    revision: u64,
}

/// State of the month calendar: which month is shown, which day is selected,
/// and the last grid built for them
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarView {
    pub(super) today: Date,
    selected: Date,
    // Always the first of a month
    anchor: Date,
    week_start: WeekStart,
    week_labels: [&'static str; 7],
    cache: Option<(GridKey, MonthGrid)>,
    pub(super) layout: Option<CalendarLayout>,
}

impl CalendarView {
    pub(crate) fn new(today: Date) -> Self {
        CalendarView {
            today,
            selected: today,
            anchor: today.replace_day(1).unwrap_or(today),
            week_start: WeekStart::Monday,
            week_labels: MONDAY_LABELS,
            cache: None,
            layout: None,
        }
    }

    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.selected = date;
        self.anchor = date.replace_day(1).unwrap_or(date);
        self
    }

    pub(crate) fn week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self.week_labels = match week_start {
            WeekStart::Monday => MONDAY_LABELS,
            WeekStart::Sunday => SUNDAY_LABELS,
        };
        self
    }

    #[cfg(test)]
    pub(crate) fn week_labels(mut self, labels: [&'static str; 7]) -> Self {
        self.week_labels = labels;
        self
    }

    pub(crate) fn selected(&self) -> Date {
        self.selected
    }

    #[cfg(test)]
    pub(crate) fn anchor(&self) -> Date {
        self.anchor
    }

    pub(super) fn labels(&self) -> &[&'static str; 7] {
        &self.week_labels
    }

    /// Returns the grid for the current month, rebuilding it only when one of
    /// its inputs has changed since the last call
    pub(crate) fn grid(
        &mut self,
        remaining: &RemainingByDate,
        revision: u64,
    ) -> Result<&MonthGrid, OutOfTimeError> {
        let key = GridKey {
            anchor: self.anchor,
            selected: self.selected,
            today: self.today,
            week_start: self.week_start,
            revision,
        };
        let fresh = matches!(&self.cache, Some((k, _)) if *k == key);
        if !fresh {
            let grid = MonthGrid::build(
                self.selected,
                Some(self.anchor),
                self.today,
                remaining,
                self.week_start,
            )?;
            tracing::trace!(anchor = %self.anchor, selected = %self.selected, "rebuilt month grid");
            self.cache = Some((key, grid));
        }
        match &self.cache {
            Some((_, grid)) => Ok(grid),
            None => Err(OutOfTimeError),
        }
    }

    /// Selects `date` without moving the displayed month
    pub(crate) fn select(&mut self, date: Date) {
        self.selected = date;
    }

    /// Moves the selection by `days`, bringing the displayed month along if
    /// the selection leaves it
    pub(crate) fn move_selection(&mut self, days: i64) -> Result<(), OutOfTimeError> {
        let date = self
            .selected
            .checked_add(Duration::days(days))
            .ok_or(OutOfTimeError)?;
        self.selected = date;
        if (date.year(), date.month()) != (self.anchor.year(), self.anchor.month()) {
            self.anchor = date.replace_day(1).map_err(|_| OutOfTimeError)?;
        }
        Ok(())
    }

    /// Shows the month `delta` months away without touching the selection
    pub(crate) fn change_month(&mut self, delta: i32) -> Result<(), OutOfTimeError> {
        self.anchor = shift_month(self.anchor, delta)?;
        Ok(())
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.selected = self.today;
        self.anchor = self.today.replace_day(1).unwrap_or(self.today);
    }

    /// Returns the date drawn at terminal position (`column`, `row`) in the
    /// most recent render, if any
    pub(crate) fn date_at(&self, column: u16, row: u16) -> Option<Date> {
        let index = self.layout?.cell_at(column, row)?;
        let (_, grid) = self.cache.as_ref()?;
        let cell = grid.get(index)?;
        tracing::trace!(key = %cell.key, "hit day cell");
        Some(cell.date)
    }
}
