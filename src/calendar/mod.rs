mod grid;
mod view;
mod widget;
pub(crate) use self::grid::{date_key, RemainingByDate, WeekStart};
pub(crate) use self::view::CalendarView;
pub(crate) use self::widget::{MonthCalendar, MAIN_HEIGHT};
