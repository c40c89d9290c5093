use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use shared_types::Task;
use std::fmt;
use std::str::FromStr;

/// Cells in the month view: six Sunday-first weeks
pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub is_current_month: bool,
}

/// A displayed month, always anchored on its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn prev_month(&self) -> Self {
        Self {
            first: self.first.checked_sub_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn next_month(&self) -> Self {
        Self {
            first: self.first.checked_add_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next_month().first;
        if next == self.first {
            return 31;
        }
        (next - self.first).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}

impl FromStr for CalendarMonth {
    type Err = String;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|first| Self { first })
            .map_err(|_| format!("Invalid month '{s}', expected YYYY-MM"))
    }
}

/// The 42-cell grid for `month`: trailing days of the previous month, the
/// month itself, then leading days of the next month
pub fn month_grid(month: CalendarMonth) -> Vec<CalendarDay> {
    let leading = month.first_day().weekday().num_days_from_sunday() as i64;
    let start = month.first_day() - Duration::days(leading);

    (0..GRID_CELLS as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            CalendarDay {
                date,
                day: date.day(),
                is_current_month: month.contains(date),
            }
        })
        .collect()
}

/// Tasks due on `date` as seen from `tz`
pub fn tasks_for_date<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| {
            task.due_date
                .map(|due| due.with_timezone(tz).date_naive() == date)
                .unwrap_or(false)
        })
        .collect()
}

pub fn time_until_due(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = due - now;

    if diff < Duration::zero() {
        let overdue = -diff;
        let hours = overdue.num_hours();
        let minutes = overdue.num_minutes() % 60;
        return if hours > 0 {
            format!("Overdue {hours}h {minutes}m")
        } else {
            format!("Overdue {minutes}m")
        };
    }

    let hours = diff.num_hours();
    let minutes = diff.num_minutes() % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        "Due now".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueUrgency {
    Overdue,
    /// Due within the hour
    Urgent,
    /// Due within three hours
    Warning,
    Normal,
}

pub fn due_urgency(due: DateTime<Utc>, now: DateTime<Utc>) -> DueUrgency {
    let diff = due - now;
    if diff < Duration::zero() {
        return DueUrgency::Overdue;
    }

    match diff.num_minutes() {
        m if m < 60 => DueUrgency::Urgent,
        m if m < 180 => DueUrgency::Warning,
        _ => DueUrgency::Normal,
    }
}
