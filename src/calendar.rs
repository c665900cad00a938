use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::models::ReadingCompletion;

/// Six Sunday-first weeks.
pub const GRID_CELLS: usize = 42;
/// Minutes of reading that light a day up fully.
pub const FULL_INTENSITY_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("month {month} is out of range 1-12"));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| anyhow!("invalid month {}-{:02}", self.year, self.month))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub sessions: u32,
    pub minutes: u32,
    /// 0.0 for no reading, 1.0 at or past [`FULL_INTENSITY_MINUTES`].
    pub intensity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthStats {
    pub reading_days: u32,
    pub sessions: u32,
    pub total_minutes: u32,
}

impl MonthStats {
    /// Total hours rounded to one decimal place.
    pub fn total_hours(&self) -> f64 {
        (f64::from(self.total_minutes) / 60.0 * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub month: YearMonth,
    pub cells: Vec<DayCell>,
    pub stats: MonthStats,
}

impl MonthView {
    pub fn build(
        month: YearMonth,
        completions: &[ReadingCompletion],
        today: NaiveDate,
    ) -> Result<Self> {
        let first = month.first_day()?;
        let lead = u64::from(first.weekday().num_days_from_sunday());
        let grid_start = first
            .checked_sub_days(Days::new(lead))
            .ok_or_else(|| anyhow!("calendar start underflows for {first}"))?;

        let cells = grid_start
            .iter_days()
            .take(GRID_CELLS)
            .map(|date| {
                let (sessions, minutes) = completions
                    .iter()
                    .filter(|c| c.date == date)
                    .fold((0u32, 0u32), |(n, m), c| {
                        (n.saturating_add(1), m.saturating_add(c.duration_minutes))
                    });
                DayCell {
                    date,
                    in_month: month.contains(date),
                    is_today: date == today,
                    sessions,
                    minutes,
                    intensity: intensity(minutes),
                }
            })
            .collect();

        Ok(Self {
            month,
            cells,
            stats: month_stats(month, completions),
        })
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}

pub fn intensity(minutes: u32) -> f64 {
    (f64::from(minutes) / f64::from(FULL_INTENSITY_MINUTES)).min(1.0)
}

/// Stats over the completions dated inside `month`; others are ignored.
pub fn month_stats(month: YearMonth, completions: &[ReadingCompletion]) -> MonthStats {
    let in_month: Vec<&ReadingCompletion> =
        completions.iter().filter(|c| month.contains(c.date)).collect();

    let mut days: Vec<NaiveDate> = in_month.iter().map(|c| c.date).collect();
    days.sort_unstable();
    days.dedup();

    MonthStats {
        reading_days: days.len() as u32,
        sessions: in_month.len() as u32,
        total_minutes: total_minutes(in_month.iter().copied()),
    }
}

/// Minutes summed without wrapping; API values are not trusted to be small.
fn total_minutes<'a>(completions: impl Iterator<Item = &'a ReadingCompletion>) -> u32 {
    completions.fold(0u32, |sum, c| sum.saturating_add(c.duration_minutes))
}

/// Every completion recorded on one day, with the day's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub entries: Vec<ReadingCompletion>,
    pub total_minutes: u32,
}

impl DayDetail {
    /// Keeps the completions dated `date`, in the order given.
    pub fn collect(date: NaiveDate, completions: &[ReadingCompletion]) -> Self {
        let entries: Vec<ReadingCompletion> = completions
            .iter()
            .filter(|c| c.date == date)
            .cloned()
            .collect();
        Self {
            date,
            total_minutes: total_minutes(entries.iter()),
            entries,
        }
    }

    pub fn sessions(&self) -> usize {
        self.entries.len()
    }
}

/// Month shifted by `offset` months; negative goes back.
pub fn shift_month(month: YearMonth, offset: i32) -> Result<YearMonth> {
    let first = month.first_day()?;
    let shifted = if offset >= 0 {
        first.checked_add_months(Months::new(offset.unsigned_abs()))
    } else {
        first.checked_sub_months(Months::new(offset.unsigned_abs()))
    };
    shifted
        .map(YearMonth::of)
        .ok_or_else(|| anyhow!("month offset {offset} out of range"))
}
