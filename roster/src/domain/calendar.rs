use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("date is outside the supported calendar range")]
    OutOfRange,
}

/// Granularity of a calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarMode {
    #[default]
    Week,
    Month,
}

impl FromStr for CalendarMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(format!("unknown calendar mode '{other}'")),
        }
    }
}

/// Locale used for window labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarLocale {
    #[default]
    English,
    Indonesian,
}

impl CalendarLocale {
    pub fn month_name(self, month: Month) -> &'static str {
        let idx = month as usize - 1;
        match self {
            Self::English => [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ][idx],
            Self::Indonesian => [
                "Januari",
                "Februari",
                "Maret",
                "April",
                "Mei",
                "Juni",
                "Juli",
                "Agustus",
                "September",
                "Oktober",
                "November",
                "Desember",
            ][idx],
        }
    }

    pub fn month_abbrev(self, month: Month) -> &'static str {
        let idx = month as usize - 1;
        match self {
            Self::English => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ][idx],
            Self::Indonesian => [
                "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
            ][idx],
        }
    }

    /// `"03 Mar – 09 Mar 2024"`
    pub fn week_label(self, start: Date, end: Date) -> String {
        format!(
            "{:02} {} – {:02} {} {}",
            start.day(),
            self.month_abbrev(start.month()),
            end.day(),
            self.month_abbrev(end.month()),
            end.year()
        )
    }

    /// `"March 2024"`
    pub fn month_label(self, date: Date) -> String {
        format!("{} {}", self.month_name(date.month()), date.year())
    }
}

/// An inclusive date window covering one week (Monday to Sunday) or one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: Date,
    pub end: Date,
    pub label: String,
}

impl CalendarWindow {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for CalendarWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.label.fmt(f)
    }
}

/// Computes the window that `anchor` falls in for the given mode.
pub fn resolve(
    anchor: Date,
    mode: CalendarMode,
    locale: CalendarLocale,
) -> Result<CalendarWindow, CalendarError> {
    match mode {
        CalendarMode::Week => {
            let start = week_start(anchor)?;
            let end = start
                .checked_add(Duration::days(6))
                .ok_or(CalendarError::OutOfRange)?;
            Ok(CalendarWindow {
                start,
                end,
                label: locale.week_label(start, end),
            })
        }
        CalendarMode::Month => {
            let start = month_start(anchor);
            let end = month_end(anchor)?;
            Ok(CalendarWindow {
                start,
                end,
                label: locale.month_label(anchor),
            })
        }
    }
}

/// Moves `anchor` one unit forwards (`direction > 0`) or backwards.
pub fn step(anchor: Date, mode: CalendarMode, direction: i32) -> Result<Date, CalendarError> {
    let direction = direction.signum();
    match mode {
        CalendarMode::Week => anchor
            .checked_add(Duration::weeks(direction.into()))
            .ok_or(CalendarError::OutOfRange),
        CalendarMode::Month => add_months(anchor, direction),
    }
}

/// The current date in the local calendar (UTC if the offset is unknown).
pub fn today() -> Date {
    let now = OffsetDateTime::now_utc();
    match UtcOffset::current_local_offset() {
        Ok(offset) => now.to_offset(offset).date(),
        Err(_) => now.date(),
    }
}

fn week_start(date: Date) -> Result<Date, CalendarError> {
    let days_since_monday = date.weekday().number_days_from_monday();
    date.checked_sub(Duration::days(days_since_monday.into()))
        .ok_or(CalendarError::OutOfRange)
}

fn month_start(date: Date) -> Date {
    // Day 1 exists in every month.
    date.replace_day(1).unwrap_or(date)
}

/// Day 0 of the following month.
fn month_end(date: Date) -> Result<Date, CalendarError> {
    let first_of_next = add_months(month_start(date), 1)?;
    first_of_next.previous_day().ok_or(CalendarError::OutOfRange)
}

/// Calendar month arithmetic that clamps the day to the target month's length.
fn add_months(date: Date, months: i32) -> Result<Date, CalendarError> {
    let index = date.year() * 12 + (date.month() as i32 - 1) + months;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8)
        .map_err(|_| CalendarError::OutOfRange)?;

    let mut day = date.day();
    loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(shifted) => return Ok(shifted),
            Err(_) if day > 28 => day -= 1,
            Err(_) => return Err(CalendarError::OutOfRange),
        }
    }
}

/// Stateful navigator over [`CalendarWindow`]s.
#[derive(Debug, Clone)]
pub struct CalendarView {
    anchor: Date,
    mode: CalendarMode,
    locale: CalendarLocale,
}

impl CalendarView {
    pub fn new(anchor: Date, mode: CalendarMode, locale: CalendarLocale) -> Self {
        Self {
            anchor,
            mode,
            locale,
        }
    }

    pub fn anchor(&self) -> Date {
        self.anchor
    }

    pub fn mode(&self) -> CalendarMode {
        self.mode
    }

    pub fn window(&self) -> Result<CalendarWindow, CalendarError> {
        resolve(self.anchor, self.mode, self.locale)
    }

    pub fn set_mode(&mut self, mode: CalendarMode) {
        self.mode = mode;
    }

    pub fn next(&mut self) -> Result<(), CalendarError> {
        self.anchor = step(self.anchor, self.mode, 1)?;
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), CalendarError> {
        self.anchor = step(self.anchor, self.mode, -1)?;
        Ok(())
    }

    pub fn reset_to_today(&mut self) {
        self.anchor = today();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::Weekday;

    const EN: CalendarLocale = CalendarLocale::English;

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-06 is a Wednesday.
        let window = resolve(date!(2024 - 03 - 06), CalendarMode::Week, EN).unwrap();
        assert_eq!(window.start, date!(2024 - 03 - 04));
        assert_eq!(window.end, date!(2024 - 03 - 10));
        assert_eq!(window.start.weekday(), Weekday::Monday);
    }

    #[test]
    fn sunday_belongs_to_the_preceding_week() {
        let window = resolve(date!(2024 - 03 - 10), CalendarMode::Week, EN).unwrap();
        assert_eq!(window.start, date!(2024 - 03 - 04));
    }

    #[test]
    fn every_week_window_contains_its_anchor() {
        let mut anchor = date!(2023 - 12 - 20);
        for _ in 0..60 {
            let window = resolve(anchor, CalendarMode::Week, EN).unwrap();
            assert_eq!(window.start.weekday(), Weekday::Monday);
            assert_eq!(window.end, window.start + Duration::days(6));
            assert!(window.contains(anchor));
            anchor = anchor.next_day().unwrap();
        }
    }

    #[test]
    fn month_window_spans_the_whole_month() {
        let cases = [
            (date!(2024 - 02 - 14), date!(2024 - 02 - 29)),
            (date!(2023 - 02 - 14), date!(2023 - 02 - 28)),
            (date!(2024 - 04 - 30), date!(2024 - 04 - 30)),
            (date!(2024 - 12 - 01), date!(2024 - 12 - 31)),
        ];
        for (anchor, last) in cases {
            let window = resolve(anchor, CalendarMode::Month, EN).unwrap();
            assert_eq!(window.start.day(), 1);
            assert_eq!(window.start.month(), anchor.month());
            assert_eq!(window.end, last);
        }
    }

    #[test]
    fn labels_follow_locale() {
        let week = resolve(date!(2024 - 02 - 28), CalendarMode::Week, EN).unwrap();
        assert_eq!(week.label, "26 Feb – 03 Mar 2024");

        let month = resolve(
            date!(2024 - 08 - 17),
            CalendarMode::Month,
            CalendarLocale::Indonesian,
        )
        .unwrap();
        assert_eq!(month.label, "Agustus 2024");

        let week = resolve(
            date!(2024 - 05 - 01),
            CalendarMode::Week,
            CalendarLocale::Indonesian,
        )
        .unwrap();
        assert_eq!(week.label, "29 Apr – 05 Mei 2024");
    }

    #[test]
    fn month_step_rolls_over_years() {
        assert_eq!(
            step(date!(2024 - 12 - 15), CalendarMode::Month, 1).unwrap(),
            date!(2025 - 01 - 15)
        );
        assert_eq!(
            step(date!(2024 - 01 - 15), CalendarMode::Month, -1).unwrap(),
            date!(2023 - 12 - 15)
        );
    }

    #[test]
    fn month_step_clamps_missing_days() {
        assert_eq!(
            step(date!(2024 - 01 - 31), CalendarMode::Month, 1).unwrap(),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            step(date!(2023 - 03 - 31), CalendarMode::Month, -1).unwrap(),
            date!(2023 - 02 - 28)
        );
    }

    #[test]
    fn week_step_moves_seven_days() {
        assert_eq!(
            step(date!(2024 - 12 - 30), CalendarMode::Week, 1).unwrap(),
            date!(2025 - 01 - 06)
        );
    }

    #[test]
    fn stepping_forward_then_back_is_consistent() {
        let anchors = [
            date!(2024 - 01 - 31),
            date!(2024 - 02 - 29),
            date!(2023 - 12 - 31),
            date!(2024 - 07 - 15),
        ];
        for anchor in anchors {
            for mode in [CalendarMode::Week, CalendarMode::Month] {
                let there = step(anchor, mode, 1).unwrap();
                let back = step(there, mode, -1).unwrap();
                assert_eq!(
                    resolve(back, mode, EN).unwrap(),
                    resolve(anchor, mode, EN).unwrap(),
                    "{anchor} in {mode:?}"
                );
            }
        }
    }

    #[test]
    fn switching_mode_keeps_anchor() {
        let mut view = CalendarView::new(date!(2024 - 02 - 14), CalendarMode::Week, EN);
        view.set_mode(CalendarMode::Month);
        assert_eq!(view.anchor(), date!(2024 - 02 - 14));
        view.next().unwrap();
        assert_eq!(view.anchor(), date!(2024 - 03 - 14));
        view.set_mode(CalendarMode::Week);
        view.previous().unwrap();
        assert_eq!(view.anchor(), date!(2024 - 03 - 07));
    }

    #[test]
    fn calendar_edges_are_errors_not_panics() {
        assert_eq!(
            step(Date::MAX, CalendarMode::Month, 1).unwrap_err(),
            CalendarError::OutOfRange
        );
        assert_eq!(
            resolve(Date::MAX, CalendarMode::Month, EN).unwrap_err(),
            CalendarError::OutOfRange
        );
    }

    #[test]
    fn reset_returns_to_today() {
        let mut view = CalendarView::new(date!(2020 - 01 - 15), CalendarMode::Month, EN);
        view.next().unwrap();
        assert_eq!(view.anchor(), date!(2020 - 02 - 15));

        let before = today();
        view.reset_to_today();
        let after = today();

        assert!(view.anchor() == before || view.anchor() == after);
        assert_eq!(view.mode(), CalendarMode::Month);
        assert!(view.window().unwrap().contains(view.anchor()));
    }

    #[test]
    fn today_is_inside_its_own_week() {
        let now = today();
        let window = resolve(now, CalendarMode::Week, EN).unwrap();
        assert!(window.start <= now && now <= window.end);
    }
}
