//! Semester date ranges.
//!
//! # Responsibility
//! - Name the inclusive date window that bounds recurring classes.
//! - Derive preset windows from a season and a year (`"Fall 2025"`).
//!
//! # Invariants
//! - `start <= end`.
//! - Preset windows: Spring Jan 1..May 31, Summer Jun 1..Jul 31,
//!   Fall Aug 1..Dec 31.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Academic season used to build preset semesters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }

    /// Season whose preset window contains the given month (1-based).
    pub fn for_month(month: u32) -> Self {
        match month {
            1..=5 => Self::Spring,
            6 | 7 => Self::Summer,
            _ => Self::Fall,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "fall" | "autumn" => Some(Self::Fall),
            _ => None,
        }
    }

    /// `(start_month, start_day, end_month, end_day)`.
    fn bounds(self) -> (u32, u32, u32, u32) {
        match self {
            Self::Spring => (1, 1, 5, 31),
            Self::Summer => (6, 1, 7, 31),
            Self::Fall => (8, 1, 12, 31),
        }
    }
}

/// Errors for semester construction and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemesterError {
    /// Name is not `<Season> <Year>`.
    InvalidName(String),
    /// Year cannot be represented as a calendar date.
    YearOutOfRange(i32),
    /// `start` falls after `end`.
    InvertedRange { start: NaiveDate, end: NaiveDate },
    /// Name is blank.
    BlankName,
}

impl Display for SemesterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(
                f,
                "invalid semester `{value}`; expected `<Spring|Summer|Fall> <year>`"
            ),
            Self::YearOutOfRange(year) => write!(f, "semester year {year} is out of range"),
            Self::InvertedRange { start, end } => {
                write!(f, "semester start {start} is after end {end}")
            }
            Self::BlankName => write!(f, "semester name must not be blank"),
        }
    }
}

impl Error for SemesterError {}

/// Named inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Semester {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Semester {
    /// Builds a custom semester window.
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, SemesterError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SemesterError::BlankName);
        }
        if start > end {
            return Err(SemesterError::InvertedRange { start, end });
        }
        Ok(Self { name, start, end })
    }

    /// Builds the preset window for `season` in `year`.
    pub fn preset(season: Season, year: i32) -> Result<Self, SemesterError> {
        let (start_month, start_day, end_month, end_day) = season.bounds();
        let start = NaiveDate::from_ymd_opt(year, start_month, start_day)
            .ok_or(SemesterError::YearOutOfRange(year))?;
        let end = NaiveDate::from_ymd_opt(year, end_month, end_day)
            .ok_or(SemesterError::YearOutOfRange(year))?;
        Ok(Self {
            name: format!("{} {year}", season.as_str()),
            start,
            end,
        })
    }

    /// Parses `"<Season> <Year>"`, e.g. `"Fall 2025"`.
    pub fn parse(value: &str) -> Result<Self, SemesterError> {
        let mut parts = value.split_whitespace();
        let (Some(season), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(SemesterError::InvalidName(value.trim().to_string()));
        };
        let season =
            Season::parse(season).ok_or_else(|| SemesterError::InvalidName(value.trim().to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| SemesterError::InvalidName(value.trim().to_string()))?;
        Self::preset(season, year)
    }

    /// Preset semester whose window contains `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, SemesterError> {
        Self::preset(Season::for_month(date.month()), date.year())
    }

    /// Whether `date` lies within `[start, end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for Semester {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Semester, SemesterError};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_builds_fall_window() {
        let fall = Semester::parse("Fall 2025").unwrap();
        assert_eq!(fall.name, "Fall 2025");
        assert_eq!(fall.start, date(2025, 8, 1));
        assert_eq!(fall.end, date(2025, 12, 31));
    }

    #[test]
    fn parse_rejects_missing_year_and_unknown_season() {
        assert!(matches!(
            Semester::parse("Fall"),
            Err(SemesterError::InvalidName(_))
        ));
        assert!(matches!(
            Semester::parse("Winter 2025"),
            Err(SemesterError::InvalidName(_))
        ));
        assert!(matches!(
            Semester::parse("Spring 2025 extra"),
            Err(SemesterError::InvalidName(_))
        ));
    }

    #[test]
    fn bounds_are_inclusive() {
        let spring = Semester::parse("spring 2026").unwrap();
        assert!(spring.contains(date(2026, 1, 1)));
        assert!(spring.contains(date(2026, 5, 31)));
        assert!(!spring.contains(date(2026, 6, 1)));
        assert!(!spring.contains(date(2025, 12, 31)));
    }

    #[test]
    fn containing_picks_season_by_month() {
        assert_eq!(
            Semester::containing(date(2025, 7, 4)).unwrap().name,
            "Summer 2025"
        );
        assert_eq!(
            Semester::containing(date(2025, 9, 1)).unwrap().name,
            "Fall 2025"
        );
    }

    #[test]
    fn new_rejects_inverted_range() {
        let err = Semester::new("Custom", date(2025, 5, 1), date(2025, 4, 1)).unwrap_err();
        assert!(matches!(err, SemesterError::InvertedRange { .. }));
    }
}
