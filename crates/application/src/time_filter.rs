//! Maps free-text query phrases onto concrete UTC time windows.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use regex::{Captures, Regex};
use runlens_core::{AppError, AppResult};
use runlens_domain::TimeRange;

/// Recognized time phrases, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeRule {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
    Last24Hours,
    ExplicitRange,
}

const EXPLICIT_RANGE_PATTERN: &str = r"(?i)from\s+([A-Za-z]+\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?)\s+to\s+([A-Za-z]+\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?)";

/// Extracts a [`TimeRange`] from a natural-language query.
///
/// Rules are tested in a fixed order and the first match wins, so queries
/// containing overlapping phrases resolve deterministically. A query that
/// matches no rule yields no time constraint.
#[derive(Debug, Clone)]
pub struct TimeFilterExtractor {
    rules: Vec<(Regex, TimeRule)>,
}

impl TimeFilterExtractor {
    /// Compiles the phrase rules in their precedence order.
    pub fn new() -> AppResult<Self> {
        let patterns = [
            (r"(?i)\btoday\b", TimeRule::Today),
            (r"(?i)\byesterday\b", TimeRule::Yesterday),
            (r"(?i)\blast\s+week\b", TimeRule::LastWeek),
            (r"(?i)\blast\s+month\b", TimeRule::LastMonth),
            (r"(?i)\blast\s+24\s+hours\b", TimeRule::Last24Hours),
            (EXPLICIT_RANGE_PATTERN, TimeRule::ExplicitRange),
        ];

        let mut rules = Vec::with_capacity(patterns.len());
        for (pattern, rule) in patterns {
            let regex = Regex::new(pattern).map_err(|error| {
                AppError::Internal(format!("invalid time phrase pattern '{pattern}': {error}"))
            })?;
            rules.push((regex, rule));
        }

        Ok(Self { rules })
    }

    /// Extracts a time window relative to the current instant.
    #[must_use]
    pub fn extract(&self, query: &str) -> Option<TimeRange> {
        self.extract_at(query, Utc::now())
    }

    /// Extracts a time window relative to `now`.
    ///
    /// An explicit range whose dates fail to parse degrades to no time
    /// filter rather than failing the query.
    #[must_use]
    pub fn extract_at(&self, query: &str, now: DateTime<Utc>) -> Option<TimeRange> {
        for (regex, rule) in &self.rules {
            let Some(captures) = regex.captures(query) else {
                continue;
            };

            return match rule {
                TimeRule::Today => today_range(now),
                TimeRule::Yesterday => yesterday_range(now),
                TimeRule::LastWeek => last_week_range(now),
                TimeRule::LastMonth => last_month_range(now),
                TimeRule::Last24Hours => TimeRange::new(now - Duration::hours(24), now).ok(),
                TimeRule::ExplicitRange => explicit_range(&captures, now),
            };
        }

        None
    }
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(23, 59, 59)?.and_utc())
}

fn today_range(now: DateTime<Utc>) -> Option<TimeRange> {
    TimeRange::new(start_of_day(now.date_naive())?, now).ok()
}

fn yesterday_range(now: DateTime<Utc>) -> Option<TimeRange> {
    let yesterday = now.date_naive().pred_opt()?;
    TimeRange::new(start_of_day(yesterday)?, end_of_day(yesterday)?).ok()
}

/// The seven full UTC days immediately preceding today.
fn last_week_range(now: DateTime<Utc>) -> Option<TimeRange> {
    let today_start = start_of_day(now.date_naive())?;
    TimeRange::new(
        today_start - Duration::days(7),
        today_start - Duration::seconds(1),
    )
    .ok()
}

/// The previous full calendar month, rolling into the prior year in January.
fn last_month_range(now: DateTime<Utc>) -> Option<TimeRange> {
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let following_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = following_first.pred_opt()?;

    TimeRange::new(start_of_day(first)?, end_of_day(last)?).ok()
}

fn explicit_range(captures: &Captures<'_>, now: DateTime<Utc>) -> Option<TimeRange> {
    let start = parse_phrase_date(captures.get(1)?.as_str(), now)?;
    let end = parse_phrase_date(captures.get(2)?.as_str(), now)?;
    TimeRange::new(start_of_day(start)?, end_of_day(end)?).ok()
}

/// Parses a "Month day[, year]" phrase; the year defaults to the current
/// UTC year and ordinal suffixes ("1st", "22nd") are accepted.
fn parse_phrase_date(text: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let cleaned = text.replace(',', " ");
    let mut parts = cleaned.split_whitespace();
    let month = parts.next()?;
    let day = parts
        .next()?
        .trim_end_matches(|character: char| character.is_ascii_alphabetic());
    let year = parts
        .next()
        .map(str::to_owned)
        .unwrap_or_else(|| now.year().to_string());

    let normalized = format!("{month} {day} {year}");
    NaiveDate::parse_from_str(&normalized, "%B %d %Y")
        .or_else(|_| NaiveDate::parse_from_str(&normalized, "%b %d %Y"))
        .ok()
}
