use chrono::{Datelike, Local, NaiveDate};

use crate::constants::SOURCE_DATE_FORMAT;

/// Source of "today" for rows whose date cannot be parsed
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local system date, read at call time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSource {
    Parsed,
    /// The row's date was missing or malformed and the clock was used instead
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub month: String,
    pub year: i32,
    pub source: PeriodSource,
}

impl ResolvedPeriod {
    fn from_date(date: NaiveDate, source: PeriodSource) -> Self {
        Self {
            month: date.format("%b").to_string(),
            year: date.year(),
            source,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PeriodSource::Fallback
    }
}

/// Resolves `dd-mm-yyyy` source dates into (month abbreviation, year).
///
/// Never fails: an unreadable date resolves to the clock's current month.
/// Callers that care can check [`ResolvedPeriod::source`].
pub struct DateKeyResolver {
    clock: Box<dyn Clock>,
}

impl Default for DateKeyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DateKeyResolver {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn resolve(&self, raw: Option<&str>) -> ResolvedPeriod {
        match raw.and_then(parse_source_date) {
            Some(date) => ResolvedPeriod::from_date(date, PeriodSource::Parsed),
            None => ResolvedPeriod::from_date(self.clock.today(), PeriodSource::Fallback),
        }
    }
}

fn parse_source_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // chrono's %Y also takes signs and short years; keys need exactly four digits
    let (_, year) = raw.rsplit_once('-')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(raw, SOURCE_DATE_FORMAT)
        .ok()
        .filter(|date| (1000..=9999).contains(&date.year()))
}
