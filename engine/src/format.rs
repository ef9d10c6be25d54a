//! Pattern-driven date formatting, strict parsing and lenient analysis.
//!
//! A pattern is split into terms, each a run of one repeated character.
//! Known terms (`yyyy`, `MM`, `d`, `HH`, `a`, ...) format and parse a date part; every other
//! term is a constant that is printed verbatim and must be typed verbatim
//! (except while analyzing, where constants are optional so `020318` reads
//! as `02.03.2018`).

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use regex::Regex;
use thiserror::Error;

use crate::locale::Locale;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("date pattern is empty")]
    Empty,
    #[error("date pattern term `{0}` is not supported")]
    Unsupported(String),
}

/// Date parts recognized in an input. `month` is zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateInfo {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hours: Option<i32>,
    pub minutes: Option<i32>,
    pub seconds: Option<i32>,
    pub millis: Option<i32>,
}

impl DateInfo {
    /// Build a date from the recognized parts, taking missing parts from
    /// `start`. `None` if any recognized part would not survive calendar
    /// normalization (day 32, month 13, 31st of February, ...).
    #[must_use]
    pub fn resolve(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let year = self.year.unwrap_or(start.year());
        let mut month = self.month.unwrap_or(start.month0() as i32);
        let mut day = self.day.unwrap_or(start.day() as i32);

        // Only a day so far: move to a month where that day exists.
        if let (Some(typed_day), None) = (self.day, self.month) {
            if typed_day == 31 {
                if ![0, 2, 4, 6, 7, 9, 11].contains(&month) {
                    month += 1;
                }
            } else if typed_day >= 29 && month == 1 && (typed_day > 29 || !is_leap_year(year)) {
                month += 1;
            }
        }
        // Only a month: keep the start day, clamped to the month's length.
        if let (None, Some(typed_month)) = (self.day, self.month) {
            let last = roll_date(year, typed_month + 1, 1)?.pred_opt()?.day() as i32;
            day = last.min(start.day() as i32);
        }

        let date = roll_date(year, month, day)?;
        let time = NaiveTime::from_hms_milli_opt(
            u32::try_from(self.hours.unwrap_or(start.hour() as i32)).ok()?,
            u32::try_from(self.minutes.unwrap_or(start.minute() as i32)).ok()?,
            u32::try_from(self.seconds.unwrap_or(start.second() as i32)).ok()?,
            u32::try_from(self.millis.unwrap_or(millis_of(&start) as i32)).ok()?,
        )?;

        let kept = |typed: Option<i32>, actual: u32| typed.is_none_or(|typed| typed == actual as i32);
        let unchanged = self.year.is_none_or(|typed| typed == date.year())
            && kept(self.month, date.month0())
            && kept(self.day, date.day());
        unchanged.then(|| date.and_time(time))
    }
}

/// Outcome of [`DateFormat::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeInfo {
    pub date_info: DateInfo,
    /// The terms actually recognized, completed with the remaining pattern
    /// terms. Formatting the prediction with this pattern reproduces the
    /// input's shape (`5.7.2015` against `dd.MM.yyyy` gives `d.M.yyyy`).
    pub parsed_pattern: String,
    /// Like `parsed_pattern` but only up to where the input ended.
    pub matched_pattern: String,
    pub predicted: Option<NaiveDateTime>,
    pub error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Year,
    Month,
    Day,
    Hour24,
    Hour12,
    AmPm,
    Minute,
    Second,
    Millis,
}

/// Known pattern terms, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Definition {
    Year4,
    YearShort,
    MonthLong,
    MonthShort,
    Month2,
    Month1,
    Day2,
    Day1,
    Hour24Pad,
    Hour24,
    Hour12Pad,
    Hour12,
    AmPm,
    Minute2,
    Minute1,
    Second2,
    Second1,
    Millis3,
    Millis1,
}

const DEFINITIONS: [Definition; 19] = [
    Definition::Year4,
    Definition::YearShort,
    Definition::MonthLong,
    Definition::MonthShort,
    Definition::Month2,
    Definition::Month1,
    Definition::Day2,
    Definition::Day1,
    Definition::Hour24Pad,
    Definition::Hour24,
    Definition::Hour12Pad,
    Definition::Hour12,
    Definition::AmPm,
    Definition::Minute2,
    Definition::Minute1,
    Definition::Second2,
    Definition::Second1,
    Definition::Millis3,
    Definition::Millis1,
];

impl Definition {
    fn terms(self) -> &'static [&'static str] {
        match self {
            Self::Year4 => &["yyyy"],
            Self::YearShort => &["yyy", "yy", "y"],
            Self::MonthLong => &["MMMM"],
            Self::MonthShort => &["MMM"],
            Self::Month2 => &["MM"],
            Self::Month1 => &["M"],
            Self::Day2 => &["dd"],
            Self::Day1 => &["d"],
            Self::Hour24Pad => &["HH"],
            Self::Hour24 => &["H"],
            Self::Hour12Pad => &["hh"],
            Self::Hour12 => &["h"],
            Self::AmPm => &["a"],
            Self::Minute2 => &["mm"],
            Self::Minute1 => &["m"],
            Self::Second2 => &["ss"],
            Self::Second1 => &["s"],
            Self::Millis3 => &["SSS"],
            Self::Millis1 => &["S"],
        }
    }

    fn family(self) -> Family {
        match self {
            Self::Year4 | Self::YearShort => Family::Year,
            Self::MonthLong | Self::MonthShort | Self::Month2 | Self::Month1 => Family::Month,
            Self::Day2 | Self::Day1 => Family::Day,
            Self::Hour24Pad | Self::Hour24 => Family::Hour24,
            Self::Hour12Pad | Self::Hour12 => Family::Hour12,
            Self::AmPm => Family::AmPm,
            Self::Minute2 | Self::Minute1 => Family::Minute,
            Self::Second2 | Self::Second1 => Family::Second,
            Self::Millis3 | Self::Millis1 => Family::Millis,
        }
    }

    fn canonical(self) -> &'static str {
        self.terms()[0]
    }

    fn digits(self) -> Option<&'static Regex> {
        let patterns = term_patterns();
        match self {
            Self::Year4 => Some(&patterns.four_digits),
            Self::YearShort | Self::Millis1 => Some(&patterns.up_to_three_digits),
            Self::Month2 | Self::Day2 | Self::Hour24Pad | Self::Minute2 | Self::Second2 => {
                Some(&patterns.two_digits)
            }
            Self::Month1 | Self::Day1 | Self::Hour24 | Self::Minute1 | Self::Second1 => {
                Some(&patterns.up_to_two_digits)
            }
            Self::Hour12Pad => Some(&patterns.hour12_padded),
            Self::Hour12 => Some(&patterns.hour12),
            Self::Millis3 => Some(&patterns.three_digits),
            Self::MonthLong | Self::MonthShort | Self::AmPm => None,
        }
    }
}

static TERM_PATTERNS: OnceLock<TermPatterns> = OnceLock::new();

fn term_patterns() -> &'static TermPatterns {
    TERM_PATTERNS.get_or_init(TermPatterns::new)
}

#[derive(Debug)]
struct TermPatterns {
    four_digits: Regex,
    three_digits: Regex,
    up_to_three_digits: Regex,
    two_digits: Regex,
    up_to_two_digits: Regex,
    hour12_padded: Regex,
    hour12: Regex,
}

impl TermPatterns {
    fn new() -> Self {
        Self {
            four_digits: Regex::new(r"^[0-9]{4}").expect("valid four digits regex"),
            three_digits: Regex::new(r"^[0-9]{3}").expect("valid three digits regex"),
            up_to_three_digits: Regex::new(r"^[0-9]{1,3}").expect("valid short digits regex"),
            two_digits: Regex::new(r"^[0-9]{2}").expect("valid two digits regex"),
            up_to_two_digits: Regex::new(r"^[0-9]{1,2}").expect("valid one or two digits regex"),
            hour12_padded: Regex::new(r"^(?:10|11|12|0[1-9])").expect("valid padded hour regex"),
            hour12: Regex::new(r"^(?:10|11|12|0?[1-9])").expect("valid hour regex"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Constant(String),
    Field { definition: Definition, term: String },
}

impl Term {
    fn compile(term: &str) -> Result<Self, PatternError> {
        if let Some(definition) = DEFINITIONS
            .into_iter()
            .find(|definition| definition.terms().contains(&term))
        {
            return Ok(Self::Field {
                definition,
                term: term.to_owned(),
            });
        }
        // Weekday, week-in-year and time zone terms.
        if term.starts_with(['E', 'w', 'Z']) {
            return Err(PatternError::Unsupported(term.to_owned()));
        }
        Ok(Self::Constant(term.to_owned()))
    }

    fn text(&self) -> &str {
        match self {
            Self::Constant(text) | Self::Field { term: text, .. } => text,
        }
    }
}

struct ParseState<'t> {
    input: &'t str,
    info: DateInfo,
    parsed_pattern: String,
    analyze: bool,
    pm: Option<bool>,
    start: NaiveDateTime,
}

/// A compiled date pattern bound to a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    locale: Locale,
    pattern: String,
    terms: Vec<Term>,
}

impl DateFormat {
    pub fn new(locale: Locale, pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        let terms = split_terms(pattern)
            .into_iter()
            .map(Term::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            locale,
            pattern: pattern.to_owned(),
            terms,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Format `date`. With `exact_length` short-year terms print as many
    /// digits as the term has letters; otherwise they print two.
    #[must_use]
    pub fn format(&self, date: &NaiveDateTime, exact_length: bool) -> String {
        let mut out = String::new();
        for term in &self.terms {
            match term {
                Term::Constant(text) => out.push_str(text),
                Term::Field { definition, term } => {
                    self.format_field(*definition, term.len(), date, exact_length, &mut out);
                }
            }
        }
        out
    }

    /// Strict parse. Every term must match in order and no input may remain.
    #[must_use]
    pub fn parse(&self, text: &str, start: NaiveDateTime) -> Option<NaiveDateTime> {
        if text.is_empty() {
            return None;
        }
        let mut state = ParseState::new(text, start, false);
        for term in &self.terms {
            let parsed = match term {
                Term::Constant(constant) => parse_constant(constant, &mut state),
                Term::Field { definition, .. } => self.parse_field(*definition, &mut state),
            };
            if !parsed {
                return None;
            }
            if state.input.is_empty() {
                break;
            }
        }
        if !state.input.is_empty() {
            return None;
        }
        state.info.resolve(start)
    }

    /// Lenient analysis of a partial input. Each pattern term also accepts
    /// the other terms of its family (`d` for `dd`, `yy` for `yyyy`, ...),
    /// constants may be skipped, and a few single-digit inputs are completed
    /// (`0` as day means the 1st).
    #[must_use]
    pub fn analyze(&self, text: &str, start: NaiveDateTime) -> AnalyzeInfo {
        let mut info = AnalyzeInfo::default();
        if text.is_empty() {
            return info;
        }
        let mut state = ParseState::new(text, start, true);
        let mut matched_pattern = String::new();
        for term in &self.terms {
            if state.input.is_empty() {
                state.parsed_pattern.push_str(term.text());
                continue;
            }
            let parsed = match term {
                Term::Constant(constant) => parse_constant(constant, &mut state),
                Term::Field { definition, .. } => alternatives(*definition)
                    .any(|candidate| self.parse_field(candidate, &mut state)),
            };
            if !parsed {
                info.error = true;
                break;
            }
            matched_pattern.clone_from(&state.parsed_pattern);
        }
        if !state.input.is_empty() {
            info.error = true;
        }
        info.date_info = state.info;
        info.parsed_pattern = state.parsed_pattern;
        info.matched_pattern = matched_pattern;
        if !info.error {
            info.predicted = info.date_info.resolve(start);
            info.error = info.predicted.is_none();
        }
        info
    }

    /// Try one definition at the head of the input. Records the recognized
    /// term in the parsed pattern on success.
    fn parse_field(&self, definition: Definition, state: &mut ParseState<'_>) -> bool {
        let recognized = match definition.digits() {
            Some(regex) => {
                let input = state.input;
                match regex.find(input) {
                    Some(found) => {
                        let term = state.apply_digits(definition, found.as_str());
                        state.input = &input[found.end()..];
                        term
                    }
                    None if state.analyze => state.complete_digit(definition),
                    None => None,
                }
            }
            None => match definition {
                Definition::MonthLong => state.apply_month(self.locale.months(), "MMMM"),
                Definition::MonthShort => state.apply_month(self.locale.months_short(), "MMM"),
                _ => state.apply_am_pm(self.locale.am(), self.locale.pm()),
            },
        };
        match recognized {
            Some(term) => {
                state.parsed_pattern.push_str(term);
                true
            }
            None => false,
        }
    }

    fn format_field(
        &self,
        definition: Definition,
        term_len: usize,
        date: &NaiveDateTime,
        exact_length: bool,
        out: &mut String,
    ) {
        let hour12 = match date.hour() % 12 {
            0 => 12,
            hour => hour,
        };
        let _ = match definition {
            Definition::Year4 => write!(out, "{:04}", date.year()),
            Definition::YearShort => {
                let digits = if exact_length { term_len } else { 2 };
                out.write_str(&short_year(date.year(), digits))
            }
            Definition::MonthLong => out.write_str(self.locale.months()[date.month0() as usize]),
            Definition::MonthShort => {
                out.write_str(self.locale.months_short()[date.month0() as usize])
            }
            Definition::Month2 => write!(out, "{:02}", date.month()),
            Definition::Month1 => write!(out, "{}", date.month()),
            Definition::Day2 => write!(out, "{:02}", date.day()),
            Definition::Day1 => write!(out, "{}", date.day()),
            Definition::Hour24Pad => write!(out, "{:02}", date.hour()),
            Definition::Hour24 => write!(out, "{}", date.hour()),
            Definition::Hour12Pad => write!(out, "{hour12:02}"),
            Definition::Hour12 => write!(out, "{hour12}"),
            Definition::AmPm if date.hour() < 12 => out.write_str(self.locale.am()),
            Definition::AmPm => out.write_str(self.locale.pm()),
            Definition::Minute2 => write!(out, "{:02}", date.minute()),
            Definition::Minute1 => write!(out, "{}", date.minute()),
            Definition::Second2 => write!(out, "{:02}", date.second()),
            Definition::Second1 => write!(out, "{}", date.second()),
            Definition::Millis3 => write!(out, "{:03}", millis_of(date)),
            Definition::Millis1 => write!(out, "{}", millis_of(date)),
        };
    }
}

impl<'t> ParseState<'t> {
    fn new(input: &'t str, start: NaiveDateTime, analyze: bool) -> Self {
        Self {
            input,
            info: DateInfo::default(),
            parsed_pattern: String::new(),
            analyze,
            pm: None,
            start,
        }
    }

    fn apply_digits(&mut self, definition: Definition, digits: &str) -> Option<&'static str> {
        let number: i32 = digits.parse().ok()?;
        let info = &mut self.info;
        match definition {
            Definition::Year4 => info.year = Some(number),
            Definition::YearShort => {
                return Some(match digits.len() {
                    3 => {
                        info.year = Some(number);
                        "yyy"
                    }
                    len => {
                        info.year = Some(pivot_short_year(number, self.start.year()));
                        if len == 1 { "y" } else { "yy" }
                    }
                });
            }
            Definition::Month2 | Definition::Month1 => info.month = Some(number - 1),
            Definition::Day2 | Definition::Day1 => info.day = Some(number),
            Definition::Hour24Pad | Definition::Hour24 => info.hours = Some(number),
            Definition::Hour12Pad | Definition::Hour12 => {
                info.hours = Some(match self.pm {
                    Some(true) => number % 12 + 12,
                    _ => number,
                });
            }
            Definition::Minute2 | Definition::Minute1 => info.minutes = Some(number),
            Definition::Second2 | Definition::Second1 => info.seconds = Some(number),
            Definition::Millis3 | Definition::Millis1 => info.millis = Some(number),
            Definition::MonthLong | Definition::MonthShort | Definition::AmPm => return None,
        }
        Some(definition.canonical())
    }

    /// Complete a lone digit that a two-digit term did not match.
    fn complete_digit(&mut self, definition: Definition) -> Option<&'static str> {
        match (definition, self.input) {
            (Definition::Month2, "0") => {
                let date = self.info.resolve(self.start)?;
                let mut month = date.month0() as i32;
                if month >= 9 {
                    month = 0;
                    self.info.year = Some(self.info.year.unwrap_or(date.year()) + 1);
                }
                self.info.month = Some(month);
            }
            (Definition::Day2, "0") => self.info.day = Some(1),
            (Definition::Hour12Pad, "0") => {
                self.info.hours = Some(if self.pm == Some(true) { 13 } else { 1 });
            }
            (Definition::Minute2, tens @ ("0" | "1" | "2" | "3" | "4" | "5")) => {
                self.info.minutes = Some(tens.parse::<i32>().ok()? * 10);
            }
            _ => return None,
        }
        self.input = "";
        Some(definition.canonical())
    }

    fn apply_month(&mut self, names: &[&'static str; 12], term: &'static str) -> Option<&'static str> {
        let input = self.input;
        let full = names.iter().enumerate().find_map(|(index, name)| {
            if name.is_empty() {
                return None;
            }
            prefix_len_ignore_case(input, name).map(|len| (index, &input[len..]))
        });
        let partial = || {
            names
                .iter()
                .position(|name| prefix_len_ignore_case(name, input).is_some())
                .map(|index| (index, ""))
        };
        let (index, rest) = match full {
            Some(found) => found,
            None if self.analyze => partial()?,
            None => return None,
        };
        self.info.month = Some(index as i32);
        self.input = rest;
        Some(term)
    }

    fn apply_am_pm(&mut self, am: &str, pm: &str) -> Option<&'static str> {
        let input = self.input;
        let (is_pm, rest) = if let Some(len) = prefix_len_ignore_case(input, am) {
            (false, &input[len..])
        } else if let Some(len) = prefix_len_ignore_case(input, pm) {
            (true, &input[len..])
        } else if self.analyze && prefix_len_ignore_case(am, input).is_some() {
            (false, "")
        } else if self.analyze && prefix_len_ignore_case(pm, input).is_some() {
            (true, "")
        } else {
            return None;
        };
        self.pm = Some(is_pm);
        self.info.hours = self
            .info
            .hours
            .map(|hours| if is_pm { hours % 12 + 12 } else { hours % 12 });
        self.input = rest;
        Some("a")
    }
}

/// The accepted definition first, then the rest of its family.
fn alternatives(accepted: Definition) -> impl Iterator<Item = Definition> {
    std::iter::once(accepted).chain(DEFINITIONS.into_iter().filter(move |definition| {
        *definition != accepted && definition.family() == accepted.family()
    }))
}

fn parse_constant(constant: &str, state: &mut ParseState<'_>) -> bool {
    match state.input.strip_prefix(constant) {
        Some(rest) => {
            state.input = rest;
            state.parsed_pattern.push_str(constant);
            true
        }
        None => state.analyze,
    }
}

/// Split a pattern into runs of one repeated character.
fn split_terms(pattern: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut start = 0;
    let mut chars = pattern.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        if chars.peek().is_none_or(|&(_, next)| next != ch) {
            let end = index + ch.len_utf8();
            terms.push(&pattern[start..end]);
            start = end;
        }
    }
    terms
}

/// Byte length of the head of `text` that equals `prefix` ignoring case.
pub(crate) fn prefix_len_ignore_case(text: &str, prefix: &str) -> Option<usize> {
    if prefix.is_empty() {
        return None;
    }
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map_or(text.len(), |(index, _)| index))
}

/// Two-digit years land within 50 years of the start year.
fn pivot_short_year(short: i32, start_year: i32) -> i32 {
    let year = start_year / 100 * 100 + short;
    match year - start_year {
        distance if distance <= -50 => year + 100,
        distance if distance > 50 => year - 100,
        _ => year,
    }
}

fn short_year(year: i32, digits: usize) -> String {
    let text = year.to_string();
    if digits <= 1 {
        return text[text.len().saturating_sub(1)..].to_owned();
    }
    let padded = format!("{text:0>digits$}");
    padded[padded.len() - digits..].to_owned()
}

/// Month index and day may be out of range; they roll over like a calendar
/// would (month 12 is January of the next year, day 0 the last of the
/// previous month).
fn roll_date(year: i32, month0: i32, day: i32) -> Option<NaiveDate> {
    let year = year.checked_add(month0.div_euclid(12))?;
    let first = NaiveDate::from_ymd_opt(year, month0.rem_euclid(12) as u32 + 1, 1)?;
    first.checked_add_signed(TimeDelta::try_days(i64::from(day) - 1)?)
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn millis_of(date: &NaiveDateTime) -> u32 {
    (date.nanosecond() / 1_000_000).min(999)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn de(pattern: &str) -> DateFormat {
        DateFormat::new(Locale::de_ch(), pattern).unwrap()
    }

    fn en(pattern: &str) -> DateFormat {
        DateFormat::new(Locale::en_us(), pattern).unwrap()
    }

    #[test]
    fn splits_runs() {
        assert_eq!(split_terms("dd.MM.yyyy"), vec!["dd", ".", "MM", ".", "yyyy"]);
        assert_eq!(split_terms("h:mm a"), vec!["h", ":", "mm", " ", "a"]);
    }

    #[test]
    fn rejects_empty_and_unsupported() {
        assert_eq!(
            DateFormat::new(Locale::de_ch(), "").unwrap_err(),
            PatternError::Empty
        );
        assert_eq!(
            DateFormat::new(Locale::de_ch(), "EEE dd.MM").unwrap_err(),
            PatternError::Unsupported("EEE".into())
        );
    }

    #[test]
    fn formats_terms() {
        let date = NaiveDate::from_ymd_opt(2017, 5, 3)
            .unwrap()
            .and_hms_milli_opt(14, 7, 9, 42)
            .unwrap();
        assert_eq!(de("dd.MM.yyyy").format(&date, false), "03.05.2017");
        assert_eq!(de("d.M.yy").format(&date, false), "3.5.17");
        assert_eq!(de("HH:mm:ss.SSS").format(&date, false), "14:07:09.042");
        assert_eq!(en("h:mm a").format(&date, false), "2:07 PM");
        assert_eq!(en("MMMM d, yyyy").format(&date, false), "May 3, 2017");
        assert_eq!(de("MMM").format(&date, false), "Mai");
    }

    #[test]
    fn short_year_length_follows_exact_flag() {
        let date = at(2007, 1, 1);
        assert_eq!(de("yyy").format(&date, false), "07");
        assert_eq!(de("yyy").format(&date, true), "007");
        assert_eq!(de("y").format(&date, true), "7");
    }

    #[test]
    fn midnight_and_noon_in_twelve_hour_clock() {
        let midnight = at(2020, 1, 1);
        let noon = midnight.with_hour(12).unwrap();
        assert_eq!(en("hh a").format(&midnight, false), "12 AM");
        assert_eq!(en("hh a").format(&noon, false), "12 PM");
    }

    #[test]
    fn strict_parse() {
        let start = at(2020, 1, 1);
        let format = de("dd.MM.yyyy");
        assert_eq!(format.parse("23.05.2017", start), Some(at(2017, 5, 23)));
        assert_eq!(format.parse("1.5.2017", start), None);
        assert_eq!(format.parse("23.05.2017x", start), None);
        assert_eq!(format.parse("31.02.2017", start), None);
        assert_eq!(format.parse("", start), None);
    }

    #[test]
    fn strict_parse_keeps_start_time() {
        let start = at(2020, 1, 1).with_hour(9).unwrap();
        let date = de("dd.MM.yyyy").parse("02.03.2018", start).unwrap();
        assert_eq!(date.hour(), 9);
    }

    #[test]
    fn analyze_skips_constants() {
        let info = de("dd.MM.yyyy").analyze("020318", at(2020, 6, 15));
        assert!(!info.error);
        assert_eq!(info.predicted, Some(at(2018, 3, 2)));
        assert_eq!(info.parsed_pattern, "ddMMyy");
    }

    #[test]
    fn analyze_records_recognized_terms() {
        let info = de("dd.MM.yyyy").analyze("5.7.", at(2015, 1, 1));
        assert_eq!(info.parsed_pattern, "d.M.yyyy");
        assert_eq!(info.matched_pattern, "d.M.");
        assert_eq!(info.predicted, Some(at(2015, 7, 5)));
    }

    #[test]
    fn analyze_zero_day_is_first() {
        let info = de("dd.MM.yyyy").analyze("0", at(2021, 4, 20));
        assert_eq!(info.predicted, Some(at(2021, 4, 1)));
        assert_eq!(info.parsed_pattern, "dd.MM.yyyy");
    }

    #[test]
    fn analyze_zero_month_rolls_late_months_into_january() {
        let format = de("dd.MM.yyyy");
        let info = format.analyze("05.0", at(2021, 11, 20));
        assert_eq!(info.predicted, Some(at(2022, 1, 5)));
        let info = format.analyze("05.0", at(2021, 3, 20));
        assert_eq!(info.predicted, Some(at(2021, 3, 5)));
    }

    #[test]
    fn analyze_rejects_impossible_input() {
        let format = de("dd.MM.yyyy");
        let start = at(2020, 6, 1);
        for input in ["32", "33", "1...2", "11x", "31.02.2015", "1.3.21015", "20150301", "dummy"] {
            assert!(format.analyze(input, start).error, "{input}");
        }
        for input in ["0", "1", "17", "31", "112", "1.", "1.3.2", "01032015", "010315"] {
            assert!(!format.analyze(input, start).error, "{input}");
        }
    }

    #[test]
    fn day_thirty_one_moves_to_next_month() {
        let info = de("dd.MM.yyyy").analyze("31", at(2021, 4, 10));
        assert_eq!(info.predicted, Some(at(2021, 5, 31)));
    }

    #[test]
    fn day_thirty_in_february_moves_to_march() {
        let info = de("dd.MM.yyyy").analyze("30", at(2021, 2, 10));
        assert_eq!(info.predicted, Some(at(2021, 3, 30)));
        let info = de("dd.MM.yyyy").analyze("29", at(2024, 2, 10));
        assert_eq!(info.predicted, Some(at(2024, 2, 29)));
    }

    #[test]
    fn month_only_clamps_day() {
        let info = de("MM.yyyy").analyze("02", at(2021, 1, 31));
        assert_eq!(info.predicted, Some(at(2021, 2, 28)));
    }

    #[test]
    fn two_digit_years_pivot_around_start() {
        let format = de("dd.MM.yyyy");
        let start = at(2017, 11, 11);
        assert_eq!(format.analyze("11.11.68", start).predicted, Some(at(1968, 11, 11)));
        assert_eq!(format.analyze("11.11.66", start).predicted, Some(at(2066, 11, 11)));
        assert_eq!(format.analyze("11.11.017", start).predicted, Some(at(17, 11, 11)));
    }

    #[test]
    fn analyze_month_names_by_prefix() {
        let format = en("dd MMMM yyyy");
        let info = format.analyze("03 ma", at(2020, 1, 1));
        assert_eq!(info.predicted, Some(at(2020, 3, 3)));
        assert!(format.parse("03 ma 2020", at(2020, 1, 1)).is_none());
        assert_eq!(
            format.parse("03 march 2020", at(2020, 1, 1)),
            Some(at(2020, 3, 3))
        );
    }

    #[test]
    fn analyze_time() {
        let start = at(2020, 1, 1);
        let info = de("HH:mm").analyze("1230", start);
        assert_eq!(info.predicted, Some(start.with_hour(12).unwrap().with_minute(30).unwrap()));
        let info = de("HH:mm").analyze("12:3", start);
        assert_eq!(info.predicted.map(|d| d.minute()), Some(30));
        assert!(de("HH:mm").analyze("25", start).error);
    }

    #[test]
    fn analyze_am_pm() {
        let start = at(2020, 1, 1);
        let info = en("h:mm a").analyze("3:15 p", start);
        assert_eq!(info.predicted.map(|d| d.hour()), Some(15));
        assert_eq!(info.parsed_pattern, "h:mm a");
        let info = en("h:mm a").analyze("12:00 am", start);
        assert_eq!(info.predicted.map(|d| d.hour()), Some(0));
    }

    #[test]
    fn empty_input_is_no_error_and_no_date() {
        let info = de("dd.MM.yyyy").analyze("", at(2020, 1, 1));
        assert!(!info.error);
        assert!(info.predicted.is_none());
    }

    #[test]
    fn case_insensitive_prefix() {
        assert_eq!(prefix_len_ignore_case("MÄRZ 2020", "märz"), Some("MÄRZ".len()));
        assert_eq!(prefix_len_ignore_case("Mai", "mär"), None);
        assert_eq!(prefix_len_ignore_case("x", ""), None);
        assert_eq!(prefix_len_ignore_case("PM", "pm"), Some(2));
        assert_eq!(prefix_len_ignore_case("p", "pm"), None);
    }
}
