//! Predicts a complete date or time from a partial fragment.

use std::sync::OnceLock;

use chrono::{NaiveDateTime, TimeDelta};
use regex::Regex;
use tracing::debug;

use crate::format::{DateFormat, prefix_len_ignore_case};

/// A parseable fragment: the proposed date (none for an empty fragment)
/// and the overlay text to show behind the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub date: Option<NaiveDateTime>,
    pub text: String,
}

impl Prediction {
    fn empty() -> Self {
        Self {
            date: None,
            text: String::new(),
        }
    }
}

static RELATIVE_DAYS: OnceLock<Regex> = OnceLock::new();

fn relative_days_regex() -> &'static Regex {
    RELATIVE_DAYS
        .get_or_init(|| Regex::new(r"^([+-])([0-9]*)$").expect("valid relative days regex"))
}

/// `+3` / `-` style day offsets. Missing digits mean one day.
fn relative_days(fragment: &str) -> Option<Option<i64>> {
    let captures = relative_days_regex().captures(fragment)?;
    let digits = captures.get(2).map_or("", |m| m.as_str());
    let days = if digits.is_empty() {
        Some(1)
    } else {
        digits.parse::<i64>().ok()
    };
    let negative = captures.get(1).is_some_and(|m| m.as_str() == "-");
    Some(days.map(|days| if negative { -days } else { days }))
}

/// Predict a date fragment. Relative offsets are applied to `anchor`.
/// `None` means the fragment can never become a valid date.
#[must_use]
pub fn predict_date(format: &DateFormat, fragment: &str, anchor: NaiveDateTime) -> Option<Prediction> {
    if let Some(days) = relative_days(fragment) {
        let date = days
            .and_then(TimeDelta::try_days)
            .and_then(|delta| anchor.checked_add_signed(delta));
        if date.is_none() {
            debug!(fragment, "relative date out of range");
        }
        return date.map(|date| Prediction {
            date: Some(date),
            text: fragment.to_owned(),
        });
    }
    predict(format, fragment, anchor)
}

/// Predict a time fragment.
#[must_use]
pub fn predict_time(format: &DateFormat, fragment: &str, anchor: NaiveDateTime) -> Option<Prediction> {
    predict(format, fragment, anchor)
}

fn predict(format: &DateFormat, fragment: &str, anchor: NaiveDateTime) -> Option<Prediction> {
    let info = format.analyze(fragment, anchor);
    if info.error {
        return None;
    }
    let Some(date) = info.predicted else {
        return Some(Prediction::empty());
    };
    // Unconsumed terms print as configured, consumed ones as typed.
    let shape = DateFormat::new(format.locale(), &info.parsed_pattern).ok()?;
    let text = shape.format(&date, true);
    Some(Prediction {
        date: Some(date),
        text: with_typed_casing(fragment, text),
    })
}

/// Keep the user's casing for the part of `predicted` they already typed.
fn with_typed_casing(fragment: &str, predicted: String) -> String {
    match prefix_len_ignore_case(&predicted, fragment) {
        Some(len) => format!("{fragment}{}", &predicted[len..]),
        None => predicted,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::*;
    use crate::locale::Locale;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn format(pattern: &str) -> DateFormat {
        DateFormat::new(Locale::de_ch(), pattern).unwrap()
    }

    fn text(prediction: Option<Prediction>) -> Option<String> {
        prediction.map(|p| p.text)
    }

    #[test]
    fn zero_predicts_first_of_month() {
        let prediction = predict_date(&format("dd.MM.yyyy"), "0", at(2019, 8, 20)).unwrap();
        assert_eq!(prediction.date, Some(at(2019, 8, 1)));
        insta::assert_snapshot!(prediction.text, @"01.08.2019");
    }

    #[test]
    fn keeps_typed_shape() {
        let dates = format("dd.MM.yyyy");
        let anchor = at(2019, 8, 20);
        insta::assert_snapshot!(text(predict_date(&dates, "1", anchor)).unwrap(), @"1.08.2019");
        insta::assert_snapshot!(text(predict_date(&dates, "5.7", anchor)).unwrap(), @"5.7.2019");
        insta::assert_snapshot!(text(predict_date(&dates, "020318", anchor)).unwrap(), @"020318");
    }

    #[test]
    fn relative_offsets() {
        let dates = format("dd.MM.yyyy");
        let anchor = at(2020, 2, 28);
        let plus = predict_date(&dates, "+", anchor).unwrap();
        assert_eq!(plus.date, Some(at(2020, 2, 29)));
        assert_eq!(plus.text, "+");
        assert_eq!(
            predict_date(&dates, "-7", anchor).unwrap().date,
            Some(at(2020, 2, 21))
        );
        assert!(predict_date(&dates, "+99999999999999999999", anchor).is_none());
    }

    #[test]
    fn empty_fragment_is_valid_without_date() {
        let prediction = predict_date(&format("dd.MM.yyyy"), "", at(2020, 1, 1)).unwrap();
        assert_eq!(prediction, Prediction::empty());
    }

    #[test]
    fn invalid_fragments() {
        let dates = format("dd.MM.yyyy");
        for fragment in ["33", "32", "dummy", "31.02.2015"] {
            assert!(predict_date(&dates, fragment, at(2020, 1, 1)).is_none(), "{fragment}");
        }
    }

    #[test]
    fn typed_casing_wins() {
        let dates = DateFormat::new(Locale::de_ch(), "dd. MMMM yyyy").unwrap();
        let prediction = predict_date(&dates, "3. mä", at(2021, 1, 1)).unwrap();
        insta::assert_snapshot!(prediction.text, @"3. märz 2021");
    }

    #[test]
    fn time_prediction() {
        let times = format("HH:mm");
        let anchor = at(2020, 1, 1);
        let prediction = predict_time(&times, "9", anchor).unwrap();
        assert_eq!(prediction.date, anchor.with_hour(9));
        insta::assert_snapshot!(prediction.text, @"9:00");
        insta::assert_snapshot!(text(predict_time(&times, "12:3", anchor)).unwrap(), @"12:30");
        assert!(predict_time(&times, "+1", anchor).is_none());
    }
}
