//! Date field behavior across the pipeline, engine and status crates.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use fieldcore_engine::{
    AllowedDates, DateField, DateFieldOptions, FieldEvent, FieldPart, FixedClock,
    INVALID_DATE_MESSAGE, Locale, RawValue,
};
use fieldcore_types::StatusKind;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn date_time_field(value: Option<NaiveDateTime>) -> DateField {
    DateField::new(DateFieldOptions {
        has_time: true,
        value,
        clock: Arc::new(FixedClock(at(2021, 6, 15, 10, 7))),
        ..DateFieldOptions::default()
    })
    .unwrap()
}

fn value_changes(events: &[FieldEvent<NaiveDateTime>]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, FieldEvent::ValueChanged { .. }))
        .count()
}

#[test]
fn setting_equal_value_twice_notifies_once() {
    let mut field = date_time_field(None);
    field.set_value(Some(at(2017, 5, 23, 12, 30)));
    field.set_value(Some(at(2017, 5, 23, 12, 30)));
    assert_eq!(value_changes(&field.take_events()), 1);
}

#[test]
fn displayed_text_parses_back_to_same_instant() {
    let mut field = date_time_field(Some(at(2017, 5, 23, 12, 30)));
    assert_eq!(field.display_text(), "23.05.2017\n12:30");
    field.take_events();

    let text = field.display_text().to_owned();
    field.pipeline_mut().parse_and_set_value(&text);
    assert_eq!(field.value(), Some(at(2017, 5, 23, 12, 30)));
    assert!(field.error_status().is_none());
    assert_eq!(value_changes(&field.take_events()), 0);
}

#[test]
fn null_and_missing_values_clear_the_text() {
    let mut field = date_time_field(Some(at(2017, 5, 23, 12, 30)));
    field.set_raw_value(RawValue::Null);
    assert!(field.value().is_none());
    assert_eq!(field.display_text(), "");

    field.set_value(Some(at(2017, 5, 23, 12, 30)));
    field.set_value(None);
    assert!(field.value().is_none());
    assert_eq!(field.display_text(), "");
}

#[test]
fn model_text_is_coerced() {
    let mut field = date_time_field(None);
    field.set_raw_value(RawValue::Text("2014-10-01 05:00:00.000".to_owned()));
    assert_eq!(field.value(), Some(at(2014, 10, 1, 5, 0)));
    assert_eq!(field.display_text(), "01.10.2014\n05:00");
}

#[test]
fn parts_compose_and_split() {
    let field = date_time_field(None);
    let behavior = field.behavior();
    let composed = behavior.compose("01.10.2014", "05:00");
    assert_eq!(composed, "01.10.2014\n05:00");
    assert_eq!(
        behavior.split(&composed),
        ("01.10.2014".to_owned(), "05:00".to_owned())
    );
    assert_eq!(behavior.compose("", ""), "");
}

#[test]
fn typed_parts_accept_into_one_value() {
    let mut field = date_time_field(None);
    field.focus(FieldPart::Date);
    field.input(FieldPart::Date, "01.10.2014");
    field.focus(FieldPart::Time);
    field.input(FieldPart::Time, "05:00");
    field.blur(FieldPart::Time);
    assert_eq!(field.value(), Some(at(2014, 10, 1, 5, 0)));
    assert_eq!(field.display_text(), "01.10.2014\n05:00");
}

#[test]
fn reference_snaps_to_allowed_dates() {
    let mut field = date_time_field(None);
    field.set_auto_date(Some(at(2016, 4, 15, 0, 0)));

    field.set_allowed_dates(AllowedDates::new([
        day(2016, 7, 14),
        day(2016, 4, 16),
        day(2016, 4, 17),
    ]));
    assert_eq!(field.behavior().reference_date().date(), day(2016, 4, 16));

    field.set_allowed_dates(AllowedDates::new([
        day(2016, 2, 14),
        day(2016, 3, 16),
        day(2016, 4, 3),
    ]));
    assert_eq!(field.behavior().reference_date().date(), day(2016, 4, 3));
}

#[test]
fn value_outside_allowed_dates_is_rejected() {
    let mut field = date_time_field(Some(at(2016, 4, 16, 8, 0)));
    field.set_allowed_dates(AllowedDates::new([day(2016, 4, 17)]));
    let leaf = field.status().leaves()[0].clone();
    assert_eq!(leaf.kind(), StatusKind::Validation);
    assert_eq!(field.value(), Some(at(2016, 4, 16, 8, 0)));
}

#[test]
fn zero_predicts_first_of_reference_month() {
    let mut field = date_time_field(None);
    field.focus(FieldPart::Date);
    field.input(FieldPart::Date, "0");
    insta::assert_snapshot!(field.part(FieldPart::Date).overlay().unwrap(), @"01.06.2021");
}

#[test]
fn impossible_day_keeps_value_and_marks_date() {
    let mut field = date_time_field(Some(at(2017, 5, 23, 12, 30)));
    field.focus(FieldPart::Date);
    field.input(FieldPart::Date, "33");
    field.blur(FieldPart::Date);

    assert_eq!(field.value(), Some(at(2017, 5, 23, 12, 30)));
    let leaf = field.status().leaves()[0].clone();
    assert_eq!(leaf.message(), INVALID_DATE_MESSAGE);
    assert!(leaf.markers().is_invalid(FieldPart::Date));
    assert!(!field.is_part_valid(FieldPart::Date));
    assert!(field.is_part_valid(FieldPart::Time));
}

#[test]
fn has_date_toggle_restores_date_component() {
    let mut field = date_time_field(Some(at(2017, 5, 1, 5, 50)));
    field.set_has_date(false);
    field.focus(FieldPart::Time);
    field.input(FieldPart::Time, "07:15");
    field.blur(FieldPart::Time);
    field.set_has_date(true);

    assert_eq!(field.value(), Some(at(2017, 5, 1, 7, 15)));
    assert_eq!(field.part(FieldPart::Date).text(), "01.05.2017");
}

#[test]
fn us_locale_uses_twelve_hour_clock() {
    let field = DateField::new(DateFieldOptions {
        locale: Locale::en_us(),
        has_time: true,
        value: Some(at(2017, 5, 23, 13, 30)),
        ..DateFieldOptions::default()
    })
    .unwrap();
    assert_eq!(field.display_text(), "05/23/2017\n1:30 PM");
}

#[test]
fn bad_pattern_is_reported() {
    let result = DateField::new(DateFieldOptions {
        date_pattern: Some(String::new()),
        ..DateFieldOptions::default()
    });
    assert!(result.is_err());
}
