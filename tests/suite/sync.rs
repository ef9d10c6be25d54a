//! Accept payloads a remote peer receives from a date field.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use fieldcore_engine::{
    AcceptPayload, DateField, DateFieldOptions, FieldPart, FixedClock, SyncProperty,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn field(value: Option<NaiveDateTime>) -> DateField {
    DateField::new(DateFieldOptions {
        has_time: true,
        value,
        clock: Arc::new(FixedClock(at(2021, 6, 15, 10, 7))),
        ..DateFieldOptions::default()
    })
    .unwrap()
}

#[test]
fn typed_date_syncs_on_blur() {
    let mut field = field(None);
    field.focus(FieldPart::Date);
    field.input(FieldPart::Date, "23.05.2017");
    field.blur(FieldPart::Date);

    let mut sent: Vec<AcceptPayload> = Vec::new();
    field.sync(&mut sent);
    assert_eq!(sent.len(), 1);
    insta::assert_snapshot!(
        serde_json::to_string(&sent[0]).unwrap(),
        @r#"{"hasDate":true,"hasTime":true,"displayText":"23.05.2017\n10:30","value":"2017-05-23T10:30:00"}"#
    );
}

#[test]
fn invalid_input_syncs_status_without_value() {
    let mut field = field(Some(at(2017, 5, 23, 12, 30)));
    field.focus(FieldPart::Time);
    field.input(FieldPart::Time, "99:99");
    field.blur(FieldPart::Time);

    let mut sent: Vec<AcceptPayload> = Vec::new();
    field.sync(&mut sent);
    let payload = sent.last().expect("accept payload");
    assert!(payload.value.is_none());
    assert_eq!(
        payload.properties(),
        [
            SyncProperty::HasDate,
            SyncProperty::HasTime,
            SyncProperty::DisplayText,
            SyncProperty::ErrorStatus
        ]
    );
    let json = serde_json::to_value(payload).unwrap();
    assert_eq!(json["displayText"], "23.05.2017\n99:99");
    assert_eq!(json["errorStatus"]["code"], -1);
}

#[test]
fn programmatic_values_are_not_synced() {
    let mut field = field(None);
    field.set_value(Some(at(2017, 5, 23, 12, 30)));
    let mut sent: Vec<AcceptPayload> = Vec::new();
    field.sync(&mut sent);
    assert!(sent.is_empty());
    assert_eq!(field.payload().value, Some(at(2017, 5, 23, 12, 30)));
}
