//! What a remote peer learns when the field accepts its input.

use chrono::NaiveDateTime;
use fieldcore_core::{AcceptInput, ValuePipeline};
use fieldcore_types::Status;
use serde::Serialize;

use crate::composite::DateTimeBehavior;

/// Properties in the order a peer must apply them. The shape of the field
/// comes first so the peer never regenerates the display text against a
/// stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncProperty {
    HasDate,
    HasTime,
    DisplayText,
    Value,
    ErrorStatus,
}

impl SyncProperty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HasDate => "hasDate",
            Self::HasTime => "hasTime",
            Self::DisplayText => "displayText",
            Self::Value => "value",
            Self::ErrorStatus => "errorStatus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptPayload {
    pub has_date: bool,
    pub has_time: bool,
    pub display_text: String,
    /// Omitted while a parse error is pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_status: Option<Status>,
}

impl AcceptPayload {
    /// Payload for a queued accept notification.
    #[must_use]
    pub fn from_accept(accept: &AcceptInput<NaiveDateTime>, has_date: bool, has_time: bool) -> Self {
        Self::build(
            has_date,
            has_time,
            accept.display_text.clone(),
            accept.value,
            accept.error_status.clone(),
        )
    }

    /// Payload for the current state of `field`.
    #[must_use]
    pub fn capture(field: &ValuePipeline<DateTimeBehavior>) -> Self {
        Self::build(
            field.behavior().has_date(),
            field.behavior().has_time(),
            field.display_text().to_owned(),
            field.value().copied(),
            field.error_status().cloned(),
        )
    }

    fn build(
        has_date: bool,
        has_time: bool,
        display_text: String,
        value: Option<NaiveDateTime>,
        error_status: Option<Status>,
    ) -> Self {
        let parsing_failed = error_status.as_ref().is_some_and(|status| {
            status.leaves().iter().any(|leaf| leaf.kind().is_parsing())
        });
        Self {
            has_date,
            has_time,
            display_text,
            value: value.filter(|_| !parsing_failed),
            error_status,
        }
    }

    /// The properties this payload carries, in send order.
    #[must_use]
    pub fn properties(&self) -> Vec<SyncProperty> {
        let mut properties = vec![
            SyncProperty::HasDate,
            SyncProperty::HasTime,
            SyncProperty::DisplayText,
        ];
        if self.value.is_some() {
            properties.push(SyncProperty::Value);
        }
        if self.error_status.is_some() {
            properties.push(SyncProperty::ErrorStatus);
        }
        properties
    }
}

/// Receives accepted input for a remote peer.
pub trait RemoteSync {
    fn accept_input(&mut self, payload: &AcceptPayload);
}

/// Collects payloads in memory.
impl RemoteSync for Vec<AcceptPayload> {
    fn accept_input(&mut self, payload: &AcceptPayload) {
        self.push(payload.clone());
    }
}
