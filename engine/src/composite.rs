//! The date/time composite: two sub-fields jointly holding one timestamp.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use fieldcore_core::{FieldBehavior, FieldResult, FormatOutcome, ParseContext, RawValue};
use fieldcore_types::{FieldError, FieldPart, FieldStatus, LeafStatus, PARSE_ERROR_CODE, PartMarkers};

use crate::allowed::AllowedDates;
use crate::clock::{Clock, ceil_to_resolution};
use crate::format::DateFormat;
use crate::prediction::{Prediction, predict_date, predict_time};

pub const INVALID_DATE_MESSAGE: &str = "Invalid date";
pub const DATE_NOT_ALLOWED_MESSAGE: &str = "Date is not allowed";
pub const DEFAULT_TIME_PICKER_RESOLUTION: u32 = 30;
/// Step used when the configured resolution disables the time popup.
pub const FALLBACK_TIME_PICKER_RESOLUTION: u32 = 10;

/// Date of a time-only value that never had a date.
fn day_zero() -> NaiveDate {
    NaiveDate::default()
}

/// One of the two inputs of the composite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubField {
    text: String,
    overlay: Option<String>,
    overlay_visible: bool,
    focused: bool,
}

impl SubField {
    /// Raw text as typed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Predicted completion shown behind the raw text.
    #[must_use]
    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    #[must_use]
    pub fn is_overlay_visible(&self) -> bool {
        self.overlay.is_some() && self.overlay_visible
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// What accepting this sub-field commits: the overlay if present.
    #[must_use]
    pub fn effective_text(&self) -> &str {
        self.overlay.as_deref().unwrap_or(&self.text)
    }
}

/// Field behavior of the date/time composite.
#[derive(Debug)]
pub struct DateTimeBehavior {
    date_format: DateFormat,
    time_format: DateFormat,
    has_date: bool,
    has_time: bool,
    date: SubField,
    time: SubField,
    auto_date: Option<NaiveDateTime>,
    allowed: AllowedDates,
    resolution: u32,
    has_time_popup: bool,
    embedded: bool,
    clock: Arc<dyn Clock>,
}

impl DateTimeBehavior {
    pub fn new(date_format: DateFormat, time_format: DateFormat, clock: Arc<dyn Clock>) -> Self {
        Self {
            date_format,
            time_format,
            has_date: true,
            has_time: false,
            date: SubField::default(),
            time: SubField::default(),
            auto_date: None,
            allowed: AllowedDates::default(),
            resolution: DEFAULT_TIME_PICKER_RESOLUTION,
            has_time_popup: true,
            embedded: false,
            clock,
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[must_use]
    pub fn has_date(&self) -> bool {
        self.has_date
    }

    #[must_use]
    pub fn has_time(&self) -> bool {
        self.has_time
    }

    pub fn set_has_date(&mut self, has_date: bool) {
        self.has_date = has_date;
    }

    pub fn set_has_time(&mut self, has_time: bool) {
        self.has_time = has_time;
    }

    #[must_use]
    pub fn is_active(&self, part: FieldPart) -> bool {
        match part {
            FieldPart::Date => self.has_date,
            FieldPart::Time => self.has_time,
        }
    }

    /// Both parts are shown.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.has_date && self.has_time
    }

    #[must_use]
    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    #[must_use]
    pub fn time_format(&self) -> &DateFormat {
        &self.time_format
    }

    pub fn set_date_format(&mut self, format: DateFormat) {
        self.date_format = format;
    }

    pub fn set_time_format(&mut self, format: DateFormat) {
        self.time_format = format;
    }

    #[must_use]
    pub fn auto_date(&self) -> Option<NaiveDateTime> {
        self.auto_date
    }

    pub fn set_auto_date(&mut self, auto_date: Option<NaiveDateTime>) {
        self.auto_date = auto_date;
    }

    #[must_use]
    pub fn allowed_dates(&self) -> &AllowedDates {
        &self.allowed
    }

    pub fn set_allowed_dates(&mut self, allowed: AllowedDates) {
        self.allowed = allowed;
    }

    #[must_use]
    pub fn time_picker_resolution(&self) -> u32 {
        self.resolution
    }

    #[must_use]
    pub fn has_time_popup(&self) -> bool {
        self.has_time_popup
    }

    /// A resolution below one disables the time popup.
    pub fn set_time_picker_resolution(&mut self, resolution: i32) {
        match u32::try_from(resolution) {
            Ok(resolution) if resolution >= 1 => {
                self.resolution = resolution;
                self.has_time_popup = true;
            }
            _ => {
                self.resolution = FALLBACK_TIME_PICKER_RESOLUTION;
                self.has_time_popup = false;
            }
        }
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn set_embedded(&mut self, embedded: bool) {
        self.embedded = embedded;
    }

    // ------------------------------------------------------------------
    // Sub-fields
    // ------------------------------------------------------------------

    #[must_use]
    pub fn part(&self, part: FieldPart) -> &SubField {
        match part {
            FieldPart::Date => &self.date,
            FieldPart::Time => &self.time,
        }
    }

    fn part_mut(&mut self, part: FieldPart) -> &mut SubField {
        match part {
            FieldPart::Date => &mut self.date,
            FieldPart::Time => &mut self.time,
        }
    }

    /// The host changed the raw text of `part`.
    pub fn set_part_text(&mut self, part: FieldPart, text: impl Into<String>) {
        self.part_mut(part).text = text.into();
    }

    pub fn set_focused(&mut self, part: FieldPart, focused: bool) {
        self.part_mut(part).focused = focused;
    }

    #[must_use]
    pub fn focused_part(&self) -> Option<FieldPart> {
        [FieldPart::Date, FieldPart::Time]
            .into_iter()
            .find(|part| self.part(*part).focused)
    }

    /// Show `text` as the predicted completion of `part`. Visibility is
    /// decided later by the debounce.
    pub fn set_overlay(&mut self, part: FieldPart, text: String) {
        let sub = self.part_mut(part);
        sub.overlay = Some(text);
    }

    pub fn set_overlay_visible(&mut self, part: FieldPart, visible: bool) {
        self.part_mut(part).overlay_visible = visible;
    }

    pub fn remove_overlay(&mut self, part: FieldPart) {
        let sub = self.part_mut(part);
        sub.overlay = None;
        sub.overlay_visible = false;
    }

    pub fn remove_overlays(&mut self) {
        self.remove_overlay(FieldPart::Date);
        self.remove_overlay(FieldPart::Time);
    }

    #[must_use]
    pub fn has_overlay(&self) -> bool {
        self.date.overlay.is_some() || self.time.overlay.is_some()
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    /// Join the part texts. Both parts active: `date + "\n" + time`, but
    /// never a bare separator.
    #[must_use]
    pub fn compose(&self, date_text: &str, time_text: &str) -> String {
        match (self.has_date, self.has_time) {
            (true, true) if date_text.is_empty() && time_text.is_empty() => String::new(),
            (true, true) => format!("{date_text}\n{time_text}"),
            (true, false) => date_text.to_owned(),
            (false, true) => time_text.to_owned(),
            (false, false) => String::new(),
        }
    }

    /// Split a composed text into its date and time parts. Inactive parts
    /// come back empty. Only the first line break separates the parts, so
    /// stray line breaks stay in the text and fail to parse.
    #[must_use]
    pub fn split(&self, text: &str) -> (String, String) {
        let (date, time) = match (self.has_date, self.has_time) {
            (true, true) => text.split_once('\n').unwrap_or((text, "")),
            (true, false) => (text, ""),
            (false, true) => ("", text),
            (false, false) => ("", ""),
        };
        (date.to_owned(), time.to_owned())
    }

    /// Overwrite the active parts from a composed text. Inactive parts keep
    /// their text for when they are switched back on.
    fn assign_parts(&mut self, text: &str) {
        let (date, time) = self.split(text);
        if self.has_date {
            self.date.text = date;
        }
        if self.has_time {
            self.time.text = time;
        }
    }

    // ------------------------------------------------------------------
    // Dates
    // ------------------------------------------------------------------

    /// Seed for pickers and predictions when there is no value: the auto
    /// date, else now (ceiled to the time resolution when a time is shown,
    /// midnight otherwise), snapped onto an allowed date.
    #[must_use]
    pub fn reference_date(&self) -> NaiveDateTime {
        let reference = self.auto_date.unwrap_or_else(|| {
            let now = self.clock.now();
            if self.has_time {
                ceil_to_resolution(now, self.resolution)
            } else {
                now.date().and_time(NaiveTime::MIN)
            }
        });
        if self.allowed.is_empty() {
            reference
        } else {
            self.allowed.snap(reference)
        }
    }

    #[must_use]
    pub fn predict_date(&self, fragment: &str, anchor: NaiveDateTime) -> Option<Prediction> {
        predict_date(&self.date_format, fragment, anchor)
    }

    #[must_use]
    pub fn predict_time(&self, fragment: &str, anchor: NaiveDateTime) -> Option<Prediction> {
        predict_time(&self.time_format, fragment, anchor)
    }

    /// Merge the date of `date` and the time of `time` onto `current` (or
    /// the reference date). `None` if both are absent.
    #[must_use]
    pub fn merge(
        &self,
        date: Option<NaiveDateTime>,
        time: Option<NaiveDateTime>,
        current: Option<NaiveDateTime>,
    ) -> Option<NaiveDateTime> {
        if date.is_none() && time.is_none() {
            return None;
        }
        let mut result = current.unwrap_or_else(|| self.reference_date());
        if let Some(date) = date {
            result = date.date().and_time(result.time());
        }
        if let Some(time) = time {
            result = result.date().and_time(time.time());
        }
        Some(result)
    }

    #[must_use]
    pub fn format_date(&self, value: Option<&NaiveDateTime>) -> String {
        value.map(|value| self.date_format.format(value, false)).unwrap_or_default()
    }

    #[must_use]
    pub fn format_time(&self, value: Option<&NaiveDateTime>) -> String {
        value.map(|value| self.time_format.format(value, false)).unwrap_or_default()
    }

    /// Predict `fragment` for `part` and record the part's validity.
    pub fn predict_part(
        &self,
        part: FieldPart,
        fragment: &str,
        anchor: NaiveDateTime,
        status: &mut FieldStatus,
    ) -> Option<Prediction> {
        let prediction = match part {
            FieldPart::Date => self.predict_date(fragment, anchor),
            FieldPart::Time => self.predict_time(fragment, anchor),
        };
        status.set_part_valid(part, prediction.is_some(), || INVALID_DATE_MESSAGE.to_owned());
        prediction
    }
}

impl FieldBehavior for DateTimeBehavior {
    type Value = NaiveDateTime;

    fn ensure(&self, raw: RawValue<NaiveDateTime>) -> FieldResult<NaiveDateTime> {
        match raw {
            RawValue::Null => Ok(None),
            RawValue::Value(value) => Ok(Some(value)),
            RawValue::Text(text) if text.is_empty() => Ok(None),
            RawValue::Text(text) => parse_model_timestamp(&text)
                .map(Some)
                .map_err(FieldError::other),
        }
    }

    fn validate(
        &self,
        value: Option<NaiveDateTime>,
        prior: Option<&NaiveDateTime>,
    ) -> FieldResult<NaiveDateTime> {
        let Some(value) = value else {
            return Ok(None);
        };
        if !self.embedded && !self.allowed.allows(&value) {
            return Err(FieldError::message(DATE_NOT_ALLOWED_MESSAGE));
        }
        if !self.has_date && prior.is_none() {
            return Ok(Some(day_zero().and_time(value.time())));
        }
        Ok(Some(value))
    }

    fn parse(
        &mut self,
        text: &str,
        ctx: &mut ParseContext<'_, NaiveDateTime>,
    ) -> FieldResult<NaiveDateTime> {
        let (date_text, time_text) = self.split(text);
        ctx.status.remove_parse_errors();
        let anchor = ctx.value.copied().unwrap_or_else(|| self.reference_date());

        let mut failed = false;
        let mut date = None;
        let mut time = None;
        if self.has_date {
            match self.predict_part(FieldPart::Date, &date_text, anchor, ctx.status) {
                Some(prediction) => date = prediction.date,
                None => failed = true,
            }
            self.date.text = date_text;
        }
        if self.has_time {
            match self.predict_part(FieldPart::Time, &time_text, anchor, ctx.status) {
                Some(prediction) => time = prediction.date,
                None => failed = true,
            }
            self.time.text = time_text;
        }
        *ctx.display_text = self.compose(&self.date.text, &self.time.text);

        if failed {
            return Err(FieldError::PredictionFailed);
        }
        Ok(self.merge(date, time, ctx.value.copied()))
    }

    /// Inactive parts keep tracking the value so they show the right text
    /// once switched back on.
    fn format(&mut self, value: Option<&NaiveDateTime>) -> FormatOutcome {
        let date = self.format_date(value);
        let time = self.format_time(value);
        if !self.has_date {
            self.date.text.clone_from(&date);
        }
        if !self.has_time {
            self.time.text.clone_from(&time);
        }
        FormatOutcome::Ready(self.compose(&date, &time))
    }

    fn read_display_text(&self) -> String {
        self.compose(self.date.effective_text(), self.time.effective_text())
    }

    fn render_display_text(&mut self, text: &str) {
        self.assign_parts(text);
        self.remove_overlays();
    }

    fn clear_text(&mut self, status: &mut FieldStatus) {
        self.remove_overlays();
        if self.has_date && !self.time.focused {
            self.date.text.clear();
            status.set_part_valid(FieldPart::Date, true, String::new);
        }
        if self.has_time && !self.date.focused {
            self.time.text.clear();
            status.set_part_valid(FieldPart::Time, true, String::new);
        }
    }

    fn accept_after_clear(&self) -> bool {
        !self.is_compound() || (!self.date.focused && !self.time.focused)
    }

    fn reparse_unchanged_text(&self) -> bool {
        true
    }

    fn invalid_value_message(&self, _text: &str) -> String {
        INVALID_DATE_MESSAGE.to_owned()
    }

    fn decorate_invalid_status(&self, status: LeafStatus) -> LeafStatus {
        status
            .with_code(PARSE_ERROR_CODE)
            .with_markers(PartMarkers::BOTH)
    }
}

/// Model timestamps as text: `2017-05-23 12:30:00.000`, ISO `T` form, or a
/// plain date.
fn parse_model_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN)))
}
