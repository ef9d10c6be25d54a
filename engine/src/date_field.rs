//! The date/time field as a host drives it.
//!
//! [`DateField`] owns the value pipeline of the composite, the picker
//! popups and the overlay debounce. The host forwards focus changes, raw
//! text edits and navigation keys per sub-field and renders whatever the
//! field reports back.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use fieldcore_core::{FieldEvent, FieldInit, RawValue, ValuePipeline};
use fieldcore_types::{FieldPart, FieldStatus, Key, KeyPress, Modifiers, Status};
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

use crate::allowed::AllowedDates;
use crate::clock::{Clock, SystemClock};
use crate::composite::{
    DEFAULT_TIME_PICKER_RESOLUTION, DateTimeBehavior, INVALID_DATE_MESSAGE, SubField,
};
use crate::format::{DateFormat, PatternError};
use crate::locale::Locale;
use crate::picker::{HeadlessPickers, PickerController, PickerFactory, PickerShift, PickerState};
use crate::sync::{AcceptPayload, RemoteSync};

/// Delay before a fresh overlay is reconciled against the input's scroll
/// position.
pub const OVERLAY_DEBOUNCE: Duration = Duration::from_millis(50);

/// Host query used when the overlay debounce expires.
pub trait ScrollCheck {
    /// The host input of `part` is scrolled horizontally.
    fn is_scrolled(&self, part: FieldPart) -> bool;
}

/// Check for hosts without horizontal scrolling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverScrolled;

impl ScrollCheck for NeverScrolled {
    fn is_scrolled(&self, _part: FieldPart) -> bool {
        false
    }
}

/// What the host should do with a key after the field saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Run the host's default handling.
    Default,
    /// Consumed. The host suppresses the event.
    Handled,
    /// Consumed. Focus moved to the given sub-field.
    MoveFocus(FieldPart),
}

/// Where a pointer press landed that is about to take focus away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// A sub-field or one of its icons.
    Part(FieldPart),
    Picker,
    Status,
    Outside,
}

#[derive(Debug, Clone)]
pub struct DateFieldOptions {
    pub locale: Locale,
    /// Defaults to the locale's date pattern.
    pub date_pattern: Option<String>,
    /// Defaults to the locale's time pattern.
    pub time_pattern: Option<String>,
    pub has_date: bool,
    pub has_time: bool,
    /// Minutes per time picker step. Below one disables the time popup.
    pub time_picker_resolution: i32,
    pub auto_date: Option<NaiveDateTime>,
    pub allowed_dates: Vec<NaiveDate>,
    pub embedded: bool,
    pub value: Option<NaiveDateTime>,
    pub clock: Arc<dyn Clock>,
    pub pickers: Arc<dyn PickerFactory>,
}

impl Default for DateFieldOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            date_pattern: None,
            time_pattern: None,
            has_date: true,
            has_time: false,
            time_picker_resolution: DEFAULT_TIME_PICKER_RESOLUTION as i32,
            auto_date: None,
            allowed_dates: Vec::new(),
            embedded: false,
            value: None,
            clock: Arc::new(SystemClock),
            pickers: Arc::new(HeadlessPickers),
        }
    }
}

#[derive(Debug, Default)]
struct OverlayDebounce {
    date: Option<Duration>,
    time: Option<Duration>,
}

impl OverlayDebounce {
    fn slot(&mut self, part: FieldPart) -> &mut Option<Duration> {
        match part {
            FieldPart::Date => &mut self.date,
            FieldPart::Time => &mut self.time,
        }
    }

    fn arm(&mut self, part: FieldPart) {
        *self.slot(part) = Some(OVERLAY_DEBOUNCE);
    }

    fn cancel_all(&mut self) {
        self.date = None;
        self.time = None;
    }

    fn is_armed(&self) -> bool {
        self.date.is_some() || self.time.is_some()
    }

    /// Parts whose delay ran out.
    fn advance(&mut self, elapsed: Duration) -> Vec<FieldPart> {
        let mut expired = Vec::new();
        for part in [FieldPart::Date, FieldPart::Time] {
            let slot = self.slot(part);
            let Some(remaining) = *slot else {
                continue;
            };
            match remaining.checked_sub(elapsed) {
                Some(rest) if !rest.is_zero() => *slot = Some(rest),
                _ => {
                    *slot = None;
                    expired.push(part);
                }
            }
        }
        expired
    }
}

/// A date field, a time field, or both side by side.
#[derive(Debug)]
pub struct DateField {
    field: ValuePipeline<DateTimeBehavior>,
    pickers: PickerController,
    debounce: OverlayDebounce,
    /// Time being stepped with the arrow keys when there is no time popup.
    temp_time: Option<NaiveDateTime>,
    destroyed: bool,
}

impl DateField {
    pub fn new(options: DateFieldOptions) -> Result<Self, PatternError> {
        let locale = options.locale;
        let date_format = DateFormat::new(
            locale,
            options.date_pattern.as_deref().unwrap_or(locale.date_pattern()),
        )?;
        let time_format = DateFormat::new(
            locale,
            options.time_pattern.as_deref().unwrap_or(locale.time_pattern()),
        )?;

        let mut behavior = DateTimeBehavior::new(date_format, time_format, options.clock);
        behavior.set_has_date(options.has_date);
        behavior.set_has_time(options.has_time);
        behavior.set_time_picker_resolution(options.time_picker_resolution);
        behavior.set_auto_date(options.auto_date);
        behavior.set_allowed_dates(AllowedDates::new(options.allowed_dates));
        behavior.set_embedded(options.embedded);
        let resolution = behavior.time_picker_resolution();

        let init = options.value.map_or_else(FieldInit::default, FieldInit::value);
        Ok(Self {
            field: ValuePipeline::new(behavior, init),
            pickers: PickerController::new(options.pickers, resolution),
            debounce: OverlayDebounce::default(),
            temp_time: None,
            destroyed: false,
        })
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    #[must_use]
    pub fn value(&self) -> Option<NaiveDateTime> {
        self.field.value().copied()
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        self.field.display_text()
    }

    #[must_use]
    pub fn status(&self) -> &FieldStatus {
        self.field.status()
    }

    #[must_use]
    pub fn error_status(&self) -> Option<&Status> {
        self.field.error_status()
    }

    #[must_use]
    pub fn behavior(&self) -> &DateTimeBehavior {
        self.field.behavior()
    }

    #[must_use]
    pub fn part(&self, part: FieldPart) -> &SubField {
        self.field.behavior().part(part)
    }

    #[must_use]
    pub fn is_part_valid(&self, part: FieldPart) -> bool {
        self.field.status().is_part_valid(part)
    }

    #[must_use]
    pub fn picker_state(&self, part: FieldPart) -> PickerState {
        self.pickers.state(part)
    }

    #[must_use]
    pub fn temp_time(&self) -> Option<NaiveDateTime> {
        self.temp_time
    }

    #[must_use]
    pub fn is_overlay_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The underlying pipeline, for validators and dirty-tracking.
    #[must_use]
    pub fn pipeline(&self) -> &ValuePipeline<DateTimeBehavior> {
        &self.field
    }

    pub fn pipeline_mut(&mut self) -> &mut ValuePipeline<DateTimeBehavior> {
        &mut self.field
    }

    pub fn take_events(&mut self) -> Vec<FieldEvent<NaiveDateTime>> {
        self.field.take_events()
    }

    /// What a remote peer receives for the current state.
    #[must_use]
    pub fn payload(&self) -> AcceptPayload {
        AcceptPayload::capture(&self.field)
    }

    /// Drain the events, forwarding every accept to `sink`.
    pub fn sync(&mut self, sink: &mut dyn RemoteSync) -> Vec<FieldEvent<NaiveDateTime>> {
        let events = self.field.take_events();
        let behavior = self.field.behavior();
        for event in &events {
            if let FieldEvent::AcceptInput(accept) = event {
                sink.accept_input(&AcceptPayload::from_accept(
                    accept,
                    behavior.has_date(),
                    behavior.has_time(),
                ));
            }
        }
        events
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, value: Option<NaiveDateTime>) {
        self.field.set_value(value);
    }

    pub fn set_raw_value(&mut self, raw: RawValue<NaiveDateTime>) {
        self.field.set_raw_value(raw);
    }

    pub fn set_has_date(&mut self, has_date: bool) {
        self.set_part_active(FieldPart::Date, has_date);
    }

    pub fn set_has_time(&mut self, has_time: bool) {
        self.set_part_active(FieldPart::Time, has_time);
    }

    fn set_part_active(&mut self, part: FieldPart, active: bool) {
        if self.field.behavior().is_active(part) == active {
            return;
        }
        let behavior = self.field.behavior_mut();
        match part {
            FieldPart::Date => behavior.set_has_date(active),
            FieldPart::Time => behavior.set_has_time(active),
        }
        if !active {
            behavior.set_focused(part, false);
            self.pickers.close(part);
        }
        let behavior = self.field.behavior();
        let text = behavior.compose(
            behavior.part(FieldPart::Date).text(),
            behavior.part(FieldPart::Time).text(),
        );
        self.field.set_display_text(text);
    }

    pub fn set_time_picker_resolution(&mut self, resolution: i32) {
        let behavior = self.field.behavior_mut();
        behavior.set_time_picker_resolution(resolution);
        let (resolution, has_popup) = (behavior.time_picker_resolution(), behavior.has_time_popup());
        self.pickers.set_resolution(resolution);
        if !has_popup {
            self.pickers.close(FieldPart::Time);
        }
    }

    pub fn set_auto_date(&mut self, auto_date: Option<NaiveDateTime>) {
        self.field.behavior_mut().set_auto_date(auto_date);
    }

    /// Replace the allowed dates and validate the value against them.
    pub fn set_allowed_dates(&mut self, allowed: AllowedDates) {
        self.field.behavior_mut().set_allowed_dates(allowed);
        self.field.validate();
    }

    pub fn set_embedded(&mut self, embedded: bool) {
        self.field.behavior_mut().set_embedded(embedded);
    }

    pub fn set_date_pattern(&mut self, pattern: &str) -> Result<(), PatternError> {
        let locale = self.field.behavior().date_format().locale();
        let format = DateFormat::new(locale, pattern)?;
        self.field.behavior_mut().set_date_format(format);
        self.field.update_display_text(None);
        Ok(())
    }

    pub fn set_time_pattern(&mut self, pattern: &str) -> Result<(), PatternError> {
        let locale = self.field.behavior().time_format().locale();
        let format = DateFormat::new(locale, pattern)?;
        self.field.behavior_mut().set_time_format(format);
        self.field.update_display_text(None);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Host input
    // ------------------------------------------------------------------

    fn accepts_input(&self, part: FieldPart) -> bool {
        !self.destroyed && self.field.behavior().is_active(part)
    }

    /// `part` gained focus. A focused sibling loses it first.
    pub fn focus(&mut self, part: FieldPart) {
        if !self.accepts_input(part) {
            return;
        }
        if self.part(part.other()).is_focused() {
            self.blur(part.other());
        }
        self.field.behavior_mut().set_focused(part, true);
    }

    /// The raw text of `part` changed.
    pub fn input(&mut self, part: FieldPart, text: &str) {
        if !self.accepts_input(part) {
            return;
        }
        self.field.behavior_mut().set_part_text(part, text);
        if !self.part(part).is_focused() {
            return;
        }

        let anchor = self.value().unwrap_or_else(|| self.reference_date());
        let prediction = {
            let (behavior, status) = self.field.parts_mut();
            status.remove_parse_errors();
            behavior.predict_part(part, text, anchor, status)
        };
        match prediction {
            Some(prediction) => {
                trace!(%part, overlay = %prediction.text, "predicted");
                self.field.behavior_mut().set_overlay(part, prediction.text);
                self.open_picker(part, prediction.date);
                self.debounce.arm(part);
            }
            None => {
                debug!(%part, text, "input cannot become a valid date");
                if part == FieldPart::Time {
                    self.temp_time = None;
                }
                self.remove_overlays();
            }
        }
    }

    /// Advance the overlay debounce. Expired overlays become visible unless
    /// the host input is scrolled.
    pub fn tick(&mut self, elapsed: Duration, scroll: &dyn ScrollCheck) {
        for part in self.debounce.advance(elapsed) {
            if self.part(part).overlay().is_none() {
                continue;
            }
            let visible = !scroll.is_scrolled(part);
            trace!(%part, visible, "overlay reconciled");
            self.field.behavior_mut().set_overlay_visible(part, visible);
        }
    }

    pub fn key(&mut self, part: FieldPart, press: KeyPress) -> KeyOutcome {
        if !self.accepts_input(part) {
            return KeyOutcome::Default;
        }
        match press.key {
            Key::Tab => self.tab(part, press.modifiers),
            Key::Enter => self.enter(part),
            Key::Escape => self.escape(),
            Key::Right if press.caret_at_end => {
                self.complete_next_grapheme(part);
                KeyOutcome::Default
            }
            Key::Up | Key::Down | Key::PageUp | Key::PageDown => match part {
                FieldPart::Date => self.date_navigation(press),
                FieldPart::Time => self.time_navigation(press),
            },
            _ => KeyOutcome::Default,
        }
    }

    /// `part` lost focus: close its popup and accept it.
    pub fn blur(&mut self, part: FieldPart) {
        if self.destroyed || !self.part(part).is_focused() {
            return;
        }
        self.field.behavior_mut().set_focused(part, false);
        if part == FieldPart::Time {
            self.temp_time = None;
        }
        if self.field.behavior().is_embedded() {
            return;
        }
        self.pickers.close(part);
        self.accept(part);
        self.remove_overlays();
    }

    /// A pointer press is about to move focus. Presses outside the field
    /// accept the focused part.
    pub fn about_to_blur_by_pointer(&mut self, target: PointerTarget) {
        if self.destroyed || target != PointerTarget::Outside {
            return;
        }
        if self.part(FieldPart::Date).is_focused() {
            self.accept_date();
        } else if self.part(FieldPart::Time).is_focused() {
            self.accept_time();
        }
    }

    /// Accept the date part. An empty date empties the time part too,
    /// unless a parse error is pending.
    pub fn accept_date(&mut self) {
        self.accept(FieldPart::Date);
    }

    /// Accept the time part. An empty time empties the date part too,
    /// unless a parse error is pending.
    pub fn accept_time(&mut self) {
        self.accept(FieldPart::Time);
    }

    fn accept(&mut self, part: FieldPart) {
        let other = part.other();
        let behavior = self.field.behavior();
        if behavior.is_active(other)
            && behavior.part(part).text().is_empty()
            && !self.field.status().has_parsing_failure()
        {
            self.field.behavior_mut().set_part_text(other, "");
        }
        self.field.accept_input(false);
    }

    /// Erase both parts. Accepts right away unless a part is focused.
    pub fn clear(&mut self) {
        if self.destroyed {
            return;
        }
        self.debounce.cancel_all();
        self.field.clear();
    }

    /// The clear icon of the date part.
    pub fn clear_date_part(&mut self) {
        self.clear_part(FieldPart::Date);
    }

    /// The clear icon of the time part.
    pub fn clear_time_part(&mut self) {
        self.clear_part(FieldPart::Time);
    }

    fn clear_part(&mut self, part: FieldPart) {
        if !self.accepts_input(part) {
            return;
        }
        self.focus(part);
        self.clear();
        let value = self.value();
        self.open_picker(part, value);
    }

    /// The picker icon of `part`.
    pub fn toggle_picker(&mut self, part: FieldPart) {
        if !self.accepts_input(part) {
            return;
        }
        if self.pickers.is_open(part) {
            self.dismiss_picker(part);
        } else {
            let value = self.value();
            self.open_picker(part, value);
        }
    }

    /// A day was picked. Keeps the time of the current value.
    pub fn pick_date(&mut self, date: NaiveDateTime) {
        let value = self.field.behavior().merge(Some(date), None, self.value());
        self.set_picked(value);
    }

    /// A time was picked. Keeps the date of the current value.
    pub fn pick_time(&mut self, time: NaiveDateTime) {
        let value = self.field.behavior().merge(None, Some(time), self.value());
        self.set_picked(value);
    }

    /// Pick whatever the open picker of `part` shows. `false` if it shows
    /// nothing.
    pub fn pick_selected(&mut self, part: FieldPart) -> bool {
        let Some(selected) = self.pickers.get(part).and_then(|picker| picker.selected()) else {
            return false;
        };
        match part {
            FieldPart::Date => self.pick_date(selected),
            FieldPart::Time => self.pick_time(selected),
        }
        true
    }

    fn set_picked(&mut self, value: Option<NaiveDateTime>) {
        self.set_part_valid(FieldPart::Date, true);
        self.set_part_valid(FieldPart::Time, true);
        self.field.set_value(value);
        self.field.trigger_accept_input(false);
        self.pickers.close_all();
    }

    /// Tear down popups, overlays and pending timers. Further input is
    /// ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        debug!("destroying date field");
        self.pickers.close_all();
        self.remove_overlays();
        self.temp_time = None;
        self.destroyed = true;
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    /// Compound fields move between their own parts before yielding focus.
    fn tab(&mut self, part: FieldPart, modifiers: Modifiers) -> KeyOutcome {
        if !self.field.behavior().is_compound() {
            return KeyOutcome::Default;
        }
        let target = match part {
            FieldPart::Date if modifiers.count() == 0 => FieldPart::Time,
            FieldPart::Time if modifiers.shift && modifiers.count() == 1 => FieldPart::Date,
            _ => return KeyOutcome::Default,
        };
        self.focus(target);
        KeyOutcome::MoveFocus(target)
    }

    fn enter(&mut self, part: FieldPart) -> KeyOutcome {
        if !self.pickers.is_open(part) && !self.field.behavior().has_overlay() {
            return KeyOutcome::Default;
        }
        if part == FieldPart::Time {
            self.temp_time = None;
        }
        self.accept(part);
        self.pickers.close_all();
        KeyOutcome::Handled
    }

    fn escape(&mut self) -> KeyOutcome {
        if !self.pickers.is_open(FieldPart::Date) && !self.pickers.is_open(FieldPart::Time) {
            return KeyOutcome::Default;
        }
        self.dismiss_picker(FieldPart::Date);
        self.dismiss_picker(FieldPart::Time);
        // Drop the unaccepted edit along with the popup.
        self.field.status_mut().remove_parse_errors();
        self.field.update_display_text(None);
        KeyOutcome::Handled
    }

    /// Close the popup of `part` without accepting. The prediction goes
    /// with it.
    fn dismiss_picker(&mut self, part: FieldPart) {
        self.pickers.close(part);
        self.remove_overlays();
        if part == FieldPart::Time {
            self.temp_time = None;
        }
    }

    /// Copy the next grapheme of the overlay into the raw text.
    fn complete_next_grapheme(&mut self, part: FieldPart) {
        let sub = self.part(part);
        let Some(overlay) = sub.overlay().filter(|overlay| !overlay.is_empty()) else {
            return;
        };
        let typed = sub.text().graphemes(true).count();
        let next: String = overlay.graphemes(true).take(typed + 1).collect();
        self.field.behavior_mut().set_part_text(part, next);
    }

    fn date_navigation(&mut self, press: KeyPress) -> KeyOutcome {
        let modifiers = press.modifiers;
        let delta = if matches!(press.key, Key::Up | Key::PageUp) { -1 } else { 1 };
        let shift = if matches!(press.key, Key::PageUp | Key::PageDown) {
            PickerShift::months(delta)
        } else if modifiers.ctrl_or_meta() && modifiers.count() == 1 {
            PickerShift::years(delta)
        } else if modifiers.shift && modifiers.count() == 1 {
            PickerShift::months(delta)
        } else if modifiers.count() == 0 {
            PickerShift::days(delta)
        } else {
            return KeyOutcome::Handled;
        };

        let text = self.part(FieldPart::Date).text().to_owned();
        let mut start = self.value().unwrap_or_else(|| self.reference_date());
        if !text.is_empty() && !self.is_part_valid(FieldPart::Date) {
            // Parseable text that failed validation still seeds the picker.
            if let Some(parsed) = self.field.behavior().date_format().parse(&text, start) {
                start = parsed;
                self.set_part_valid(FieldPart::Date, true);
            }
        }
        if text.is_empty() || !self.is_part_valid(FieldPart::Date) {
            let reference = self.reference_date();
            let seed = if self.field.behavior().has_time() {
                let time = self.value().unwrap_or(reference).time();
                reference.date().and_time(time)
            } else {
                reference
            };
            self.seed(FieldPart::Date, seed);
            return KeyOutcome::Handled;
        }
        self.shift_picker(FieldPart::Date, start, shift);
        KeyOutcome::Handled
    }

    fn time_navigation(&mut self, press: KeyPress) -> KeyOutcome {
        let delta = match press.key {
            Key::Up => -1,
            Key::Down => 1,
            _ => return KeyOutcome::Default,
        };
        let modifiers = press.modifiers;
        let (hours, units, seconds) = if modifiers.ctrl_or_meta() && modifiers.count() == 1 {
            (0, 0, delta)
        } else if modifiers.shift && modifiers.count() == 1 {
            (delta, 0, 0)
        } else if modifiers.count() == 0 {
            (0, delta, 0)
        } else {
            return KeyOutcome::Handled;
        };

        let text = self.part(FieldPart::Time).text().to_owned();
        if !self.field.behavior().has_time_popup() {
            self.step_temp_time(&text, hours, units, seconds);
            return KeyOutcome::Handled;
        }
        if text.is_empty() || !self.is_part_valid(FieldPart::Time) {
            let reference = self.reference_date();
            self.seed(FieldPart::Time, reference);
            return KeyOutcome::Handled;
        }
        let start = self.value().unwrap_or_else(|| self.reference_date());
        self.shift_picker(
            FieldPart::Time,
            start,
            PickerShift::Time {
                hours,
                units,
                seconds,
            },
        );
        KeyOutcome::Handled
    }

    /// First navigation key on an empty or invalid part: open the picker at
    /// `seed` without shifting.
    fn seed(&mut self, part: FieldPart, seed: NaiveDateTime) {
        trace!(%part, %seed, "seeding picker");
        self.open_picker(part, Some(seed));
        self.field.update_display_text(Some(seed));
        self.set_part_valid(part, true);
    }

    fn shift_picker(&mut self, part: FieldPart, start: NaiveDateTime, shift: PickerShift) {
        if !self.pickers.is_open(part) {
            self.open_picker(part, Some(start));
        }
        let Some(picker) = self.pickers.get_mut(part) else {
            return;
        };
        picker.shift(shift);
        if let Some(selected) = picker.selected() {
            self.field.update_display_text(Some(selected));
        }
    }

    fn step_temp_time(&mut self, text: &str, hours: i32, units: i32, seconds: i32) {
        let reference = self.reference_date();
        let mut shift = true;
        let mut time = match self.temp_time {
            Some(time) => time,
            None => {
                let anchor = self.value().unwrap_or(reference);
                let prediction = {
                    let (behavior, status) = self.field.parts_mut();
                    behavior.predict_part(FieldPart::Time, text, anchor, status)
                };
                prediction.and_then(|prediction| prediction.date).unwrap_or_else(|| {
                    shift = false;
                    reference
                })
            }
        };
        if shift {
            let minutes = i64::from(units) * i64::from(self.field.behavior().time_picker_resolution());
            let delta = TimeDelta::hours(i64::from(hours))
                + TimeDelta::minutes(minutes)
                + TimeDelta::seconds(i64::from(seconds));
            time = time.checked_add_signed(delta).unwrap_or(time);
        }
        if self.field.behavior().has_date() {
            let date = self.value().unwrap_or(reference).date();
            time = date.and_time(time.time());
        }
        self.temp_time = Some(time);
        self.field.update_display_text(Some(time));
        self.set_part_valid(FieldPart::Time, true);
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn reference_date(&self) -> NaiveDateTime {
        self.field.behavior().reference_date()
    }

    fn set_part_valid(&mut self, part: FieldPart, valid: bool) {
        self.field
            .status_mut()
            .set_part_valid(part, valid, || INVALID_DATE_MESSAGE.to_owned());
    }

    /// Show `date` in the picker of `part`, or highlight the reference date.
    /// Only one popup is open at a time.
    fn open_picker(&mut self, part: FieldPart, date: Option<NaiveDateTime>) {
        if part == FieldPart::Time && !self.field.behavior().has_time_popup() {
            return;
        }
        self.pickers.close(part.other());
        let reference = self.reference_date();
        self.pickers.open_and_select(part, date, reference);
    }

    fn remove_overlays(&mut self) {
        self.field.behavior_mut().remove_overlays();
        self.debounce.cancel_all();
    }
}

impl Drop for DateField {
    fn drop(&mut self) {
        self.destroy();
    }
}
