//! Date and time picker popups.
//!
//! The field talks to pickers only through [`PickerWidget`]; how a picker
//! looks is up to the host. [`HeadlessPickers`] provides plain in-memory
//! pickers used by the CLI host and the tests.

use std::fmt;
use std::sync::Arc;

use chrono::{Months, NaiveDateTime, TimeDelta};
use fieldcore_types::FieldPart;
use tracing::trace;

/// Relative movement of a picker's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerShift {
    Date { years: i32, months: i32, days: i32 },
    /// `units` are multiples of the picker's resolution in minutes.
    Time { hours: i32, units: i32, seconds: i32 },
}

impl PickerShift {
    #[must_use]
    pub const fn days(days: i32) -> Self {
        Self::Date {
            years: 0,
            months: 0,
            days,
        }
    }

    #[must_use]
    pub const fn months(months: i32) -> Self {
        Self::Date {
            years: 0,
            months,
            days: 0,
        }
    }

    #[must_use]
    pub const fn years(years: i32) -> Self {
        Self::Date {
            years,
            months: 0,
            days: 0,
        }
    }
}

pub trait PickerWidget: fmt::Debug {
    fn open(&mut self);
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn selected(&self) -> Option<NaiveDateTime>;
    fn preselected(&self) -> Option<NaiveDateTime>;
    /// Highlight `date` without selecting it. Clears the selection.
    fn preselect(&mut self, date: NaiveDateTime);
    fn select(&mut self, date: Option<NaiveDateTime>);
    /// Move the selection. Without a selection the preselected date becomes
    /// selected unshifted.
    fn shift(&mut self, shift: PickerShift);
}

pub trait PickerFactory: fmt::Debug {
    /// `resolution` is the time picker's step in minutes.
    fn create(&self, part: FieldPart, resolution: u32) -> Box<dyn PickerWidget>;
}

/// Snapshot of one picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickerState {
    pub is_open: bool,
    pub selected: Option<NaiveDateTime>,
    pub preselected: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPickers;

impl PickerFactory for HeadlessPickers {
    fn create(&self, part: FieldPart, resolution: u32) -> Box<dyn PickerWidget> {
        match part {
            FieldPart::Date => Box::new(HeadlessDatePicker::default()),
            FieldPart::Time => Box::new(HeadlessTimePicker::new(resolution)),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Selection {
    open: bool,
    selected: Option<NaiveDateTime>,
    preselected: Option<NaiveDateTime>,
}

impl Selection {
    fn shift_with(&mut self, apply: impl FnOnce(NaiveDateTime) -> Option<NaiveDateTime>) {
        let next = match self.selected {
            Some(selected) => apply(selected),
            None => self.preselected,
        };
        if let Some(next) = next {
            self.selected = Some(next);
        }
    }
}

/// Calendar picker. Month shifts clamp to the end of the target month.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDatePicker {
    state: Selection,
}

impl PickerWidget for HeadlessDatePicker {
    fn open(&mut self) {
        self.state.open = true;
    }

    fn close(&mut self) {
        self.state.open = false;
    }

    fn is_open(&self) -> bool {
        self.state.open
    }

    fn selected(&self) -> Option<NaiveDateTime> {
        self.state.selected
    }

    fn preselected(&self) -> Option<NaiveDateTime> {
        self.state.preselected
    }

    fn preselect(&mut self, date: NaiveDateTime) {
        self.state.selected = None;
        self.state.preselected = Some(date);
    }

    fn select(&mut self, date: Option<NaiveDateTime>) {
        self.state.selected = date;
    }

    fn shift(&mut self, shift: PickerShift) {
        let PickerShift::Date {
            years,
            months,
            days,
        } = shift
        else {
            return;
        };
        self.state.shift_with(|date| {
            let date = shift_months(date, years.checked_mul(12)?.checked_add(months)?)?;
            date.checked_add_signed(TimeDelta::try_days(i64::from(days))?)
        });
    }
}

/// Time picker stepping in `resolution` minute units.
#[derive(Debug, Clone)]
pub struct HeadlessTimePicker {
    resolution: u32,
    state: Selection,
}

impl HeadlessTimePicker {
    #[must_use]
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            state: Selection::default(),
        }
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}

impl PickerWidget for HeadlessTimePicker {
    fn open(&mut self) {
        self.state.open = true;
    }

    fn close(&mut self) {
        self.state.open = false;
    }

    fn is_open(&self) -> bool {
        self.state.open
    }

    fn selected(&self) -> Option<NaiveDateTime> {
        self.state.selected
    }

    fn preselected(&self) -> Option<NaiveDateTime> {
        self.state.preselected
    }

    fn preselect(&mut self, date: NaiveDateTime) {
        self.state.selected = None;
        self.state.preselected = Some(date);
    }

    fn select(&mut self, date: Option<NaiveDateTime>) {
        self.state.selected = date;
    }

    fn shift(&mut self, shift: PickerShift) {
        let PickerShift::Time {
            hours,
            units,
            seconds,
        } = shift
        else {
            return;
        };
        let resolution = i64::from(self.resolution);
        self.state.shift_with(|time| {
            let delta = TimeDelta::try_hours(i64::from(hours))?
                .checked_add(&TimeDelta::try_minutes(i64::from(units) * resolution)?)?
                .checked_add(&TimeDelta::try_seconds(i64::from(seconds))?)?;
            time.checked_add_signed(delta)
        });
    }
}

fn shift_months(date: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let magnitude = Months::new(months.unsigned_abs());
    if months < 0 {
        date.checked_sub_months(magnitude)
    } else {
        date.checked_add_months(magnitude)
    }
}

/// Owns the popups of both sub-fields. A closed popup is dropped.
#[derive(Debug)]
pub struct PickerController {
    factory: Arc<dyn PickerFactory>,
    resolution: u32,
    date: Option<Box<dyn PickerWidget>>,
    time: Option<Box<dyn PickerWidget>>,
}

impl PickerController {
    pub fn new(factory: Arc<dyn PickerFactory>, resolution: u32) -> Self {
        Self {
            factory,
            resolution,
            date: None,
            time: None,
        }
    }

    pub fn set_resolution(&mut self, resolution: u32) {
        self.resolution = resolution;
    }

    fn slot(&mut self, part: FieldPart) -> &mut Option<Box<dyn PickerWidget>> {
        match part {
            FieldPart::Date => &mut self.date,
            FieldPart::Time => &mut self.time,
        }
    }

    #[must_use]
    pub fn is_open(&self, part: FieldPart) -> bool {
        self.get(part).is_some_and(|picker| picker.is_open())
    }

    #[must_use]
    pub fn get(&self, part: FieldPart) -> Option<&dyn PickerWidget> {
        match part {
            FieldPart::Date => self.date.as_deref(),
            FieldPart::Time => self.time.as_deref(),
        }
    }

    /// The open popup of `part`, if any.
    pub fn get_mut(&mut self, part: FieldPart) -> Option<&mut (dyn PickerWidget + 'static)> {
        self.slot(part).as_deref_mut()
    }

    pub fn open(&mut self, part: FieldPart) -> &mut dyn PickerWidget {
        let (factory, resolution) = (Arc::clone(&self.factory), self.resolution);
        let picker = self.slot(part).get_or_insert_with(|| {
            trace!(%part, "open picker");
            factory.create(part, resolution)
        });
        picker.open();
        picker.as_mut()
    }

    /// Open and show `value`, or highlight `reference` when there is none.
    pub fn open_and_select(
        &mut self,
        part: FieldPart,
        value: Option<NaiveDateTime>,
        reference: NaiveDateTime,
    ) {
        let picker = self.open(part);
        match value {
            Some(value) => picker.select(Some(value)),
            None => picker.preselect(reference),
        }
    }

    pub fn close(&mut self, part: FieldPart) {
        if let Some(mut picker) = self.slot(part).take() {
            trace!(%part, "close picker");
            picker.close();
        }
    }

    pub fn close_all(&mut self) {
        self.close(FieldPart::Date);
        self.close(FieldPart::Time);
    }

    #[must_use]
    pub fn state(&self, part: FieldPart) -> PickerState {
        self.get(part).map_or_else(PickerState::default, |picker| PickerState {
            is_open: picker.is_open(),
            selected: picker.selected(),
            preselected: picker.preselected(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn controller() -> PickerController {
        PickerController::new(Arc::new(HeadlessPickers), 30)
    }

    #[test]
    fn first_shift_selects_preselected() {
        let mut pickers = controller();
        pickers.open_and_select(FieldPart::Date, None, at(2014, 10, 1, 0, 0));
        let picker = pickers.get_mut(FieldPart::Date).unwrap();
        picker.shift(PickerShift::days(1));
        assert_eq!(picker.selected(), Some(at(2014, 10, 1, 0, 0)));
        picker.shift(PickerShift::days(1));
        assert_eq!(picker.selected(), Some(at(2014, 10, 2, 0, 0)));
    }

    #[test]
    fn month_shift_clamps() {
        let mut picker = HeadlessDatePicker::default();
        picker.select(Some(at(2021, 1, 31, 9, 0)));
        picker.shift(PickerShift::months(1));
        assert_eq!(picker.selected(), Some(at(2021, 2, 28, 9, 0)));
        picker.shift(PickerShift::years(-1));
        assert_eq!(picker.selected(), Some(at(2020, 2, 28, 9, 0)));
    }

    #[test]
    fn time_units_follow_resolution() {
        let mut picker = HeadlessTimePicker::new(15);
        picker.select(Some(at(2021, 1, 1, 10, 0)));
        picker.shift(PickerShift::Time {
            hours: 0,
            units: -1,
            seconds: 0,
        });
        assert_eq!(picker.selected(), Some(at(2021, 1, 1, 9, 45)));
        picker.shift(PickerShift::days(1));
        assert_eq!(picker.selected(), Some(at(2021, 1, 1, 9, 45)));
    }

    #[test]
    fn close_drops_popup() {
        let mut pickers = controller();
        pickers.open_and_select(FieldPart::Time, Some(at(2021, 1, 1, 10, 0)), at(2000, 1, 1, 0, 0));
        assert!(pickers.is_open(FieldPart::Time));
        assert_eq!(pickers.state(FieldPart::Time).selected, Some(at(2021, 1, 1, 10, 0)));
        pickers.close_all();
        assert!(!pickers.is_open(FieldPart::Time));
        assert_eq!(pickers.state(FieldPart::Time), PickerState::default());
    }
}
