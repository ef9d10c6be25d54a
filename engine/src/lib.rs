//! Date/time field engine for fieldcore.
//!
//! This crate specializes the generic value pipeline for a composite field
//! made of a date part and a time part that jointly hold one timestamp:
//! pattern based formatting and lenient parsing, input prediction, allowed
//! dates, picker popups and the keyboard semantics of both parts.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod allowed;
mod clock;
mod composite;
mod date_field;
mod format;
mod locale;
mod picker;
mod prediction;
mod sync;

pub use allowed::AllowedDates;
pub use clock::{Clock, FixedClock, SystemClock, ceil_to_resolution};
pub use composite::{
    DATE_NOT_ALLOWED_MESSAGE, DEFAULT_TIME_PICKER_RESOLUTION, DateTimeBehavior,
    FALLBACK_TIME_PICKER_RESOLUTION, INVALID_DATE_MESSAGE, SubField,
};
pub use date_field::{
    DateField, DateFieldOptions, KeyOutcome, NeverScrolled, OVERLAY_DEBOUNCE, PointerTarget,
    ScrollCheck,
};
pub use format::{AnalyzeInfo, DateFormat, DateInfo, PatternError};
pub use locale::Locale;
pub use picker::{
    HeadlessDatePicker, HeadlessPickers, HeadlessTimePicker, PickerController, PickerFactory,
    PickerShift, PickerState, PickerWidget,
};
pub use prediction::{Prediction, predict_date, predict_time};
pub use sync::{AcceptPayload, RemoteSync, SyncProperty};

// Re-exported so hosts need only this crate.
pub use fieldcore_core::{FieldEvent, RawValue};
pub use fieldcore_types::{FieldPart, Key, KeyPress, Modifiers};
