//! Value pipeline for fieldcore.
//!
//! A field holds three representations of its content: the text the host
//! shows, the authoritative typed value, and the initial value used for
//! dirty-tracking. [`ValuePipeline`] keeps them consistent through a
//! parse → validate → format cycle whose stages can be swapped at runtime.
//!
//! Failures never escape: every parse, validation or conversion error is
//! attached to the field's status tree and the value stays at its last good
//! state.

mod behavior;
mod deferred;
mod events;
mod pipeline;
mod strategy;

pub use behavior::{FieldBehavior, IntegerBehavior, ParseContext, RawValue, TextBehavior};
pub use events::{AcceptInput, FieldEvent, FieldEvents, MenuTag};
pub use pipeline::{FieldInit, ValuePipeline};
pub use strategy::{
    FieldResult, FormatOutcome, Formatter, Parser, Validator, ValidatorChain, ValidatorId,
};
