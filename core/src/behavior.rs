//! Per-kind field behavior plugged into a [`ValuePipeline`](crate::ValuePipeline).

use fieldcore_types::{FieldError, FieldStatus, FieldValue, LeafStatus, invalid_value_message};

use crate::strategy::{FieldResult, FormatOutcome};

/// Input to `set_value` before it has been coerced into the field's value type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawValue<V> {
    #[default]
    Null,
    Value(V),
    /// Model value given as text (e.g. from a config file or a remote peer).
    Text(String),
}

impl<V> RawValue<V> {
    #[must_use]
    pub fn from_option(value: Option<V>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

/// Mutable state a parser may touch besides returning a value.
pub struct ParseContext<'a, V> {
    /// Value before the parse started.
    pub value: Option<&'a V>,
    pub status: &'a mut FieldStatus,
    /// The pipeline's display text. Parsers of compound fields rewrite it
    /// from their normalized part texts.
    pub display_text: &'a mut String,
}

/// The default implementations a field kind provides to the pipeline.
///
/// Custom parsers, formatters and validators installed on the pipeline
/// receive these as their `default` argument.
pub trait FieldBehavior {
    type Value: FieldValue;

    /// Coerce a raw input into the value type.
    fn ensure(&self, raw: RawValue<Self::Value>) -> FieldResult<Self::Value>;

    /// Default validator. Converts the empty string to null.
    fn validate(
        &self,
        value: Option<Self::Value>,
        _prior: Option<&Self::Value>,
    ) -> FieldResult<Self::Value> {
        Ok(value.filter(|value| !value.is_empty_text()))
    }

    fn parse(
        &mut self,
        text: &str,
        ctx: &mut ParseContext<'_, Self::Value>,
    ) -> FieldResult<Self::Value>;

    fn format(&mut self, value: Option<&Self::Value>) -> FormatOutcome;

    /// Text shown when a raw input could not be coerced.
    fn format_raw(&self, raw: &RawValue<Self::Value>) -> String {
        match raw {
            RawValue::Null => String::new(),
            RawValue::Value(value) => value.display(),
            RawValue::Text(text) => text.clone(),
        }
    }

    /// Read the text the host currently shows.
    fn read_display_text(&self) -> String;

    /// Push a new display text to the host.
    fn render_display_text(&mut self, _text: &str) {}

    /// Erase the host text. Runs before the accept triggered by `clear`.
    fn clear_text(&mut self, _status: &mut FieldStatus) {}

    fn accept_after_clear(&self) -> bool {
        true
    }

    /// Parse on accept even if the text did not change.
    fn reparse_unchanged_text(&self) -> bool {
        false
    }

    fn invalid_value_message(&self, text: &str) -> String {
        invalid_value_message(text)
    }

    /// Last chance to adjust any status produced from a parse, validation or
    /// conversion error before it is attached.
    fn decorate_invalid_status(&self, status: LeafStatus) -> LeafStatus {
        status
    }
}

/// Free text field. The host input slot is the display text.
#[derive(Debug, Clone, Default)]
pub struct TextBehavior {
    input: String,
}

impl TextBehavior {
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Host hook: the user edited the text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }
}

impl FieldBehavior for TextBehavior {
    type Value = String;

    fn ensure(&self, raw: RawValue<String>) -> FieldResult<String> {
        Ok(match raw {
            RawValue::Null => None,
            RawValue::Value(text) | RawValue::Text(text) => Some(text),
        })
    }

    fn parse(&mut self, text: &str, _ctx: &mut ParseContext<'_, String>) -> FieldResult<String> {
        Ok(Some(text.to_owned()))
    }

    fn format(&mut self, value: Option<&String>) -> FormatOutcome {
        FormatOutcome::Ready(value.cloned().unwrap_or_default())
    }

    fn read_display_text(&self) -> String {
        self.input.clone()
    }

    fn render_display_text(&mut self, text: &str) {
        text.clone_into(&mut self.input);
    }

    fn clear_text(&mut self, _status: &mut FieldStatus) {
        self.input.clear();
    }
}

/// Whole-number field.
#[derive(Debug, Clone, Default)]
pub struct IntegerBehavior {
    input: String,
}

impl IntegerBehavior {
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }
}

impl FieldBehavior for IntegerBehavior {
    type Value = i64;

    fn ensure(&self, raw: RawValue<i64>) -> FieldResult<i64> {
        match raw {
            RawValue::Null => Ok(None),
            RawValue::Value(value) => Ok(Some(value)),
            RawValue::Text(text) => text.trim().parse().map(Some).map_err(FieldError::other),
        }
    }

    fn parse(&mut self, text: &str, _ctx: &mut ParseContext<'_, i64>) -> FieldResult<i64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some).map_err(FieldError::other)
    }

    fn format(&mut self, value: Option<&i64>) -> FormatOutcome {
        FormatOutcome::Ready(value.map(i64::to_string).unwrap_or_default())
    }

    fn read_display_text(&self) -> String {
        self.input.clone()
    }

    fn render_display_text(&mut self, text: &str) {
        text.clone_into(&mut self.input);
    }

    fn clear_text(&mut self, _status: &mut FieldStatus) {
        self.input.clear();
    }
}
