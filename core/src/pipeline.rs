//! The value pipeline: display text in, typed value out, and back again.

use fieldcore_types::{
    FieldError, FieldStatus, FieldValue, LeafStatus, Status, StatusKind, values_equal,
};
use tracing::{debug, info};

use crate::behavior::{FieldBehavior, ParseContext, RawValue};
use crate::deferred::{DeferredFormat, Resolution};
use crate::events::{AcceptInput, FieldEvent, FieldEvents, MenuTag};
use crate::strategy::{
    FieldResult, FormatOutcome, Formatter, Parser, Validator, ValidatorChain, ValidatorId,
};

/// Initial state of a field.
#[derive(Debug, Clone)]
pub struct FieldInit<V> {
    pub value: RawValue<V>,
    /// Explicit display text. Wins over the formatted value during init.
    pub display_text: Option<String>,
}

impl<V> Default for FieldInit<V> {
    fn default() -> Self {
        Self {
            value: RawValue::Null,
            display_text: None,
        }
    }
}

impl<V> FieldInit<V> {
    #[must_use]
    pub fn value(value: V) -> Self {
        Self {
            value: RawValue::Value(value),
            display_text: None,
        }
    }

    #[must_use]
    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        self.display_text = Some(text.into());
        self
    }
}

/// Owns value, display text and initial value of one field.
pub struct ValuePipeline<B: FieldBehavior> {
    behavior: B,
    value: Option<B::Value>,
    initial_value: Option<B::Value>,
    display_text: String,
    status: FieldStatus,
    initialized: bool,
    explicit_display_text: bool,
    touched: bool,
    empty: bool,
    menu_tag: MenuTag,
    parser: Option<Parser<B::Value>>,
    formatter: Option<Formatter<B::Value>>,
    validators: ValidatorChain<B::Value>,
    deferred: DeferredFormat,
    events: FieldEvents<B::Value>,
}

impl<B: FieldBehavior> ValuePipeline<B> {
    pub fn new(behavior: B, init: FieldInit<B::Value>) -> Self {
        let mut pipeline = Self {
            behavior,
            value: None,
            initial_value: None,
            display_text: String::new(),
            status: FieldStatus::default(),
            initialized: false,
            explicit_display_text: false,
            touched: false,
            empty: true,
            menu_tag: MenuTag::Null,
            parser: None,
            formatter: None,
            validators: ValidatorChain::default(),
            deferred: DeferredFormat::default(),
            events: FieldEvents::default(),
        };
        if let Some(text) = init.display_text {
            pipeline.explicit_display_text = true;
            pipeline.set_display_text(text);
        }
        pipeline.apply_value(init.value);
        pipeline.initial_value = pipeline.value.clone();
        pipeline.update_tags();
        pipeline.initialized = true;
        pipeline.events.take();
        pipeline
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn value(&self) -> Option<&B::Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn initial_value(&self) -> Option<&B::Value> {
        self.initial_value.as_ref()
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    #[must_use]
    pub fn status(&self) -> &FieldStatus {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut FieldStatus {
        &mut self.status
    }

    #[must_use]
    pub fn error_status(&self) -> Option<&Status> {
        self.status.get()
    }

    #[must_use]
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    /// Status and behavior at once, for callers that update both.
    pub fn parts_mut(&mut self) -> (&mut B, &mut FieldStatus) {
        (&mut self.behavior, &mut self.status)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Null or an empty collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[must_use]
    pub fn menu_tag(&self) -> MenuTag {
        self.menu_tag
    }

    #[must_use]
    pub fn save_needed(&self) -> bool {
        self.touched || !values_equal(self.value.as_ref(), self.initial_value.as_ref())
    }

    /// Force `save_needed` until the next `mark_as_saved`.
    pub fn touch(&mut self) {
        self.touched = true;
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.deferred.generation()
    }

    #[must_use]
    pub fn has_pending_format(&self) -> bool {
        self.deferred.is_pending()
    }

    pub fn take_events(&mut self) -> Vec<FieldEvent<B::Value>> {
        self.events.take()
    }

    // ------------------------------------------------------------------
    // Strategies
    // ------------------------------------------------------------------

    /// Replace the parser. `None` restores the default. Re-parses the current text.
    pub fn set_parser(&mut self, parser: Option<Parser<B::Value>>) {
        self.parser = parser;
        if self.initialized {
            let text = self.display_text.clone();
            self.parse_and_set_value(&text);
        }
    }

    /// Replace the formatter. `None` restores the default. Re-validates.
    pub fn set_formatter(&mut self, formatter: Option<Formatter<B::Value>>) {
        self.formatter = formatter;
        if self.initialized {
            self.validate();
        }
    }

    pub fn add_validator(&mut self, validator: Validator<B::Value>, revalidate: bool) -> ValidatorId {
        let id = self.validators.add(validator);
        self.validators_changed(revalidate);
        id
    }

    pub fn remove_validator(&mut self, id: ValidatorId, revalidate: bool) -> bool {
        let removed = self.validators.remove(id);
        if removed {
            self.validators_changed(revalidate);
        }
        removed
    }

    /// Replace every validator with `validator`. `None` restores the default chain.
    pub fn set_validator(
        &mut self,
        validator: Option<Validator<B::Value>>,
        revalidate: bool,
    ) -> Option<ValidatorId> {
        let id = self.validators.replace(validator);
        self.validators_changed(revalidate);
        id
    }

    fn validators_changed(&mut self, revalidate: bool) {
        if self.initialized && revalidate {
            self.validate();
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, value: Option<B::Value>) {
        self.apply_value(RawValue::from_option(value));
    }

    /// Set a value that still needs coercion into the value type.
    pub fn set_raw_value(&mut self, raw: RawValue<B::Value>) {
        self.apply_value(raw);
    }

    /// Run the validators against the current value again.
    pub fn validate(&mut self) {
        let value = self.value.clone();
        self.apply_value(RawValue::from_option(value));
    }

    pub fn reset_value(&mut self) {
        let initial = self.initial_value.clone();
        self.apply_value(RawValue::from_option(initial));
    }

    pub fn mark_as_saved(&mut self) {
        self.initial_value = self.value.clone();
        self.touched = false;
    }

    /// Commit the text the host shows.
    pub fn accept_input(&mut self, while_typing: bool) {
        let text = self.behavior.read_display_text();
        let text_changed = text != self.display_text;

        if self.behavior.reparse_unchanged_text() {
            let old = self.value.clone();
            self.parse_and_set_value(&text);
            if text_changed || !values_equal(old.as_ref(), self.value.as_ref()) {
                self.trigger_accept_input(false);
            }
            return;
        }

        if !text_changed {
            return;
        }
        // No render: the host already shows this text.
        self.store_display_text(text.clone());
        if !while_typing {
            self.parse_and_set_value(&text);
        }
        self.trigger_accept_input(while_typing);
    }

    pub fn parse_and_set_value(&mut self, text: &str) {
        self.status.remove_where(|leaf| leaf.kind().is_parsing());
        let result = {
            let Self {
                behavior,
                parser,
                value,
                status,
                display_text,
                ..
            } = self;
            let mut ctx = ParseContext {
                value: value.as_ref(),
                status,
                display_text,
            };
            match parser {
                Some(parser) => parser(text, &mut |text| behavior.parse(text, &mut ctx)),
                None => behavior.parse(text, &mut ctx),
            }
        };
        match result {
            Ok(parsed) => self.apply_value(RawValue::from_option(parsed)),
            Err(error) => self.parsing_failed(text, error),
        }
    }

    /// Erase the text and accept the result.
    pub fn clear(&mut self) {
        self.behavior.clear_text(&mut self.status);
        if self.behavior.accept_after_clear() {
            self.accept_input(false);
        }
        self.events.push(FieldEvent::Cleared);
    }

    /// Queue an accept-input notification for the current state.
    pub fn trigger_accept_input(&mut self, while_typing: bool) {
        self.events.push(FieldEvent::AcceptInput(AcceptInput {
            display_text: self.display_text.clone(),
            while_typing,
            value: self.value.clone(),
            error_status: self.status.get().cloned(),
        }));
    }

    /// Format `value` (or the current value) into the display text without
    /// touching the value itself.
    pub fn update_display_text(&mut self, value: Option<B::Value>) {
        if !self.initialized && self.explicit_display_text {
            return;
        }
        let value = value.or_else(|| self.value.clone());
        let outcome = {
            let Self {
                behavior,
                formatter,
                ..
            } = self;
            match formatter {
                Some(formatter) => formatter(value.as_ref(), &mut |value| behavior.format(value)),
                None => behavior.format(value.as_ref()),
            }
        };
        match outcome {
            FormatOutcome::Ready(text) => self.set_display_text(text),
            FormatOutcome::Deferred(receiver) => self.deferred.issue(receiver),
        }
    }

    /// Apply a resolved deferred format, if any. Call on every UI turn.
    /// Returns whether the display text changed.
    pub fn poll_deferred_format(&mut self) -> bool {
        let Some(resolution) = self.deferred.poll() else {
            return false;
        };
        let before = self.display_text.clone();
        match resolution {
            Resolution::Text(text) => self.write_display_text(text),
            Resolution::Failed(error) => {
                info!(?error, "could not resolve display text");
                self.write_display_text(String::new());
            }
        }
        before != self.display_text
    }

    /// Set and render the display text. Supersedes any pending deferred format.
    pub fn set_display_text(&mut self, text: String) {
        self.deferred.supersede();
        self.write_display_text(text);
    }

    /// Set the display text without rendering it.
    pub fn store_display_text(&mut self, text: String) {
        self.deferred.supersede();
        if text != self.display_text {
            self.display_text.clone_from(&text);
            self.events.push(FieldEvent::DisplayTextChanged { text });
        }
    }

    fn write_display_text(&mut self, text: String) {
        self.behavior.render_display_text(&text);
        if text != self.display_text {
            self.display_text.clone_from(&text);
            self.events.push(FieldEvent::DisplayTextChanged { text });
        }
    }

    // ------------------------------------------------------------------
    // Pipeline stages
    // ------------------------------------------------------------------

    fn apply_value(&mut self, raw: RawValue<B::Value>) {
        // An error status handed in at init survives the first pass.
        if self.initialized {
            self.status
                .remove_where(|leaf| leaf.kind().is_pipeline_failure());
        }
        let old = self.value.clone();

        let typed = match self.behavior.ensure(raw.clone()) {
            Ok(typed) => typed,
            Err(error) => {
                self.conversion_failed(&raw, error);
                return;
            }
        };

        match self.run_validators(typed.clone()) {
            Ok(validated) => self.value = validated,
            Err(error) => {
                self.validation_failed(typed, error);
                return;
            }
        }

        self.update_display_text(None);
        if values_equal(old.as_ref(), self.value.as_ref()) {
            return;
        }
        self.update_tags();
        self.events.push(FieldEvent::ValueChanged {
            old,
            new: self.value.clone(),
        });
    }

    fn run_validators(&self, value: Option<B::Value>) -> FieldResult<B::Value> {
        let prior = self.value.as_ref();
        let default = |value: Option<B::Value>| self.behavior.validate(value, prior);
        self.validators.run(value, &default)
    }

    fn update_tags(&mut self) {
        self.empty = self.value.as_ref().is_none_or(FieldValue::is_empty_value);
        self.menu_tag = MenuTag::for_value(self.value.as_ref());
    }

    fn invalid_status(&self, kind: StatusKind, error: FieldError, text: &str) -> LeafStatus {
        let status = error.into_status(kind, || self.behavior.invalid_value_message(text));
        self.behavior.decorate_invalid_status(status)
    }

    fn conversion_failed(&mut self, raw: &RawValue<B::Value>, error: FieldError) {
        let text = self.behavior.format_raw(raw);
        debug!(%error, input = %text, "value conversion failed");
        let status = self.invalid_status(StatusKind::Conversion, error, &text);
        self.status.add(status);
        self.set_display_text(text);
    }

    fn validation_failed(&mut self, typed: Option<B::Value>, error: FieldError) {
        let text = typed.as_ref().map(FieldValue::display).unwrap_or_default();
        debug!(%error, value = %text, "validation failed");
        let status = self.invalid_status(StatusKind::Validation, error, &text);
        self.status.add(status);
        self.update_display_text(typed);
    }

    fn parsing_failed(&mut self, text: &str, error: FieldError) {
        debug!(%error, display_text = text, "parsing failed");
        self.events.push(FieldEvent::ParseError {
            display_text: text.to_owned(),
            message: error.to_string(),
        });
        // Compound fields attach their own partial status while predicting.
        if error.is_prediction_failure() {
            return;
        }
        let status = self.invalid_status(StatusKind::Parsing, error, text);
        self.status.add(status);
    }
}

impl<B: FieldBehavior + std::fmt::Debug> std::fmt::Debug for ValuePipeline<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValuePipeline")
            .field("behavior", &self.behavior)
            .field("value", &self.value)
            .field("initial_value", &self.initial_value)
            .field("display_text", &self.display_text)
            .field("status", &self.status)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
