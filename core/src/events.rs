//! Field notifications queued for the host.

use fieldcore_types::Status;

/// Menu visibility tag derived from the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuTag {
    #[default]
    Null,
    NotNull,
}

impl MenuTag {
    #[must_use]
    pub fn for_value<V>(value: Option<&V>) -> Self {
        if value.is_some() { Self::NotNull } else { Self::Null }
    }
}

/// Snapshot taken when the field commits its text.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptInput<V> {
    pub display_text: String,
    pub while_typing: bool,
    pub value: Option<V>,
    pub error_status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent<V> {
    ValueChanged { old: Option<V>, new: Option<V> },
    DisplayTextChanged { text: String },
    AcceptInput(AcceptInput<V>),
    ParseError { display_text: String, message: String },
    Cleared,
}

/// Events in the order they happened. Drained by the host after each call.
#[derive(Debug)]
pub struct FieldEvents<V> {
    pending: Vec<FieldEvent<V>>,
}

impl<V> Default for FieldEvents<V> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<V> FieldEvents<V> {
    pub fn push(&mut self, event: FieldEvent<V>) {
        self.pending.push(event);
    }

    /// Take all pending events, clearing the queue.
    pub fn take(&mut self) -> Vec<FieldEvent<V>> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
