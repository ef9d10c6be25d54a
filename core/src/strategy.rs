//! Swappable parser, formatter and validator slots.
//!
//! Each strategy receives the field kind's default implementation as an
//! explicit argument and decides itself whether to delegate to it.

use fieldcore_types::FieldError;
use tokio::sync::oneshot;

/// Result of a parse, validation or coercion step. `Ok(None)` is a valid null.
pub type FieldResult<V> = Result<Option<V>, FieldError>;

pub type Parser<V> = Box<dyn Fn(&str, &mut dyn FnMut(&str) -> FieldResult<V>) -> FieldResult<V>>;

pub type Formatter<V> =
    Box<dyn Fn(Option<&V>, &mut dyn FnMut(Option<&V>) -> FormatOutcome) -> FormatOutcome>;

pub type Validator<V> = Box<dyn Fn(Option<V>, &dyn Fn(Option<V>) -> FieldResult<V>) -> FieldResult<V>>;

/// What a formatter produced.
pub enum FormatOutcome {
    Ready(String),
    /// Text resolved later, e.g. by a lookup against a remote code table.
    Deferred(oneshot::Receiver<Result<String, FieldError>>),
}

impl FormatOutcome {
    /// A deferred outcome plus the sender that resolves it.
    #[must_use]
    pub fn deferred() -> (oneshot::Sender<Result<String, FieldError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::Deferred(rx))
    }
}

impl std::fmt::Debug for FormatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(text) => f.debug_tuple("Ready").field(text).finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Handle returned by [`ValidatorChain::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatorId(u64);

pub(crate) enum ValidatorEntry<V> {
    /// The field kind's own validator.
    Default,
    Custom { id: ValidatorId, validator: Validator<V> },
}

/// Ordered validators. Every entry runs on every validation; the first
/// failure aborts the rest.
pub struct ValidatorChain<V> {
    entries: Vec<ValidatorEntry<V>>,
    next_id: u64,
}

impl<V> Default for ValidatorChain<V> {
    fn default() -> Self {
        Self {
            entries: vec![ValidatorEntry::Default],
            next_id: 0,
        }
    }
}

impl<V> ValidatorChain<V> {
    pub fn add(&mut self, validator: Validator<V>) -> ValidatorId {
        let id = ValidatorId(self.next_id);
        self.next_id += 1;
        self.entries.push(ValidatorEntry::Custom { id, validator });
        id
    }

    pub fn remove(&mut self, id: ValidatorId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, ValidatorEntry::Custom { id: other, .. } if *other == id));
        self.entries.len() != before
    }

    /// Replace every validator. `None` restores the default-only chain.
    pub fn replace(&mut self, validator: Option<Validator<V>>) -> Option<ValidatorId> {
        self.entries.clear();
        match validator {
            Some(validator) => Some(self.add(validator)),
            None => {
                self.entries.push(ValidatorEntry::Default);
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the chain. `default` is the field kind's validator.
    pub(crate) fn run(
        &self,
        mut value: Option<V>,
        default: &dyn Fn(Option<V>) -> FieldResult<V>,
    ) -> FieldResult<V> {
        for entry in &self.entries {
            value = match entry {
                ValidatorEntry::Default => default(value)?,
                ValidatorEntry::Custom { validator, .. } => validator(value, default)?,
            };
        }
        Ok(value)
    }
}
