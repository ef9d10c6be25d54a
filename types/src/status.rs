//! Error status tree for value fields.
//!
//! Status nodes are immutable. Mutations on [`FieldStatus`] rebuild the tree
//! instead of editing nodes in place, so a status handed out to a listener
//! never changes underneath it.

use serde::{Deserialize, Serialize};

use crate::FieldPart;

/// Status code shared by every status that carries partial-validity markers.
pub const PARSE_ERROR_CODE: i32 = -1;

/// Severity of a status, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Info,
    Warning,
    #[default]
    Error,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Discriminates where in the pipeline a status was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// A status without a pipeline stage (e.g. thrown by user code).
    #[default]
    Plain,
    /// The parser rejected the display text.
    Parsing,
    /// One part of a compound field could not be interpreted.
    PartialParsing,
    /// A validator rejected the typed value.
    Validation,
    /// The raw value could not be coerced into the field's value type.
    Conversion,
}

impl StatusKind {
    /// Parsing-family kinds are dropped whenever the text is parsed again.
    #[must_use]
    pub const fn is_parsing(self) -> bool {
        matches!(self, Self::Parsing | Self::PartialParsing)
    }

    /// Kinds that a fresh `set_value` clears before running the pipeline.
    #[must_use]
    pub const fn is_pipeline_failure(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// Per-part validity markers of a compound (date + time) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMarkers {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invalid_date: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invalid_time: bool,
}

impl PartMarkers {
    pub const NONE: Self = Self {
        invalid_date: false,
        invalid_time: false,
    };

    pub const BOTH: Self = Self {
        invalid_date: true,
        invalid_time: true,
    };

    #[must_use]
    pub const fn is_invalid(self, part: FieldPart) -> bool {
        match part {
            FieldPart::Date => self.invalid_date,
            FieldPart::Time => self.invalid_time,
        }
    }

    #[must_use]
    pub const fn with(mut self, part: FieldPart, invalid: bool) -> Self {
        match part {
            FieldPart::Date => self.invalid_date = invalid,
            FieldPart::Time => self.invalid_time = invalid,
        }
        self
    }

    #[must_use]
    pub const fn any(self) -> bool {
        self.invalid_date || self.invalid_time
    }
}

/// A single status node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafStatus {
    kind: StatusKind,
    severity: Severity,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
    #[serde(default, flatten)]
    markers: PartMarkers,
}

impl LeafStatus {
    #[must_use]
    pub fn new(kind: StatusKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            code: None,
            markers: PartMarkers::NONE,
        }
    }

    /// An error-severity status of the given kind.
    #[must_use]
    pub fn error(kind: StatusKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Error, message)
    }

    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn with_markers(mut self, markers: PartMarkers) -> Self {
        self.markers = markers;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: StatusKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    #[must_use]
    pub fn markers(&self) -> PartMarkers {
        self.markers
    }

    /// Whether this node is the partial-validity carrier of a compound field.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        self.code == Some(PARSE_ERROR_CODE)
    }
}

/// Ordered group of child statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeStatus {
    children: Vec<Status>,
}

impl CompositeStatus {
    #[must_use]
    pub fn children(&self) -> &[Status] {
        &self.children
    }
}

/// Status tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Status {
    Leaf(LeafStatus),
    Composite(CompositeStatus),
}

impl Status {
    /// All leaves, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&LeafStatus> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a LeafStatus>) {
        match self {
            Status::Leaf(leaf) => out.push(leaf),
            Status::Composite(composite) => {
                for child in &composite.children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// The most severe leaf; the first one wins on ties.
    #[must_use]
    pub fn worst(&self) -> Option<&LeafStatus> {
        self.leaves()
            .into_iter()
            .reduce(|worst, leaf| if leaf.severity > worst.severity { leaf } else { worst })
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.worst().map_or(Severity::Ok, LeafStatus::severity)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.worst().map_or("", LeafStatus::message)
    }

    /// Rebuild the tree without the leaves matching `remove`.
    /// Empty composites disappear and single-child composites collapse.
    #[must_use]
    fn without(self, remove: &dyn Fn(&LeafStatus) -> bool) -> Option<Status> {
        match self {
            Status::Leaf(leaf) => (!remove(&leaf)).then_some(Status::Leaf(leaf)),
            Status::Composite(composite) => {
                let mut children: Vec<Status> = composite
                    .children
                    .into_iter()
                    .filter_map(|child| child.without(remove))
                    .collect();
                match children.len() {
                    0 => None,
                    1 => children.pop(),
                    _ => Some(Status::Composite(CompositeStatus { children })),
                }
            }
        }
    }

    #[must_use]
    fn map_leaves(self, f: &mut dyn FnMut(LeafStatus) -> Option<LeafStatus>) -> Option<Status> {
        match self {
            Status::Leaf(leaf) => f(leaf).map(Status::Leaf),
            Status::Composite(composite) => {
                let mut children: Vec<Status> = composite
                    .children
                    .into_iter()
                    .filter_map(|child| child.map_leaves(f))
                    .collect();
                match children.len() {
                    0 => None,
                    1 => children.pop(),
                    _ => Some(Status::Composite(CompositeStatus { children })),
                }
            }
        }
    }
}

/// The error status slot of one field.
///
/// Holds at most one tree. An empty tree is represented as `None`, never as
/// an empty composite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStatus {
    root: Option<Status>,
}

impl FieldStatus {
    #[must_use]
    pub fn get(&self) -> Option<&Status> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[must_use]
    pub fn leaves(&self) -> Vec<&LeafStatus> {
        self.root.as_ref().map(Status::leaves).unwrap_or_default()
    }

    /// Attach a status. A leaf with the same kind and code is replaced.
    pub fn add(&mut self, status: LeafStatus) {
        let (kind, code) = (status.kind, status.code);
        let rest = self
            .root
            .take()
            .and_then(|root| root.without(&|leaf| leaf.kind == kind && leaf.code == code));
        self.root = Some(match rest {
            None => Status::Leaf(status),
            Some(Status::Leaf(existing)) => Status::Composite(CompositeStatus {
                children: vec![Status::Leaf(existing), Status::Leaf(status)],
            }),
            Some(Status::Composite(mut composite)) => {
                composite.children.push(Status::Leaf(status));
                Status::Composite(composite)
            }
        });
    }

    /// Remove every leaf matching `predicate`. Returns whether anything was removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&LeafStatus) -> bool) -> bool {
        let Some(root) = self.root.take() else {
            return false;
        };
        let before = root.leaves().len();
        self.root = root.without(&predicate);
        let after = self.root.as_ref().map_or(0, |root| root.leaves().len());
        before != after
    }

    pub fn remove_kind(&mut self, kind: StatusKind) -> bool {
        self.remove_where(|leaf| leaf.kind == kind)
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    #[must_use]
    pub fn contains(&self, predicate: impl Fn(&LeafStatus) -> bool) -> bool {
        self.leaves().into_iter().any(predicate)
    }

    #[must_use]
    pub fn contains_kind(&self, kind: StatusKind) -> bool {
        self.contains(|leaf| leaf.kind == kind)
    }

    /// Whether a parsing-family failure is currently attached.
    #[must_use]
    pub fn has_parsing_failure(&self) -> bool {
        self.contains(|leaf| leaf.kind.is_parsing())
    }

    /// `false` if any node anywhere in the tree marks `part` invalid.
    #[must_use]
    pub fn is_part_valid(&self, part: FieldPart) -> bool {
        !self.contains(|leaf| leaf.markers.is_invalid(part))
    }

    /// Set or clear the partial-validity marker for `part`.
    ///
    /// Mutates the first parse-error node when there is one, otherwise
    /// creates it with `message`. Once both markers are cleared the node is
    /// removed.
    pub fn set_part_valid(&mut self, part: FieldPart, valid: bool, message: impl FnOnce() -> String) {
        if self.contains(LeafStatus::is_parse_error) {
            let mut done = false;
            self.root = self.root.take().and_then(|root| {
                root.map_leaves(&mut |leaf| {
                    if done || !leaf.is_parse_error() {
                        return Some(leaf);
                    }
                    done = true;
                    let markers = leaf.markers.with(part, !valid);
                    markers.any().then(|| leaf.with_markers(markers))
                })
            });
            return;
        }
        if valid {
            return;
        }
        self.add(
            LeafStatus::error(StatusKind::PartialParsing, message())
                .with_code(PARSE_ERROR_CODE)
                .with_markers(PartMarkers::NONE.with(part, true)),
        );
    }

    /// Drop every partial-validity node.
    pub fn remove_parse_errors(&mut self) -> bool {
        self.remove_where(LeafStatus::is_parse_error)
    }
}

impl From<Option<Status>> for FieldStatus {
    fn from(root: Option<Status>) -> Self {
        Self { root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsing(message: &str) -> LeafStatus {
        LeafStatus::error(StatusKind::Parsing, message)
    }

    #[test]
    fn add_single_status_is_leaf() {
        let mut status = FieldStatus::default();
        status.add(parsing("bad"));
        assert!(matches!(status.get(), Some(Status::Leaf(_))));
        assert_eq!(status.get().unwrap().message(), "bad");
    }

    #[test]
    fn add_same_kind_replaces() {
        let mut status = FieldStatus::default();
        status.add(parsing("first"));
        status.add(parsing("second"));
        assert_eq!(status.leaves().len(), 1);
        assert_eq!(status.leaves()[0].message(), "second");
    }

    #[test]
    fn add_other_kind_builds_composite() {
        let mut status = FieldStatus::default();
        status.add(parsing("parse"));
        status.add(LeafStatus::new(StatusKind::Validation, Severity::Warning, "warn"));
        assert!(matches!(status.get(), Some(Status::Composite(_))));
        assert_eq!(status.leaves().len(), 2);
        assert_eq!(status.get().unwrap().severity(), Severity::Error);
        assert_eq!(status.get().unwrap().message(), "parse");
    }

    #[test]
    fn removing_last_child_clears_slot() {
        let mut status = FieldStatus::default();
        status.add(parsing("parse"));
        status.add(LeafStatus::error(StatusKind::Validation, "invalid"));
        assert!(status.remove_kind(StatusKind::Parsing));
        assert!(matches!(status.get(), Some(Status::Leaf(_))));
        assert!(status.remove_kind(StatusKind::Validation));
        assert!(status.is_empty());
        assert!(!status.remove_kind(StatusKind::Validation));
    }

    #[test]
    fn part_markers_share_one_node() {
        let mut status = FieldStatus::default();
        status.set_part_valid(FieldPart::Date, false, || "Invalid date".into());
        status.set_part_valid(FieldPart::Time, false, || unreachable!("node already exists"));
        assert_eq!(status.leaves().len(), 1);
        assert!(!status.is_part_valid(FieldPart::Date));
        assert!(!status.is_part_valid(FieldPart::Time));

        status.set_part_valid(FieldPart::Date, true, String::new);
        assert!(status.is_part_valid(FieldPart::Date));
        assert!(!status.is_part_valid(FieldPart::Time));

        status.set_part_valid(FieldPart::Time, true, String::new);
        assert!(status.is_empty());
    }

    #[test]
    fn marking_valid_without_node_does_not_create_one() {
        let mut status = FieldStatus::default();
        status.set_part_valid(FieldPart::Time, true, || unreachable!());
        assert!(status.is_empty());
    }

    #[test]
    fn part_validity_scans_whole_tree() {
        let mut status = FieldStatus::default();
        status.add(LeafStatus::error(StatusKind::Plain, "other"));
        status.add(
            LeafStatus::error(StatusKind::Validation, "not allowed")
                .with_code(PARSE_ERROR_CODE)
                .with_markers(PartMarkers::BOTH),
        );
        assert!(!status.is_part_valid(FieldPart::Date));
        assert!(!status.is_part_valid(FieldPart::Time));
        assert!(status.remove_parse_errors());
        assert!(status.is_part_valid(FieldPart::Date));
        assert_eq!(status.leaves().len(), 1);
    }

    #[test]
    fn leaf_serializes_markers_flat() {
        let leaf = LeafStatus::error(StatusKind::PartialParsing, "Invalid date")
            .with_code(PARSE_ERROR_CODE)
            .with_markers(PartMarkers::NONE.with(FieldPart::Date, true));
        let json = serde_json::to_value(Status::Leaf(leaf)).unwrap();
        assert_eq!(json["invalidDate"], true);
        assert!(json.get("invalidTime").is_none());
        assert_eq!(json["code"], -1);
        assert_eq!(json["kind"], "partial_parsing");
    }
}
