use crate::ids::{NodeId, ViewId};

/// Structural errors: the caller asked for a tree shape that can never be valid.
///
/// Drag-and-drop races (missing ids, locked targets) are *not* errors; those are silent
/// no-ops on [`crate::Workspace`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    EmptyViewName,
    EmptySplit { id: NodeId },
    DuplicateNode { id: NodeId },
    DuplicateView { id: ViewId },
    MissingNode { id: NodeId },
    AlreadyAttached { id: NodeId, parent: NodeId },
    InvalidPattern { pattern: String },
    ViewIdsExhausted,
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyViewName => write!(f, "view name must not be empty"),
            Self::EmptySplit { id } => {
                write!(f, "split node {id} must be created with at least one child")
            }
            Self::DuplicateNode { id } => write!(f, "node id {id} is already in use"),
            Self::DuplicateView { id } => write!(f, "view id {id} is already in use"),
            Self::MissingNode { id } => write!(f, "node {id} does not exist"),
            Self::AlreadyAttached { id, parent } => {
                write!(f, "node {id} is already a child of {parent}")
            }
            Self::ViewIdsExhausted => write!(f, "no unused view ids remain"),
            Self::InvalidPattern { pattern } => write!(
                f,
                "invalid view path pattern {pattern:?}: at most one [placeholder] segment is allowed"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// A persisted view that no registered [`crate::ViewDefinition`] matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionError {
    pub name: String,
    pub path: Option<String>,
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "no view definition matches {:?} (path {path:?})", self.name),
            None => write!(f, "no view definition matches {:?}", self.name),
        }
    }
}

impl std::error::Error for ResolutionError {}

#[derive(Debug)]
pub enum PersistenceError {
    Json(serde_json::Error),
    Layout(LayoutError),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Layout(err) => write!(f, "layout error: {err}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Layout(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<LayoutError> for PersistenceError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}
