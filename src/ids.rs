use crate::error::LayoutError;

/// Identifies a [`crate::View`] (one tab) within a workspace.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct ViewId(u64);

impl ViewId {
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a tree node: a [`crate::TabGroup`] or a [`crate::SplitNode`].
///
/// Ids are strings so that ids chosen by the host app (`"sidebar"`, `"viewer"`) survive a
/// save/load cycle unchanged.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Per-session id source.
///
/// Create one per editing session, use it while assembling the initial views and groups, then
/// hand it to the [`crate::Workspace`], which owns it from then on.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    /// `None` once `u64::MAX` has been handed out or reserved.
    next_view_id: Option<u64>,
    next_node_serial: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_view_id: Some(1),
            next_node_serial: 1,
        }
    }

    /// # Errors
    /// [`LayoutError::ViewIdsExhausted`] once the id space is used up, which only happens after
    /// reserving an id at `u64::MAX`.
    pub fn next_view_id(&mut self) -> Result<ViewId, LayoutError> {
        let id = self.next_view_id.ok_or(LayoutError::ViewIdsExhausted)?;
        self.next_view_id = id.checked_add(1);
        Ok(ViewId(id))
    }

    /// Make sure ids handed out later never collide with `id` (e.g. after loading a layout).
    pub fn reserve_view_id(&mut self, id: ViewId) {
        let Some(next) = self.next_view_id else {
            return;
        };
        if id.0 < next {
            return;
        }
        self.next_view_id = id.0.checked_add(1);
        if self.next_view_id.is_none() {
            log::warn!("view id {id} reserved; no fresh view ids remain");
        }
    }

    /// A fresh node id of the form `{prefix}-{serial}`.
    ///
    /// Uniqueness against ids the host chose itself is checked by the tree that inserts it.
    pub fn next_node_id(&mut self, prefix: &str) -> NodeId {
        let serial = self.next_node_serial;
        self.next_node_serial = self.next_node_serial.saturating_add(1);
        NodeId(format!("{prefix}-{serial}"))
    }
}
