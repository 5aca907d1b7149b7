use crate::ids::{IdAllocator, NodeId, ViewId};
use crate::view::View;

/// A leaf of the layout tree: an ordered tab strip with at most one active view.
///
/// Operations on a single group never fail: unknown view ids are no-ops, since drag-and-drop
/// events can race with views closing. Lock enforcement lives in [`crate::Workspace`].
#[derive(Clone, Debug, PartialEq)]
pub struct TabGroup {
    id: NodeId,
    views: Vec<View>,
    active_view_id: Option<ViewId>,

    /// A locked group (and every view in it) is immune to drag moves and splits.
    pub locked: bool,

    parent: Option<NodeId>,
    size: f32,
}

impl TabGroup {
    /// An empty group with a generated id.
    pub fn new(ids: &mut IdAllocator) -> Self {
        Self::with_id(ids.next_node_id("group"))
    }

    pub fn with_id(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            views: Vec::new(),
            active_view_id: None,
            locked: false,
            parent: None,
            size: 100.0,
        }
    }

    /// Append `views`. The first view already flagged active wins, otherwise the first view.
    #[must_use]
    pub fn with_views(mut self, views: impl IntoIterator<Item = View>) -> Self {
        let requested = self.active_view_id;
        self.restore(views, requested);
        if self.active_view_id.is_none() {
            if let Some(first) = self.views.first().map(View::id) {
                self.set_active(first);
            }
        }
        self
    }

    #[must_use]
    pub fn with_active(mut self, view_id: ViewId) -> Self {
        self.set_active(view_id);
        self
    }

    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Owning split node, or `None` for the workspace root (or a detached group).
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Share of the parent's axis, in percent.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn contains(&self, view_id: ViewId) -> bool {
        self.position(view_id).is_some()
    }

    pub fn position(&self, view_id: ViewId) -> Option<usize> {
        self.views.iter().position(|v| v.id() == view_id)
    }

    pub fn view(&self, view_id: ViewId) -> Option<&View> {
        self.views.iter().find(|v| v.id() == view_id)
    }

    pub fn view_mut(&mut self, view_id: ViewId) -> Option<&mut View> {
        self.views.iter_mut().find(|v| v.id() == view_id)
    }

    pub fn active_view_id(&self) -> Option<ViewId> {
        self.active_view_id
    }

    pub fn active_view(&self) -> Option<&View> {
        self.active_view_id.and_then(|id| self.view(id))
    }

    /// Insert `view` at `index` (clamped, default: append) and make it the active tab.
    pub fn add_tab(&mut self, mut view: View, index: Option<usize>) -> ViewId {
        let index = index.unwrap_or(self.views.len()).min(self.views.len());
        for v in &mut self.views {
            v.set_active_flag(false);
        }
        let id = view.id();
        view.set_active_flag(true);
        self.views.insert(index, view);
        self.active_view_id = Some(id);
        id
    }

    /// Remove a view. Locked views are removed too; locks only guard drag operations.
    ///
    /// When the active view goes, the view now at the same index takes over, else the one
    /// before it.
    pub fn remove_tab(&mut self, view_id: ViewId) -> Option<View> {
        let index = self.position(view_id)?;
        let mut view = self.views.remove(index);
        view.set_active_flag(false);

        if self.active_view_id == Some(view_id) {
            self.active_view_id = None;
            let successor = self
                .views
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.views.get(i)))
                .map(View::id);
            if let Some(successor) = successor {
                self.set_active(successor);
            }
        }

        Some(view)
    }

    /// Select a tab. Unknown ids leave the current selection alone.
    pub fn set_active(&mut self, view_id: ViewId) -> bool {
        if !self.contains(view_id) {
            return false;
        }
        for v in &mut self.views {
            v.set_active_flag(v.id() == view_id);
        }
        self.active_view_id = Some(view_id);
        true
    }

    /// Move a tab to `index` (clamped) within this strip. The selection is unchanged.
    pub fn reorder_tab(&mut self, view_id: ViewId, index: usize) -> bool {
        let Some(from) = self.position(view_id) else {
            return false;
        };
        let view = self.views.remove(from);
        let index = index.min(self.views.len());
        self.views.insert(index, view);
        true
    }

    /// Load persisted views, reconciling the active selection: `requested` if it names one of
    /// the views, else the first view flagged active, else nothing.
    pub(crate) fn restore(&mut self, views: impl IntoIterator<Item = View>, requested: Option<ViewId>) {
        self.views.extend(views);

        let active = requested
            .filter(|id| self.contains(*id))
            .or_else(|| self.views.iter().find(|v| v.is_active()).map(View::id));

        match active {
            Some(id) => {
                self.set_active(id);
            }
            None => {
                self.active_view_id = None;
                for v in &mut self.views {
                    v.set_active_flag(false);
                }
            }
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_size(&mut self, size: f32) {
        self.size = size;
    }
}
