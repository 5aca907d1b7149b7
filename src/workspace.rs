use itertools::Itertools as _;

use crate::error::LayoutError;
use crate::ids::{IdAllocator, NodeId, ViewId};
use crate::nodes::{Node, Nodes};
use crate::options::WorkspaceOptions;
use crate::split::{Placement, SplitNode};
use crate::tab_group::TabGroup;
use crate::view::View;

/// The whole dock layout of one editing session: a tree of [`SplitNode`]s with
/// [`TabGroup`] leaves, plus the focused group.
///
/// Mutations are meant to be driven by drag-and-drop input. They run to completion and leave
/// every tree invariant intact before returning. Stale ids and locked targets turn a mutation
/// into a no-op (logged at `debug`), never into an error, because drags race with content
/// loading and closing tabs.
#[derive(Clone, Debug)]
pub struct Workspace {
    nodes: Nodes,
    root: NodeId,
    active_group_id: Option<NodeId>,
    ids: IdAllocator,
    options: WorkspaceOptions,
}

impl Workspace {
    /// An empty workspace: one empty tab group as root, which is also the active group.
    pub fn new(mut ids: IdAllocator) -> Self {
        let mut nodes = Nodes::default();
        let root = TabGroup::new(&mut ids);
        let root_id = root.id().clone();
        nodes.insert_node(Node::Group(root));

        Self {
            nodes,
            root: root_id.clone(),
            active_group_id: Some(root_id),
            ids,
            options: WorkspaceOptions::default(),
        }
    }

    /// Adopt a tree assembled in `nodes`. The first tab group (pre-order) becomes active.
    ///
    /// # Errors
    /// `root` is not in `nodes`, or it has a parent.
    pub fn with_root(nodes: Nodes, root: NodeId, ids: IdAllocator) -> Result<Self, LayoutError> {
        let node = nodes
            .get(&root)
            .ok_or_else(|| LayoutError::MissingNode { id: root.clone() })?;
        if let Some(parent) = node.parent() {
            return Err(LayoutError::AlreadyAttached {
                id: root.clone(),
                parent: parent.clone(),
            });
        }

        let mut workspace = Self::from_parts(nodes, root, None, ids);
        let first = workspace.tab_groups().next().map(|g| g.id().clone());
        workspace.active_group_id = first;
        Ok(workspace)
    }

    pub(crate) fn from_parts(
        mut nodes: Nodes,
        root: NodeId,
        active_group_id: Option<NodeId>,
        mut ids: IdAllocator,
    ) -> Self {
        let options = WorkspaceOptions::default();
        nodes.set_sizing(options.sizing);
        nodes.set_size(&root, 100.0);

        let view_ids: Vec<ViewId> = nodes
            .ids()
            .filter_map(|id| nodes.group(id))
            .flat_map(|g| g.views().iter().map(View::id))
            .collect();
        for id in view_ids {
            ids.reserve_view_id(id);
        }

        Self {
            nodes,
            root,
            active_group_id,
            ids,
            options,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: WorkspaceOptions) -> Self {
        self.nodes.set_sizing(options.sizing);
        self.options = options;
        self
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    /// Low-level access to the arena, e.g. to rename tabs or resize splits.
    ///
    /// Structural edits made here skip the workspace's lock checks and cleanup.
    pub fn nodes_mut(&mut self) -> &mut Nodes {
        &mut self.nodes
    }

    /// The session's id source, for creating views to open later.
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.get(&self.root)
    }

    pub fn group(&self, id: &NodeId) -> Option<&TabGroup> {
        self.nodes.group(id)
    }

    /// Every node reachable from the root, pre-order, children in order.
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![&self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }

    fn tab_groups(&self) -> impl Iterator<Item = &TabGroup> + '_ {
        self.walk().into_iter().filter_map(Node::as_group)
    }

    /// Every tab group, in pre-order.
    pub fn all_tab_groups(&self) -> Vec<&TabGroup> {
        self.tab_groups().collect()
    }

    pub fn find_group_with_view(&self, view_id: ViewId) -> Option<&TabGroup> {
        self.tab_groups().find(|g| g.contains(view_id))
    }

    pub fn find_group_with_path(&self, path: &str) -> Option<&TabGroup> {
        self.tab_groups()
            .find(|g| g.views().iter().any(|v| v.path.as_deref() == Some(path)))
    }

    pub fn find_view(&self, view_id: ViewId) -> Option<&View> {
        self.find_group_with_view(view_id)
            .and_then(|g| g.view(view_id))
    }

    pub fn find_view_with_path(&self, path: &str) -> Option<&View> {
        self.tab_groups()
            .flat_map(|g| g.views().iter())
            .find(|v| v.path.as_deref() == Some(path))
    }

    pub fn active_group_id(&self) -> Option<&NodeId> {
        self.active_group_id.as_ref()
    }

    /// The focused group; `None` if unset or the group has since been cleaned up.
    pub fn active_group(&self) -> Option<&TabGroup> {
        self.active_group_id.as_ref().and_then(|id| self.nodes.group(id))
    }

    pub fn set_active_group(&mut self, group_id: &NodeId) -> bool {
        if self.nodes.group(group_id).is_none() {
            log::debug!("set_active_group: no group {group_id}");
            return false;
        }
        self.active_group_id = Some(group_id.clone());
        true
    }

    pub fn clear_active_group(&mut self) {
        self.active_group_id = None;
    }

    /// Select a tab and focus its group.
    pub fn set_active_view(&mut self, view_id: ViewId) -> bool {
        let Some(group_id) = self.group_id_with_view(view_id) else {
            log::debug!("set_active_view: no view {view_id}");
            return false;
        };
        if let Some(group) = self.nodes.group_mut(&group_id) {
            group.set_active(view_id);
        }
        self.active_group_id = Some(group_id);
        true
    }

    /// Drop a tab onto another group's tab strip (appended).
    pub fn move_tab(&mut self, view_id: ViewId, target_group: &NodeId) -> bool {
        self.move_tab_to(view_id, target_group, None)
    }

    /// Drop a tab onto a group's tab strip at `index` (clamped; `None` appends).
    ///
    /// Refused when either group or the view is locked. Dropping onto the view's own group
    /// reorders (if `index` is given) and selects it. An emptied source group is cleaned up.
    pub fn move_tab_to(
        &mut self,
        view_id: ViewId,
        target_group: &NodeId,
        index: Option<usize>,
    ) -> bool {
        let Some(source_id) = self.group_id_with_view(view_id) else {
            log::debug!("move_tab: no view {view_id}");
            return false;
        };
        let Some(target) = self.nodes.group(target_group) else {
            log::debug!("move_tab: no target group {target_group}");
            return false;
        };
        let target_locked = target.locked;
        let Some(source) = self.nodes.group(&source_id) else {
            return false;
        };
        let view_locked = source.view(view_id).is_some_and(|v| v.locked);
        if source.locked || target_locked || view_locked {
            log::debug!(
                "move_tab: refused {view_id} from {source_id} to {target_group} (locked: source={} target={target_locked} view={view_locked})",
                source.locked
            );
            return false;
        }

        if source_id == *target_group {
            if let Some(group) = self.nodes.group_mut(target_group) {
                if let Some(index) = index {
                    group.reorder_tab(view_id, index);
                }
                group.set_active(view_id);
            }
            self.active_group_id = Some(source_id);
            self.after_mutation("move_tab");
            return true;
        }

        let Some(view) = self
            .nodes
            .group_mut(&source_id)
            .and_then(|g| g.remove_tab(view_id))
        else {
            return false;
        };
        if let Some(target) = self.nodes.group_mut(target_group) {
            target.add_tab(view, index);
        }
        self.active_group_id = Some(target_group.clone());

        if self.nodes.group(&source_id).is_some_and(TabGroup::is_empty) {
            self.cleanup_empty_group(&source_id);
        }
        self.after_mutation("move_tab");
        true
    }

    /// Drop a tab on the edge of a group: the view moves into a new group placed beside
    /// `group_id`, and the new group becomes active. Returns the new group's id.
    ///
    /// If `group_id` already sits in a split along the placement's axis, the new group joins
    /// that split next to it instead of nesting a new one. The source group is left in place
    /// even if the move emptied it (see [`Self::prune_empty_groups`]) unless
    /// [`WorkspaceOptions::prune_after_split`] is set.
    pub fn split_group(
        &mut self,
        group_id: &NodeId,
        view_id: ViewId,
        placement: Placement,
    ) -> Option<NodeId> {
        let Some(target) = self.nodes.group(group_id) else {
            log::debug!("split_group: no group {group_id}");
            return None;
        };
        let target_locked = target.locked;
        let target_parent = target.parent().cloned();
        let Some(source_id) = self.group_id_with_view(view_id) else {
            log::debug!("split_group: no view {view_id}");
            return None;
        };
        let source = self.nodes.group(&source_id)?;
        let view_locked = source.view(view_id).is_some_and(|v| v.locked);
        if target_locked || source.locked || view_locked {
            log::debug!(
                "split_group: refused {view_id} beside {group_id} (locked: target={target_locked} source={} view={view_locked})",
                source.locked
            );
            return None;
        }

        let view = self.nodes.group_mut(&source_id)?.remove_tab(view_id)?;
        let new_id = self.fresh_node_id("group");
        let mut new_group = TabGroup::with_id(new_id.clone());
        new_group.add_tab(view, None);
        self.nodes.insert_node(Node::Group(new_group));

        let orientation = placement.orientation();
        let aligned_parent = target_parent
            .as_ref()
            .filter(|p| self.nodes.split(p).is_some_and(|s| s.orientation() == orientation));

        if let Some(parent) = aligned_parent {
            let index = self
                .nodes
                .split(parent)
                .and_then(|s| s.position(group_id))
                .map(|i| if placement.is_before() { i } else { i + 1 });
            self.nodes.add_child(parent, new_id.clone(), index);
        } else {
            let split_id = self.fresh_node_id("split");
            self.nodes
                .insert_node(Node::Split(SplitNode::with_id(split_id.clone(), orientation)));
            match &target_parent {
                Some(parent) => {
                    self.nodes.replace_child(parent, group_id, split_id.clone());
                }
                None => {
                    self.root = split_id.clone();
                    self.nodes.set_size(&split_id, 100.0);
                }
            }
            let (first, second) = if placement.is_before() {
                (new_id.clone(), group_id.clone())
            } else {
                (group_id.clone(), new_id.clone())
            };
            self.nodes.add_child(&split_id, first, None);
            self.nodes.add_child(&split_id, second, None);
        }

        self.active_group_id = Some(new_id.clone());
        log::trace!("split_group: {view_id} now in {new_id} ({placement:?} of {group_id})");

        if self.options.prune_after_split
            && self.nodes.group(&source_id).is_some_and(TabGroup::is_empty)
        {
            self.cleanup_empty_group(&source_id);
        }
        self.after_mutation("split_group");
        Some(new_id)
    }

    /// Close a tab wherever it is. An emptied group is cleaned up.
    ///
    /// Locks are not checked here: they protect against drag operations, not closing.
    pub fn remove_tab(&mut self, view_id: ViewId) -> Option<View> {
        let group_id = self.group_id_with_view(view_id)?;
        let view = self.nodes.group_mut(&group_id)?.remove_tab(view_id)?;
        if self.nodes.group(&group_id).is_some_and(TabGroup::is_empty) {
            self.cleanup_empty_group(&group_id);
        }
        self.after_mutation("remove_tab");
        Some(view)
    }

    /// Show `view`: focus an open view with the same path, otherwise add it to the active
    /// group (or the first unlocked one). Returns the id of the view now shown.
    pub fn open_view(&mut self, view: View) -> Option<ViewId> {
        if let Some(path) = view.path.as_deref() {
            if let Some(existing) = self.find_view_with_path(path).map(View::id) {
                self.set_active_view(existing);
                return Some(existing);
            }
        }
        if self.find_view(view.id()).is_some() {
            log::debug!("open_view: view id {} is already open", view.id());
            return None;
        }

        let target = self
            .active_group()
            .filter(|g| !g.locked)
            .or_else(|| self.tab_groups().find(|g| !g.locked))
            .map(|g| g.id().clone());
        let Some(target) = target else {
            log::debug!("open_view: every group is locked");
            return None;
        };

        self.ids.reserve_view_id(view.id());
        let id = self.nodes.group_mut(&target)?.add_tab(view, None);
        self.active_group_id = Some(target);
        self.after_mutation("open_view");
        Some(id)
    }

    /// Clean up every empty group except an empty root. Returns how many groups were removed.
    pub fn prune_empty_groups(&mut self) -> usize {
        let mut pruned = 0;
        loop {
            let empty = self
                .tab_groups()
                .find(|g| g.is_empty() && *g.id() != self.root)
                .map(|g| g.id().clone());
            let Some(empty) = empty else {
                break;
            };
            if !self.cleanup_empty_group(&empty) {
                break;
            }
            pruned += 1;
        }
        if pruned > 0 {
            self.after_mutation("prune_empty_groups");
        }
        pruned
    }

    /// Indented outline of the tree, for logs and test failure messages.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        self.describe_node(&self.root, 0, &mut lines);
        lines.join("\n")
    }

    fn describe_node(&self, id: &NodeId, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        match self.nodes.get(id) {
            None => lines.push(format!("{indent}{id} MISSING")),
            Some(Node::Group(group)) => {
                let tabs = group
                    .views()
                    .iter()
                    .map(|v| {
                        if v.is_active() {
                            format!("*{}", v.name())
                        } else {
                            v.name().to_owned()
                        }
                    })
                    .join(", ");
                let locked = if group.locked { " locked" } else { "" };
                lines.push(format!(
                    "{indent}{id} tabs size={:.1}{locked} [{tabs}]",
                    group.size()
                ));
            }
            Some(Node::Split(split)) => {
                lines.push(format!(
                    "{indent}{id} {:?} size={:.1}",
                    split.orientation(),
                    split.size()
                ));
                for child in split.children() {
                    self.describe_node(child, depth + 1, lines);
                }
            }
        }
    }

    fn group_id_with_view(&self, view_id: ViewId) -> Option<NodeId> {
        self.find_group_with_view(view_id).map(|g| g.id().clone())
    }

    fn fresh_node_id(&mut self, prefix: &str) -> NodeId {
        loop {
            let id = self.ids.next_node_id(prefix);
            if !self.nodes.contains(&id) {
                return id;
            }
        }
    }

    fn discard(&mut self, id: &NodeId) {
        log::trace!("discard node {id}");
        self.nodes.remove(id);
        if self.active_group_id.as_ref() == Some(id) {
            self.active_group_id = None;
        }
    }

    /// Remove an empty non-root group from its parent and collapse what that leaves behind.
    fn cleanup_empty_group(&mut self, group_id: &NodeId) -> bool {
        if *group_id == self.root {
            log::trace!("keeping empty root group {group_id}");
            return false;
        }
        let Some(parent) = self.nodes.get(group_id).and_then(Node::parent).cloned() else {
            return false;
        };
        self.nodes.remove_child(&parent, group_id);
        self.discard(group_id);
        self.collapse(parent);
        true
    }

    /// Walk upwards from `split_id`, removing splits with no children and replacing splits
    /// with a single child by that child.
    fn collapse(&mut self, mut split_id: NodeId) {
        loop {
            let Some(split) = self.nodes.split(&split_id) else {
                return;
            };
            let parent = split.parent().cloned();
            let size = split.size();
            let children = split.children().to_vec();

            match children.as_slice() {
                [] => {
                    self.discard(&split_id);
                    match parent {
                        Some(parent) => {
                            self.nodes.remove_child(&parent, &split_id);
                            split_id = parent;
                        }
                        None => {
                            let root = TabGroup::with_id(self.fresh_node_id("group"));
                            self.root = root.id().clone();
                            self.nodes.insert_node(Node::Group(root));
                            return;
                        }
                    }
                }
                [only] => {
                    let only = only.clone();
                    log::trace!("collapse {split_id} into {only}");
                    self.nodes.remove_child(&split_id, &only);
                    match &parent {
                        Some(parent) => {
                            self.nodes.replace_child(parent, &split_id, only);
                        }
                        None => {
                            self.nodes.set_size(&only, size);
                            self.root = only;
                        }
                    }
                    self.discard(&split_id);
                    match parent {
                        Some(parent) => split_id = parent,
                        None => return,
                    }
                }
                _ => return,
            }
        }
    }

    fn after_mutation(&self, operation: &str) {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("after {operation}:\n{}", self.describe());
        }
        if self.options.debug_integrity {
            for issue in self.integrity_issues() {
                log::error!("{operation}: {issue}");
            }
        }
    }
}
