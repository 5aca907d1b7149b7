use ahash::{HashMap, HashSet};

use crate::error::LayoutError;
use crate::ids::{NodeId, ViewId};
use crate::options::SizingPolicy;
use crate::split::SplitNode;
use crate::tab_group::TabGroup;

/// A node of the layout tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Group(TabGroup),
    Split(SplitNode),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Group(group) => group.id(),
            Self::Split(split) => split.id(),
        }
    }

    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            Self::Group(group) => group.parent(),
            Self::Split(split) => split.parent(),
        }
    }

    pub fn size(&self) -> f32 {
        match self {
            Self::Group(group) => group.size(),
            Self::Split(split) => split.size(),
        }
    }

    /// Child ids; always empty for a tab group.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Group(_) => &[],
            Self::Split(split) => split.children(),
        }
    }

    pub fn as_group(&self) -> Option<&TabGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Split(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            Self::Split(split) => Some(split),
            Self::Group(_) => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Group(group) => group.set_parent(parent),
            Self::Split(split) => split.set_parent(parent),
        }
    }

    pub(crate) fn set_size(&mut self, size: f32) {
        match self {
            Self::Group(group) => group.set_size(size),
            Self::Split(split) => split.set_size(size),
        }
    }
}

/// Arena holding every node of one layout tree, keyed by [`NodeId`].
///
/// Split nodes own their children by id; `parent` fields are plain back-references kept in
/// sync by [`Self::add_child`], [`Self::remove_child`] and [`Self::replace_child`]. Those
/// three return `false` instead of failing when an id is stale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Nodes {
    nodes: HashMap<NodeId, Node>,
    sizing: SizingPolicy,
}

impl Nodes {
    pub fn new(sizing: SizingPolicy) -> Self {
        Self {
            nodes: HashMap::default(),
            sizing,
        }
    }

    pub fn sizing(&self) -> SizingPolicy {
        self.sizing
    }

    pub fn set_sizing(&mut self, sizing: SizingPolicy) {
        self.sizing = sizing;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All node ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.keys()
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn group(&self, id: &NodeId) -> Option<&TabGroup> {
        self.get(id).and_then(Node::as_group)
    }

    /// Mutable access to a group's tabs. The group's place in the tree can't change through it.
    pub fn group_mut(&mut self, id: &NodeId) -> Option<&mut TabGroup> {
        match self.nodes.get_mut(id) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn split(&self, id: &NodeId) -> Option<&SplitNode> {
        self.get(id).and_then(Node::as_split)
    }

    fn split_mut(&mut self, id: &NodeId) -> Option<&mut SplitNode> {
        match self.nodes.get_mut(id) {
            Some(Node::Split(split)) => Some(split),
            _ => None,
        }
    }

    /// Insert a detached group.
    ///
    /// # Errors
    /// The group id is taken, or one of its views has an id already used in this arena.
    pub fn insert_group(&mut self, group: TabGroup) -> Result<NodeId, LayoutError> {
        if self.contains(group.id()) {
            return Err(LayoutError::DuplicateNode {
                id: group.id().clone(),
            });
        }

        let mut in_use = self.view_ids();
        for view in group.views() {
            if !in_use.insert(view.id()) {
                return Err(LayoutError::DuplicateView { id: view.id() });
            }
        }

        let id = group.id().clone();
        self.insert_node(Node::Group(group));
        Ok(id)
    }

    /// Insert a split node over already inserted, detached `children`; sizes become equal shares.
    ///
    /// # Errors
    /// No children, a duplicate or missing id, or a child that already has a parent.
    pub fn insert_split(
        &mut self,
        mut split: SplitNode,
        children: Vec<NodeId>,
    ) -> Result<NodeId, LayoutError> {
        let id = split.id().clone();
        if children.is_empty() {
            return Err(LayoutError::EmptySplit { id });
        }
        if self.contains(&id) {
            return Err(LayoutError::DuplicateNode { id });
        }

        let mut seen: HashSet<&NodeId> = HashSet::default();
        for child in &children {
            if *child == id || !seen.insert(child) {
                return Err(LayoutError::DuplicateNode { id: child.clone() });
            }
            let node = self
                .get(child)
                .ok_or_else(|| LayoutError::MissingNode { id: child.clone() })?;
            if let Some(parent) = node.parent() {
                return Err(LayoutError::AlreadyAttached {
                    id: child.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let share = 100.0 / children.len() as f32;
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.set_parent(Some(id.clone()));
                node.set_size(share);
            }
        }

        split.children = children;
        self.insert_node(Node::Split(split));
        Ok(id)
    }

    pub(crate) fn insert_node(&mut self, node: Node) {
        log::trace!("insert node {}", node.id());
        self.nodes.insert(node.id().clone(), node);
    }

    pub(crate) fn remove(&mut self, id: &NodeId) -> Option<Node> {
        self.nodes.remove(id)
    }

    fn view_ids(&self) -> HashSet<ViewId> {
        self.nodes
            .values()
            .filter_map(Node::as_group)
            .flat_map(|group| group.views().iter().map(|v| v.id()))
            .collect()
    }

    /// Is `candidate` equal to `node` or one of its ancestors?
    fn is_ancestor_or_self(&self, candidate: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get(id).and_then(Node::parent);
        }
        false
    }

    fn can_attach(&self, split_id: &NodeId, child: &NodeId) -> bool {
        let Some(node) = self.get(child) else {
            log::debug!("attach {child} to {split_id}: no such node");
            return false;
        };
        if let Some(parent) = node.parent() {
            log::debug!("attach {child} to {split_id}: already a child of {parent}");
            return false;
        }
        if self.is_ancestor_or_self(child, split_id) {
            log::debug!("attach {child} to {split_id}: would create a cycle");
            return false;
        }
        true
    }

    /// Insert a detached `child` at `index` (clamped, default: append) and redistribute sizes.
    pub fn add_child(&mut self, split_id: &NodeId, child: NodeId, index: Option<usize>) -> bool {
        if self.split(split_id).is_none() || !self.can_attach(split_id, &child) {
            return false;
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.set_parent(Some(split_id.clone()));
        }
        if let Some(split) = self.split_mut(split_id) {
            let index = index.unwrap_or(split.children.len()).min(split.children.len());
            split.children.insert(index, child.clone());
        }
        self.redistribute(split_id, Some(&child));
        true
    }

    /// Detach `child` (it stays in the arena) and redistribute the remaining sizes.
    ///
    /// A split left with no children must be cleaned up by the caller.
    pub fn remove_child(&mut self, split_id: &NodeId, child: &NodeId) -> bool {
        let Some(split) = self.split_mut(split_id) else {
            return false;
        };
        let Some(index) = split.position(child) else {
            return false;
        };
        split.children.remove(index);

        if let Some(node) = self.nodes.get_mut(child) {
            node.set_parent(None);
        }
        self.redistribute(split_id, None);
        true
    }

    /// Put detached `new` where `old` was, handing over `old`'s size. `old` is detached.
    pub fn replace_child(&mut self, split_id: &NodeId, old: &NodeId, new: NodeId) -> bool {
        let Some(index) = self.split(split_id).and_then(|s| s.position(old)) else {
            return false;
        };
        if !self.can_attach(split_id, &new) {
            return false;
        }

        let size = self.get(old).map_or(100.0, Node::size);
        if let Some(node) = self.nodes.get_mut(old) {
            node.set_parent(None);
        }
        if let Some(node) = self.nodes.get_mut(&new) {
            node.set_parent(Some(split_id.clone()));
            node.set_size(size);
        }
        if let Some(split) = self.split_mut(split_id) {
            split.children[index] = new;
        }
        true
    }

    /// Assign custom proportions (e.g. after the user dragged a divider), normalized to 100.
    pub fn set_child_sizes(&mut self, split_id: &NodeId, sizes: &[f32]) -> bool {
        let Some(children) = self.split(split_id).map(|s| s.children.clone()) else {
            return false;
        };
        if sizes.len() != children.len() || sizes.iter().any(|s| !s.is_finite() || *s < 0.0) {
            log::debug!("set_child_sizes on {split_id}: rejected {sizes:?}");
            return false;
        }
        for (child, size) in children.iter().zip(sizes.iter().copied()) {
            self.set_size(child, size);
        }
        self.normalize_sizes(split_id);
        true
    }

    /// Scale the children's sizes so they sum to 100, keeping their proportions.
    /// Falls back to equal shares when the current sizes are unusable.
    pub fn normalize_sizes(&mut self, split_id: &NodeId) {
        let Some(children) = self.split(split_id).map(|s| s.children.clone()) else {
            return;
        };
        self.scale_to(&children, 100.0);
    }

    fn redistribute(&mut self, split_id: &NodeId, fresh: Option<&NodeId>) {
        let Some(children) = self.split(split_id).map(|s| s.children.clone()) else {
            return;
        };
        if children.is_empty() {
            return;
        }
        let share = 100.0 / children.len() as f32;

        match self.sizing {
            SizingPolicy::EqualShares => {
                for child in &children {
                    self.set_size(child, share);
                }
            }
            SizingPolicy::Proportional => {
                let others: Vec<NodeId> = children
                    .iter()
                    .filter(|c| Some(*c) != fresh)
                    .cloned()
                    .collect();
                let budget = match fresh {
                    Some(fresh) => {
                        self.set_size(fresh, share);
                        100.0 - share
                    }
                    None => 100.0,
                };
                self.scale_to(&others, budget);
            }
        }
    }

    fn scale_to(&mut self, ids: &[NodeId], budget: f32) {
        if ids.is_empty() {
            return;
        }
        let total: f32 = ids.iter().filter_map(|id| self.get(id)).map(Node::size).sum();
        if total.is_finite() && total > 0.0 {
            let factor = budget / total;
            for id in ids {
                let size = self.get(id).map_or(0.0, Node::size);
                self.set_size(id, size * factor);
            }
        } else {
            let share = budget / ids.len() as f32;
            for id in ids {
                self.set_size(id, share);
            }
        }
    }

    pub(crate) fn set_size(&mut self, id: &NodeId, size: f32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_size(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;
    use crate::registry::ComponentKey;
    use crate::split::Orientation;
    use crate::view::View;

    fn sizes(nodes: &Nodes, split: &NodeId) -> Vec<f32> {
        nodes
            .split(split)
            .unwrap()
            .children()
            .iter()
            .map(|c| nodes.get(c).unwrap().size())
            .collect()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.01, "{actual:?} vs {expected:?}");
        }
    }

    struct Fixture {
        ids: IdAllocator,
        nodes: Nodes,
        split: NodeId,
        tg1: NodeId,
        tg2: NodeId,
    }

    /// `split(horizontal) -> [tg1]`, plus a detached `tg2`.
    fn fixture(sizing: SizingPolicy) -> Fixture {
        let mut ids = IdAllocator::new();
        let mut nodes = Nodes::new(sizing);
        let view_a = View::new(&mut ids, "View A", ComponentKey::new("a")).unwrap();
        let view_b = View::new(&mut ids, "View B", ComponentKey::new("b")).unwrap();
        let tg1 = nodes
            .insert_group(TabGroup::with_id("tg1").with_views([view_a]))
            .unwrap();
        let tg2 = nodes
            .insert_group(TabGroup::with_id("tg2").with_views([view_b]))
            .unwrap();
        let split = nodes
            .insert_split(SplitNode::with_id("sn", Orientation::Horizontal), vec![tg1.clone()])
            .unwrap();
        Fixture {
            ids,
            nodes,
            split,
            tg1,
            tg2,
        }
    }

    #[test]
    fn add_child_resets_to_equal_shares() {
        let Fixture {
            mut nodes,
            split,
            tg2,
            ..
        } = fixture(SizingPolicy::EqualShares);
        assert_close(&sizes(&nodes, &split), &[100.0]);

        assert!(nodes.add_child(&split, tg2.clone(), None));
        assert_eq!(nodes.split(&split).unwrap().children()[1], tg2);
        assert_eq!(nodes.get(&tg2).unwrap().parent(), Some(&split));
        assert_eq!(sizes(&nodes, &split), [50.0, 50.0]);
    }

    #[test]
    fn add_child_at_index() {
        let Fixture {
            mut ids,
            mut nodes,
            split,
            tg2,
            ..
        } = fixture(SizingPolicy::EqualShares);
        let tg3 = nodes.insert_group(TabGroup::new(&mut ids)).unwrap();

        nodes.add_child(&split, tg2, None);
        nodes.add_child(&split, tg3.clone(), Some(1));
        assert_eq!(nodes.split(&split).unwrap().children()[1], tg3);
        assert_close(&sizes(&nodes, &split), &[33.33, 33.33, 33.33]);
    }

    #[test]
    fn add_child_refuses_attached_or_missing() {
        let Fixture {
            mut nodes,
            split,
            tg1,
            ..
        } = fixture(SizingPolicy::EqualShares);
        assert!(!nodes.add_child(&split, tg1, None));
        assert!(!nodes.add_child(&split, NodeId::new("nope"), None));
        assert!(!nodes.add_child(&NodeId::new("nope"), NodeId::new("tg2"), None));
        assert_eq!(nodes.split(&split).unwrap().children().len(), 1);
    }

    #[test]
    fn add_child_refuses_cycles() {
        let Fixture {
            mut ids,
            mut nodes,
            split,
            ..
        } = fixture(SizingPolicy::EqualShares);
        let outer = nodes
            .insert_split(SplitNode::new(&mut ids, Orientation::Vertical), vec![split.clone()])
            .unwrap();
        assert!(!nodes.add_child(&split, outer.clone(), None));
        assert!(!nodes.add_child(&outer, outer.clone(), None));
    }

    #[test]
    fn remove_child_detaches_and_renormalizes() {
        let Fixture {
            mut nodes,
            split,
            tg1,
            tg2,
            ..
        } = fixture(SizingPolicy::EqualShares);
        nodes.add_child(&split, tg2.clone(), None);

        assert!(nodes.remove_child(&split, &tg1));
        assert_eq!(nodes.split(&split).unwrap().children(), [tg2]);
        assert_eq!(nodes.get(&tg1).unwrap().parent(), None);
        assert_eq!(sizes(&nodes, &split), [100.0]);

        assert!(!nodes.remove_child(&split, &tg1), "second removal is a no-op");
    }

    #[test]
    fn replace_child_hands_over_size() {
        let Fixture {
            mut ids,
            mut nodes,
            split,
            tg1,
            tg2,
        } = fixture(SizingPolicy::EqualShares);
        nodes.add_child(&split, tg2, None);
        let tg3 = nodes.insert_group(TabGroup::with_id("tg3")).unwrap();

        assert!(nodes.replace_child(&split, &tg1, tg3.clone()));
        let children = nodes.split(&split).unwrap().children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], tg3);
        assert_eq!(nodes.get(&tg3).unwrap().parent(), Some(&split));
        assert_eq!(nodes.get(&tg1).unwrap().parent(), None);
        assert_eq!(nodes.get(&tg3).unwrap().size(), 50.0);

        let stranger = nodes.insert_group(TabGroup::new(&mut ids)).unwrap();
        assert!(!nodes.replace_child(&split, &tg1, stranger), "old is no longer a child");
    }

    #[test]
    fn proportional_sizing_keeps_ratios() {
        let Fixture {
            mut ids,
            mut nodes,
            split,
            tg2,
            ..
        } = fixture(SizingPolicy::Proportional);
        nodes.add_child(&split, tg2, None);
        assert!(nodes.set_child_sizes(&split, &[75.0, 25.0]));

        let tg3 = nodes.insert_group(TabGroup::new(&mut ids)).unwrap();
        nodes.add_child(&split, tg3.clone(), None);
        // The newcomer gets a third; the others keep 3:1 within the rest.
        assert_close(&sizes(&nodes, &split), &[50.0, 16.67, 33.33]);

        nodes.remove_child(&split, &tg3);
        assert_close(&sizes(&nodes, &split), &[75.0, 25.0]);
    }

    #[test]
    fn set_child_sizes_validates_input() {
        let Fixture {
            mut nodes,
            split,
            tg2,
            ..
        } = fixture(SizingPolicy::EqualShares);
        nodes.add_child(&split, tg2, None);

        assert!(!nodes.set_child_sizes(&split, &[1.0]));
        assert!(!nodes.set_child_sizes(&split, &[f32::NAN, 1.0]));
        assert!(nodes.set_child_sizes(&split, &[1.0, 3.0]));
        assert_close(&sizes(&nodes, &split), &[25.0, 75.0]);

        assert!(nodes.set_child_sizes(&split, &[0.0, 0.0]));
        assert_close(&sizes(&nodes, &split), &[50.0, 50.0]);
    }

    #[test]
    fn insert_split_requires_children() {
        let mut nodes = Nodes::default();
        let err = nodes
            .insert_split(SplitNode::with_id("empty", Orientation::Vertical), Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::EmptySplit {
                id: NodeId::new("empty")
            }
        );
        assert!(nodes.is_empty());
    }

    #[test]
    fn insert_rejects_duplicates() {
        let Fixture {
            mut ids,
            mut nodes,
            tg1,
            ..
        } = fixture(SizingPolicy::EqualShares);

        let err = nodes.insert_group(TabGroup::with_id("tg1")).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateNode { id: tg1.clone() });

        let reused = nodes.group(&tg1).unwrap().views()[0].clone();
        let err = nodes
            .insert_group(TabGroup::new(&mut ids).with_views([reused.clone()]))
            .unwrap_err();
        assert_eq!(err, LayoutError::DuplicateView { id: reused.id() });

        let err = nodes
            .insert_split(SplitNode::new(&mut ids, Orientation::Vertical), vec![tg1.clone()])
            .unwrap_err();
        assert!(matches!(err, LayoutError::AlreadyAttached { .. }));
    }
}
