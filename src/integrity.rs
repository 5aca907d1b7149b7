use ahash::{HashMap, HashSet};

use crate::ids::{NodeId, ViewId};
use crate::nodes::Node;
use crate::workspace::Workspace;

pub(crate) const SIZE_TOLERANCE: f32 = 0.01;

impl Workspace {
    /// Human-readable violations of the tree invariants; empty when the tree is sound.
    pub fn integrity_issues(&self) -> Vec<String> {
        workspace_integrity_issues(self)
    }
}

pub(crate) fn workspace_integrity_issues(workspace: &Workspace) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();
    let nodes = workspace.nodes();
    let root = workspace.root();

    let Some(root_node) = nodes.get(root) else {
        issues.push(format!("integrity: root {root} missing"));
        return issues;
    };
    if let Some(parent) = root_node.parent() {
        issues.push(format!("integrity: root {root} has parent {parent}"));
    }

    let mut visited: HashSet<&NodeId> = HashSet::default();
    let mut parent_of: HashMap<&NodeId, &NodeId> = HashMap::default();
    let mut view_owner: HashMap<ViewId, &NodeId> = HashMap::default();
    let mut stack: Vec<&NodeId> = vec![root];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            issues.push(format!("integrity: node {id} reached twice"));
            continue;
        }

        let Some(node) = nodes.get(id) else {
            issues.push(format!("integrity: missing node {id} (reachable)"));
            continue;
        };
        if node.id() != id {
            issues.push(format!("integrity: node stored as {id} reports id {}", node.id()));
        }

        match node {
            Node::Group(group) => {
                for view in group.views() {
                    if let Some(owner) = view_owner.insert(view.id(), id) {
                        issues.push(format!(
                            "integrity: view {} in both {owner} and {id}",
                            view.id()
                        ));
                    }
                }

                if let Some(active) = group.active_view_id() {
                    if !group.contains(active) {
                        issues.push(format!(
                            "integrity: group {id} active view {active} not among its views"
                        ));
                    }
                }

                let flagged: Vec<ViewId> = group
                    .views()
                    .iter()
                    .filter(|v| v.is_active())
                    .map(|v| v.id())
                    .collect();
                let expected: Vec<ViewId> = group.active_view_id().into_iter().collect();
                if flagged != expected {
                    issues.push(format!(
                        "integrity: group {id} views flagged active {flagged:?}, expected {expected:?}"
                    ));
                }
            }
            Node::Split(split) => {
                if split.children().is_empty() {
                    issues.push(format!("integrity: split {id} has no children"));
                    continue;
                }

                let mut local_set: HashSet<&NodeId> = HashSet::default();
                let mut total = 0.0;
                for child in split.children() {
                    if !local_set.insert(child) {
                        issues.push(format!(
                            "integrity: split {id} contains duplicate child {child}"
                        ));
                        continue;
                    }
                    let Some(child_node) = nodes.get(child) else {
                        issues.push(format!(
                            "integrity: split {id} references missing child {child}"
                        ));
                        continue;
                    };
                    if child_node.parent() != Some(id) {
                        issues.push(format!(
                            "integrity: child {child} of {id} has parent {:?}",
                            child_node.parent().map(NodeId::as_str)
                        ));
                    }
                    if let Some(prev_parent) = parent_of.insert(child, id) {
                        issues.push(format!(
                            "integrity: child {child} has multiple parents {prev_parent} and {id}"
                        ));
                    }
                    total += child_node.size();
                    stack.push(child);
                }

                if (total - 100.0).abs() > SIZE_TOLERANCE {
                    issues.push(format!(
                        "integrity: children of split {id} sum to {total:.3}, not 100"
                    ));
                }
            }
        }
    }

    if visited.len() != nodes.len() {
        let mut unreachable: Vec<&str> = nodes
            .ids()
            .filter(|id| !visited.contains(id))
            .map(NodeId::as_str)
            .collect();
        unreachable.sort_unstable();
        issues.push(format!("integrity: unreachable nodes {unreachable:?}"));
    }

    issues
}
