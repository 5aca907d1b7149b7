use crate::ids::{IdAllocator, NodeId};

/// Axis along which a [`SplitNode`] lays out its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Children side by side, left to right.
    Horizontal,

    /// Children stacked, top to bottom.
    Vertical,
}

/// Where a dropped view lands relative to the group it was dropped on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Left,
    Right,
    Top,
    Bottom,
}

impl Placement {
    pub fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Top | Self::Bottom => Orientation::Vertical,
        }
    }

    /// Does the new node go before the existing one along the axis?
    pub fn is_before(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// An internal node of the layout tree.
///
/// Children are ids into [`crate::Nodes`]; structural changes go through the arena so that
/// parent back-references and sizes stay consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitNode {
    id: NodeId,
    orientation: Orientation,
    pub(crate) children: Vec<NodeId>,
    parent: Option<NodeId>,
    size: f32,
}

impl SplitNode {
    pub fn new(ids: &mut IdAllocator, orientation: Orientation) -> Self {
        Self::with_id(ids.next_node_id("split"), orientation)
    }

    pub fn with_id(id: impl Into<NodeId>, orientation: Orientation) -> Self {
        Self {
            id: id.into(),
            orientation,
            children: Vec::new(),
            parent: None,
            size: 100.0,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn position(&self, child: &NodeId) -> Option<usize> {
        self.children.iter().position(|c| c == child)
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_size(&mut self, size: f32) {
        self.size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_maps_to_axis_and_side() {
        assert_eq!(Placement::Left.orientation(), Orientation::Horizontal);
        assert_eq!(Placement::Right.orientation(), Orientation::Horizontal);
        assert_eq!(Placement::Top.orientation(), Orientation::Vertical);
        assert_eq!(Placement::Bottom.orientation(), Orientation::Vertical);

        assert!(Placement::Left.is_before());
        assert!(Placement::Top.is_before());
        assert!(!Placement::Right.is_before());
        assert!(!Placement::Bottom.is_before());
    }

    #[test]
    fn placement_serializes_lowercase() {
        let json = serde_json::to_string(&Placement::Bottom).unwrap();
        assert_eq!(json, "\"bottom\"");
        let orientation: Orientation = serde_json::from_str("\"vertical\"").unwrap();
        assert_eq!(orientation, Orientation::Vertical);
    }
}
