use crate::error::{LayoutError, PersistenceError};
use crate::ids::{IdAllocator, NodeId, ViewId};
use crate::integrity::SIZE_TOLERANCE;
use crate::nodes::{Node, Nodes};
use crate::registry::ViewRegistry;
use crate::split::{Orientation, SplitNode};
use crate::tab_group::TabGroup;
use crate::view::View;
use crate::workspace::Workspace;

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceJson {
    pub root: NodeJson,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_group_id: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind")]
pub enum NodeJson {
    #[serde(rename = "tabgroup")]
    TabGroup(TabGroupJson),

    #[serde(rename = "split")]
    Split(SplitNodeJson),
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroupJson {
    pub id: NodeId,

    #[serde(default)]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view_id: Option<ViewId>,

    #[serde(default)]
    pub views: Vec<ViewJson>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitNodeJson {
    pub id: NodeId,
    pub orientation: Orientation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,

    pub children: Vec<NodeJson>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewJson {
    pub id: ViewId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optical_center_fix: Option<f32>,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub locked: bool,
}

impl NodeJson {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::TabGroup(group) => &group.id,
            Self::Split(split) => &split.id,
        }
    }

    fn size(&self) -> Option<f32> {
        match self {
            Self::TabGroup(group) => group.size,
            Self::Split(split) => split.size,
        }
    }
}

impl Workspace {
    pub fn to_json(&self) -> WorkspaceJson {
        let root = self.node_json(self.root()).unwrap_or_else(|| {
            NodeJson::TabGroup(TabGroupJson {
                id: self.root().clone(),
                locked: false,
                size: Some(100.0),
                active_view_id: None,
                views: Vec::new(),
            })
        });
        let active_group_id = self
            .active_group()
            .map(|group| group.id().clone());

        WorkspaceJson {
            root,
            active_group_id,
        }
    }

    fn node_json(&self, id: &NodeId) -> Option<NodeJson> {
        let json = match self.nodes().get(id)? {
            Node::Group(group) => NodeJson::TabGroup(TabGroupJson {
                id: group.id().clone(),
                locked: group.locked,
                size: Some(group.size()),
                active_view_id: group.active_view_id(),
                views: group.views().iter().map(View::to_json).collect(),
            }),
            Node::Split(split) => NodeJson::Split(SplitNodeJson {
                id: split.id().clone(),
                orientation: split.orientation(),
                size: Some(split.size()),
                children: split
                    .children()
                    .iter()
                    .filter_map(|child| self.node_json(child))
                    .collect(),
            }),
        };
        Some(json)
    }

    /// Rebuild a workspace, resolving every view against `registry`.
    ///
    /// Views nothing in the registry matches are restored with [`ViewRegistry::unknown`] as
    /// their definition. `ids` is advanced past every restored view id.
    ///
    /// # Errors
    /// A split without children, or a node or view id used twice.
    pub fn from_json(
        json: WorkspaceJson,
        registry: &ViewRegistry,
        ids: IdAllocator,
    ) -> Result<Self, LayoutError> {
        let mut nodes = Nodes::default();
        let root = restore_node(json.root, &mut nodes, registry)?;

        let active_group_id = json.active_group_id.filter(|id| {
            let known = nodes.group(id).is_some();
            if !known {
                log::debug!("from_json: dropping active group {id}, no such tab group");
            }
            known
        });

        Ok(Self::from_parts(nodes, root, active_group_id, ids))
    }

    /// # Errors
    /// Only if serialization itself fails, which plain layout data does not do.
    pub fn to_json_string(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    /// # Errors
    /// Only if serialization itself fails, which plain layout data does not do.
    pub fn to_json_string_pretty(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    /// # Errors
    /// Malformed JSON, or a structurally invalid layout (see [`Self::from_json`]).
    pub fn from_json_str(
        json: &str,
        registry: &ViewRegistry,
        ids: IdAllocator,
    ) -> Result<Self, PersistenceError> {
        let json: WorkspaceJson = serde_json::from_str(json)?;
        Ok(Self::from_json(json, registry, ids)?)
    }
}

/// Insert `json` and its subtree into `nodes`, detached. Returns the subtree root.
fn restore_node(
    json: NodeJson,
    nodes: &mut Nodes,
    registry: &ViewRegistry,
) -> Result<NodeId, LayoutError> {
    match json {
        NodeJson::TabGroup(data) => {
            let views: Vec<View> = data
                .views
                .into_iter()
                .map(|view| restore_view(view, registry))
                .collect();
            let mut group = TabGroup::with_id(data.id).with_locked(data.locked);
            group.restore(views, data.active_view_id);
            nodes.insert_group(group)
        }
        NodeJson::Split(data) => {
            let sizes: Option<Vec<f32>> = data.children.iter().map(NodeJson::size).collect();

            let mut children = Vec::with_capacity(data.children.len());
            for child in data.children {
                children.push(restore_node(child, nodes, registry)?);
            }

            // A lone child takes the split's place; the caller assigns it the split's size.
            if let [only] = children.as_slice() {
                log::debug!("from_json: collapsing single-child split {} into {only}", data.id);
                return Ok(only.clone());
            }

            let id = nodes.insert_split(
                SplitNode::with_id(data.id, data.orientation),
                children.clone(),
            )?;
            if let Some(sizes) = sizes {
                let total: f32 = sizes.iter().sum();
                let valid = sizes.iter().all(|s| s.is_finite() && *s >= 0.0);
                if valid && (total - 100.0).abs() <= SIZE_TOLERANCE {
                    for (child, size) in children.iter().zip(sizes) {
                        nodes.set_size(child, size);
                    }
                } else {
                    nodes.set_child_sizes(&id, &sizes);
                }
            }
            Ok(id)
        }
    }
}

fn restore_view(data: ViewJson, registry: &ViewRegistry) -> View {
    let definition = match registry.resolve_view(&data.name, data.path.as_deref()) {
        Ok(definition) => definition,
        Err(err) => {
            log::warn!("{err}; restoring view {} as {:?}", data.id, registry.unknown().name);
            registry.unknown()
        }
    };
    View::from_json(data, definition)
}
