//! Dockable panel layout model: tab groups nested in split nodes, rearranged by drag and drop
//! and persisted as JSON.
//!
//! The crate holds no rendering code. A UI layer reads the tree through [`Workspace`], maps each
//! [`View`]'s [`ComponentKey`] to a widget, and feeds drop events back as [`Workspace::move_tab`]
//! and [`Workspace::split_group`] calls.

#![forbid(unsafe_code)]

mod error;
mod ids;
mod integrity;
mod nodes;
mod options;
mod persistence;
mod registry;
mod split;
mod tab_group;
mod view;
mod workspace;


pub use error::{LayoutError, PersistenceError, ResolutionError};
pub use ids::{IdAllocator, NodeId, ViewId};
pub use nodes::{Node, Nodes};
pub use options::{SizingPolicy, WorkspaceOptions};
pub use persistence::{NodeJson, SplitNodeJson, TabGroupJson, ViewJson, WorkspaceJson};
pub use registry::{ComponentKey, ViewDefinition, ViewRegistry};
pub use split::{Orientation, Placement, SplitNode};
pub use tab_group::TabGroup;
pub use view::View;
pub use workspace::Workspace;
