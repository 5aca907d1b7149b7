use crate::error::LayoutError;
use crate::ids::{IdAllocator, ViewId};
use crate::persistence::ViewJson;
use crate::registry::{ComponentKey, ViewDefinition};

/// One tab: display metadata plus the component that renders it.
///
/// A view belongs to exactly one [`crate::TabGroup`] at a time; moving it between groups moves
/// the value.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    id: ViewId,

    /// Display label, never empty. May differ from the definition's static name (e.g. a
    /// collection title).
    name: String,

    /// Resolved route, e.g. `/collections/abc123`.
    pub path: Option<String>,

    /// Display hint carried through persistence untouched.
    pub optical_center_fix: Option<f32>,

    /// Locked views are immune to drag moves and splits.
    pub locked: bool,

    is_active: bool,
    component: ComponentKey,
}

impl View {
    /// # Errors
    /// [`LayoutError::EmptyViewName`] if `name` is empty.
    pub fn new(
        ids: &mut IdAllocator,
        name: impl Into<String>,
        component: ComponentKey,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LayoutError::EmptyViewName);
        }
        Ok(Self {
            id: ids.next_view_id()?,
            name,
            path: None,
            optical_center_fix: None,
            locked: false,
            is_active: false,
            component,
        })
    }

    /// A new instance of a registered definition. The path is taken verbatim, so pattern
    /// definitions usually want a [`Self::with_path`] afterwards.
    ///
    /// # Errors
    /// [`LayoutError::ViewIdsExhausted`] if `ids` has no fresh view id left.
    pub fn from_definition(
        ids: &mut IdAllocator,
        definition: &ViewDefinition,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            id: ids.next_view_id()?,
            name: definition.name.clone(),
            path: definition.path.clone(),
            optical_center_fix: None,
            locked: false,
            is_active: false,
            component: definition.component.clone(),
        })
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    #[must_use]
    pub fn with_optical_center_fix(mut self, fix: f32) -> Self {
        self.optical_center_fix = Some(fix);
        self
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the tab, e.g. once a collection's title has loaded.
    ///
    /// # Errors
    /// [`LayoutError::EmptyViewName`] if `name` is empty; the old name is kept.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), LayoutError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LayoutError::EmptyViewName);
        }
        self.name = name;
        Ok(())
    }

    /// True only while this is the active view of its owning group.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn component(&self) -> &ComponentKey {
        &self.component
    }

    pub(crate) fn set_active_flag(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn to_json(&self) -> ViewJson {
        ViewJson {
            id: self.id,
            name: self.name.clone(),
            path: self.path.clone(),
            optical_center_fix: self.optical_center_fix,
            is_active: self.is_active,
            locked: self.locked,
        }
    }

    /// Rebuild a persisted view, keeping its per-instance name and path.
    ///
    /// The active flag is restored as persisted; the owning group reconciles it.
    pub fn from_json(data: ViewJson, definition: &ViewDefinition) -> Self {
        let name = if data.name.is_empty() {
            definition.name.clone()
        } else {
            data.name
        };
        Self {
            id: data.id,
            name,
            path: data.path,
            optical_center_fix: data.optical_center_fix,
            locked: data.locked,
            is_active: data.is_active,
            component: definition.component.clone(),
        }
    }
}
