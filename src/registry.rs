use crate::error::{LayoutError, ResolutionError};

/// Opaque handle the rendering layer maps to a widget/page factory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentKey(String);

impl ComponentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A static view definition: what a tab *is*, independent of any open instance.
///
/// `path` may contain one placeholder segment, e.g. `/collections/[uid]`, which matches any
/// single concrete segment such as `/collections/abc123`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewDefinition {
    /// Checked to be non-empty when the definition enters a [`ViewRegistry`], which never
    /// hands out mutable access afterwards.
    pub name: String,
    pub path: Option<String>,
    pub component: ComponentKey,
}

impl ViewDefinition {
    pub fn new(name: impl Into<String>, component: ComponentKey) -> Self {
        Self {
            name: name.into(),
            path: None,
            component,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Stand-in for persisted views whose definition no longer exists.
    pub fn unknown() -> Self {
        Self::new("Unknown view", ComponentKey::new("unknown"))
    }

    fn matches_path(&self, path: &str) -> bool {
        self.path
            .as_deref()
            .is_some_and(|pattern| path_matches(pattern, path))
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('[') && segment.ends_with(']')
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    let path = path.trim_end_matches('/');

    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let ok = if is_placeholder(expected) {
                    !actual.is_empty()
                } else {
                    expected == actual
                };
                if !ok {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Lookup table from persisted views back to live [`ViewDefinition`]s.
///
/// Layout snapshots only store a view's display name and path; the app decides which
/// definitions exist. Registration order matters: on ambiguous matches the first registered
/// definition wins.
#[derive(Clone, Debug)]
pub struct ViewRegistry {
    definitions: Vec<ViewDefinition>,
    unknown: ViewDefinition,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            unknown: ViewDefinition::unknown(),
        }
    }

    /// Replace the placeholder used for views that can't be resolved.
    ///
    /// # Errors
    /// [`LayoutError::EmptyViewName`] if the placeholder has no name.
    pub fn with_unknown(mut self, unknown: ViewDefinition) -> Result<Self, LayoutError> {
        if unknown.name.is_empty() {
            return Err(LayoutError::EmptyViewName);
        }
        self.unknown = unknown;
        Ok(self)
    }

    /// # Errors
    /// A definition with an empty name, or a path pattern with more than one placeholder.
    pub fn register(&mut self, definition: ViewDefinition) -> Result<(), LayoutError> {
        if definition.name.is_empty() {
            return Err(LayoutError::EmptyViewName);
        }
        if let Some(pattern) = &definition.path {
            let placeholders = pattern.split('/').filter(|s| is_placeholder(s)).count();
            if placeholders > 1 {
                return Err(LayoutError::InvalidPattern {
                    pattern: pattern.clone(),
                });
            }
        }
        self.definitions.push(definition);
        Ok(())
    }

    pub fn definitions(&self) -> &[ViewDefinition] {
        &self.definitions
    }

    pub fn unknown(&self) -> &ViewDefinition {
        &self.unknown
    }

    /// Match a concrete path against the registered path patterns.
    pub fn resolve(&self, path: &str) -> Option<&ViewDefinition> {
        self.definitions.iter().find(|def| def.matches_path(path))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ViewDefinition> {
        self.definitions.iter().find(|def| def.name == name)
    }

    /// Resolve a persisted view: by path when it has one, then by its name.
    ///
    /// # Errors
    /// [`ResolutionError`] when neither lookup succeeds; callers usually substitute
    /// [`Self::unknown`].
    pub fn resolve_view(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> Result<&ViewDefinition, ResolutionError> {
        path.and_then(|path| self.resolve(path))
            .or_else(|| self.find_by_name(name))
            .ok_or_else(|| ResolutionError {
                name: name.to_owned(),
                path: path.map(str::to_owned),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ViewRegistry {
        let mut registry = ViewRegistry::new();
        registry
            .register(ViewDefinition::new("Photos", ComponentKey::new("photos")).with_path("/photos"))
            .unwrap();
        registry
            .register(
                ViewDefinition::new("Collection", ComponentKey::new("collection"))
                    .with_path("/collections/[uid]"),
            )
            .unwrap();
        registry
            .register(
                ViewDefinition::new("Collection (legacy)", ComponentKey::new("legacy"))
                    .with_path("/collections/[id]"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn resolves_exact_path() {
        let registry = registry();
        assert_eq!(registry.resolve("/photos").unwrap().name, "Photos");
        assert_eq!(registry.resolve("/photos/").unwrap().name, "Photos");
    }

    #[test]
    fn placeholder_matches_one_segment() {
        let registry = registry();
        let def = registry.resolve("/collections/abcdef123").unwrap();
        assert_eq!(def.component.as_str(), "collection", "first registered wins");

        assert!(registry.resolve("/collections").is_none());
        assert!(registry.resolve("/collections/a/b").is_none());
        assert!(registry.resolve("/collections//").is_none());
    }

    #[test]
    fn rejects_two_placeholders() {
        let mut registry = ViewRegistry::new();
        let err = registry
            .register(
                ViewDefinition::new("Image", ComponentKey::new("image"))
                    .with_path("/collections/[uid]/images/[image]"),
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPattern { .. }));
        assert!(registry.definitions().is_empty());
    }

    #[test]
    fn rejects_empty_name() {
        let mut registry = ViewRegistry::new();
        let err = registry
            .register(ViewDefinition::new("", ComponentKey::new("x")))
            .unwrap_err();
        assert_eq!(err, LayoutError::EmptyViewName);

        let err = ViewRegistry::new()
            .with_unknown(ViewDefinition::new("", ComponentKey::new("x")))
            .unwrap_err();
        assert_eq!(err, LayoutError::EmptyViewName);
    }

    #[test]
    fn resolve_view_falls_back_to_name() {
        let mut registry = registry();
        registry
            .register(ViewDefinition::new("Settings", ComponentKey::new("settings")))
            .unwrap();

        let def = registry.resolve_view("Settings", None).unwrap();
        assert_eq!(def.component.as_str(), "settings");

        let def = registry.resolve_view("Settings", Some("/moved")).unwrap();
        assert_eq!(def.component.as_str(), "settings");

        let err = registry.resolve_view("Gone", Some("/gone")).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("/gone"));
    }
}
