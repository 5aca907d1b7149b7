/// How a split node redistributes its children's sizes after a structural change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingPolicy {
    /// Every child gets `100 / n`; custom proportions are reset.
    #[default]
    EqualShares,

    /// A new child gets `100 / n`; untouched siblings keep their relative proportions.
    Proportional,
}

/// Options for [`crate::Workspace`].
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct WorkspaceOptions {
    /// Applied to every split node in the workspace.
    pub sizing: SizingPolicy,

    /// If true, `split_group` removes its source group right away when the split left it empty.
    ///
    /// By default the empty group stays in place as a drop target until
    /// [`crate::Workspace::prune_empty_groups`] is called.
    pub prune_after_split: bool,

    /// Check tree invariants after every mutation and log violations with `log::error!`.
    ///
    /// Recommended for debug builds and tests only: the check walks the whole tree.
    pub debug_integrity: bool,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            sizing: SizingPolicy::EqualShares,
            prune_after_split: false,
            debug_integrity: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let options: WorkspaceOptions = serde_json::from_str(r#"{"sizing":"proportional"}"#).unwrap();
        assert_eq!(options.sizing, SizingPolicy::Proportional);
        assert!(!options.prune_after_split);
    }
}
