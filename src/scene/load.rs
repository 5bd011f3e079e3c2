/// What to do with the `Effects` field of each video source entry when loading a shot.
///
/// The service echoes effects back inside `Sources.Video[i].Effects`. `Drop` ignores them, so a
/// load/save cycle loses them; `Restore` reads them back into [`crate::Shot::video_effects`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EffectsOnLoad {
    /// Ignore `Effects` on load.
    #[default]
    Drop,
    /// Rebuild the per-position effect map from each video entry's `Effects`.
    Restore,
}

/// Options for [`crate::Scene::from_json_with`] and [`crate::Shot::from_json_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Handling of per-source video effects.
    pub effects: EffectsOnLoad,
    /// Re-sort loaded shots by timestamp instead of trusting payload order.
    pub resort_shots: bool,
}

impl LoadOptions {
    /// Options that restore effects and re-sort shots, so a loaded scene satisfies the same
    /// invariants as one built through [`crate::Scene::add_shot`].
    pub fn strict() -> Self {
        Self {
            effects: EffectsOnLoad::Restore,
            resort_shots: true,
        }
    }
}
