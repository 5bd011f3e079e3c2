/// Scene wire-format version produced and accepted by this client.
pub const SCENE_API_VERSION: &str = "2t";

pub(crate) fn is_supported(version: &str) -> bool {
    version == SCENE_API_VERSION
}
