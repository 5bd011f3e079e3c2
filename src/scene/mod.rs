//! Scene data model and its wire JSON mapping.

/// Scene aggregate root.
pub mod composition;
/// Load-time compatibility options.
pub mod load;
/// Shot timeline entries.
pub mod shot;
pub(crate) mod wire;

pub use wire::SourceRef;
