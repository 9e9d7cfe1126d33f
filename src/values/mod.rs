//! Helm values documents.
//!
//! A values template is treated as an opaque YAML tree. Only the paths
//! listed by [`installer_overrides`] are changed; everything else is
//! written back as it was loaded.

pub mod document;
pub mod overrides;

pub use document::{FieldOverride, ValuesDocument};
pub use overrides::{installer_overrides, patch_file};
