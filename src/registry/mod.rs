//! Query registry: which queries exist and how each family invokes the engine.
//!
//! It owns:
//! - QueryFamily (dataset layout, launcher script, query subdirectory)
//! - the static query tables and name resolution

pub mod family;
pub mod queries;

pub use family::QueryFamily;
pub use queries::{QuerySpec, resolve};
