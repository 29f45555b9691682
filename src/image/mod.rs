//! Image reference handling
//!
//! The migrator never looks inside images; all it needs is a reference that
//! is known to be well formed before it is passed to the container runtime.

pub mod reference;

pub use reference::{DEFAULT_REGISTRY, ImageRef};
