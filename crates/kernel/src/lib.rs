//! Core traits, settings, and module lifecycle shared by every bookmanager crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
