//! Book manager application library
//!
//! Wires the `books` module into the kernel registry, the SQLite pool and the
//! HTTP server.

pub mod app;
pub mod modules;

pub use app::{migrate, Application};
pub use modules::books::models::{Book, BookPayload};
