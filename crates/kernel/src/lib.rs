//! Kernel primitives shared by every bookshelf crate: the [`Module`] trait,
//! the [`ModuleRegistry`] that drives module lifecycle, and layered [`settings`].

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
