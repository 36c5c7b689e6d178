//! Dependency resolution and linking.
//!
//! This module turns a root module into a checked [`Program`](linker::Program):
//!
//! - Loading imported modules through a [`ModuleLoader`](loader::ModuleLoader)
//! - Building the module graph breadth first, each module loaded once
//! - Rejecting import cycles
//! - Ordering modules so dependencies come first
//! - Checking each module with its dependencies' scopes linked in

pub mod graph;
pub mod linker;
pub mod loader;
pub mod module;

#[cfg(test)]
mod tests;
