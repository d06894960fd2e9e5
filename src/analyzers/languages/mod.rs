//! Per-language configurations for the tree-walking detector family.

pub mod javascript;
pub mod python;

/// Register every tree-walking detector with the dispatch registry.
pub fn register_all() {
    python::register();
    javascript::register();
}
