//! Data module - incident CSV loading and date part derivation

pub mod columns;
mod loader;
mod processor;

pub use loader::{cell_text, has_column, IncidentStore};

#[cfg(test)]
pub(crate) use loader::tests as fixtures;
