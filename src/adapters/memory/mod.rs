//! In-memory adapters for every persistence port.

mod conduct_registry;
mod cycle_store;

pub use conduct_registry::InMemoryConductRegistry;
pub use cycle_store::InMemoryCycleStore;
