//! Local persistence for Gupsik: a string key-value store and the school
//! selection kept in it.

pub mod kv;
pub mod selection;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use selection::{SelectedSchool, SelectionStore, SELECTED_SCHOOL_KEY};
