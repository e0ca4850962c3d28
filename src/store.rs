// src/store.rs

pub mod collection;
pub mod console_store;
pub mod numbering;
pub mod persist;
pub mod seed;

pub use collection::{Collection, Entity};
pub use console_store::{ConsoleStore, Conversion, StoreOptions, Stored};
pub use persist::{LocalStorage, PersistedState};
