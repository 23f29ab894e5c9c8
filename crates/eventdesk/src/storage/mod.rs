//! Repository implementations: an in-process store and a JSON file store.

mod json_file;
mod memory;
pub mod record;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{ProjectRow, RegistrationRow};
