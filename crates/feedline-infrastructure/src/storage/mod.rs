//! Storage layer: atomic JSON files and token stores.

mod atomic_json;
mod memory;
mod token_file;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use memory::MemoryTokenStore;
pub use token_file::FileTokenStore;
