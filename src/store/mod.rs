use derive_more::{Display, From};

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key/value string store holding the dashboard's data, the server-side
/// counterpart of the browser's local storage.
///
/// Implementations serialize access internally; a single `set` replaces the
/// value as a whole.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Display, From)]
pub enum StoreError {
    #[display(fmt = "store io error: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "store file is corrupt: {}", _0)]
    Corrupt(serde_json::Error),
    #[from(ignore)]
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Corrupt(e) => Some(e),
            StoreError::Unavailable(_) => None,
        }
    }
}
