pub mod decode;
pub mod local;

use async_trait::async_trait;

pub use local::LocalStorage;

/// Directory, relative to the media root, that recipe images are stored under.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

#[derive(Debug)]
pub struct StorageError {
    pub message: String,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<String> for StorageError {
    fn from(s: String) -> Self {
        StorageError { message: s }
    }
}

impl From<&str> for StorageError {
    fn from(s: &str) -> Self {
        StorageError {
            message: s.to_string(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError {
            message: err.to_string(),
        }
    }
}

/// Where uploaded files live. Paths are relative, `/`-separated and never
/// escape the storage root.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;
    /// Removing a file that does not exist is not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;
}

/// Build a fresh, collision-free path for a recipe image.
pub fn recipe_image_path(extension: &str) -> String {
    format!("{RECIPE_IMAGE_DIR}/{}.{extension}", uuid::Uuid::new_v4())
}

/// Best-effort removal used after the owning row is already gone.
pub async fn release(storage: &dyn MediaStorage, path: &str) {
    if let Err(e) = storage.delete(path).await {
        tracing::error!("Failed to release media file {path}: {e}");
    }
}
