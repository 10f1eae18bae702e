use crate::catalog::BeadProduct;
use derive_more::{AsRef, Deref, Display, From, Into};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Instance identity of a bead on the string. Distinct from the catalog
/// [`ProductId`](crate::catalog::ProductId): the same product can sit on the
/// bracelet any number of times.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct BeadId(String);

crate::impl_string_newtype!(BeadId);

impl BeadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBead {
    #[serde(flatten)]
    pub product: BeadProduct,
    pub unique_id: BeadId,
}

impl PlacedBead {
    pub fn new(product: BeadProduct, unique_id: BeadId) -> Self {
        Self { product, unique_id }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to determine data directory")]
    DataDirNotFound,
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A saved design is one opaque JSON array of [`PlacedBead`] records.
#[derive(Debug, Clone)]
pub struct DesignStore {
    path: PathBuf,
}

impl DesignStore {
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = crate::data_dir().ok_or(StoreError::DataDirNotFound)?;
        Ok(Self::at(dir.join("design.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// A missing, unreadable, or malformed snapshot is treated as "nothing
    /// saved", never as a fatal error.
    pub fn load(&self) -> Option<Vec<PlacedBead>> {
        let text = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&text) {
            Ok(beads) => Some(beads),
            Err(e) => {
                log::warn!("Discarding malformed snapshot {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, beads: &[PlacedBead]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(beads)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
