//! In-memory diagnostic store for testing and development.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{Artifact, DiagnosticStore};

/// Keeps every written bundle in memory.
///
/// Data is lost when the store is dropped.
#[derive(Default)]
pub struct MemoryDiagnosticStore {
    artifacts: RwLock<Vec<Artifact>>,
    unavailable: bool,
}

impl MemoryDiagnosticStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    pub fn unavailable() -> Self {
        Self {
            artifacts: RwLock::new(Vec::new()),
            unavailable: true,
        }
    }

    /// Bundles written so far, in write order.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts.read().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.artifacts.read().unwrap().len()
    }

    pub fn clear(&self) {
        self.artifacts.write().unwrap().clear();
    }
}

#[async_trait]
impl DiagnosticStore for MemoryDiagnosticStore {
    async fn write(&self, artifact: &Artifact) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store disabled".to_string()));
        }
        self.artifacts.write().unwrap().push(artifact.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
