//! Side-channel storage for diagnostic bundles.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::judgment::FailureKind;

/// A diagnostic bundle for one failed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Filesystem-safe id derived from the target URL
    pub id: String,

    /// Why the target failed
    pub kind: FailureKind,

    /// Original target URL
    pub url: String,

    /// Rendered markup, if it could be taken
    pub markup: Option<String>,

    /// Full-page PNG, if it could be taken
    pub screenshot: Option<Vec<u8>>,
}

impl Artifact {
    /// `<id>_<tag>`, the stem shared by every file in the bundle.
    pub fn stem(&self) -> String {
        format!("{}_{}", self.id, self.kind.tag())
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

/// Receives diagnostic bundles. Best-effort from the engine's point of view.
#[async_trait]
pub trait DiagnosticStore: Send + Sync {
    /// Persist whatever parts of the bundle are present.
    async fn write(&self, artifact: &Artifact) -> StoreResult<()>;

    /// Get the store name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
