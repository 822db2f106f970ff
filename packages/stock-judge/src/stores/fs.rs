//! Filesystem diagnostic store.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::store::{Artifact, DiagnosticStore};

/// Writes `<id>_<tag>.png` and `<id>_<tag>.html` into one directory.
///
/// The directory is created on first write. Files with the same name are
/// overwritten, so re-running against the same URL keeps only the latest
/// bundle per failure tag.
#[derive(Debug, Clone)]
pub struct FsDiagnosticStore {
    dir: PathBuf,
}

impl FsDiagnosticStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

}

#[async_trait]
impl DiagnosticStore for FsDiagnosticStore {
    async fn write(&self, artifact: &Artifact) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let stem = artifact.stem();

        if let Some(png) = &artifact.screenshot {
            let path = self.dir.join(format!("{stem}.png"));
            tokio::fs::write(&path, png).await?;
            debug!(path = %path.display(), bytes = png.len(), "Wrote screenshot");
        }

        if let Some(html) = &artifact.markup {
            let path = self.dir.join(format!("{stem}.html"));
            tokio::fs::write(&path, html).await?;
            debug!(path = %path.display(), bytes = html.len(), "Wrote markup");
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "fs"
    }
}
