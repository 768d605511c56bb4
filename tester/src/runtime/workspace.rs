//! Per-run working directories
//!
//! Stages talk to each other only through files in the working directory,
//! so concurrent runs each get their own directory, seeded from the
//! scenario's case directory. Nothing here is ever deleted: generated files
//! stay behind for inspection whether the run passed or failed.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{TesterError, TesterResult};
use shared::RunId;

#[derive(Debug, Clone)]
pub struct RunWorkspace {
    path: PathBuf,
    run_id: RunId,
    isolated: bool,
}

impl RunWorkspace {
    /// Create `<scratch_root>/<scenario>-<run>` and copy the case files into it
    pub async fn isolated(
        scratch_root: &Path,
        scenario: &str,
        run_id: RunId,
        case_dir: Option<&Path>,
    ) -> TesterResult<Self> {
        let path = scratch_root.join(format!("{}-{}", scenario, run_id.short()));

        fs::create_dir_all(&path).await.map_err(|source| TesterError::Workspace {
            path: path.clone(),
            source,
        })?;

        if let Some(case_dir) = case_dir {
            copy_dir_contents(case_dir, &path)
                .await
                .map_err(|source| TesterError::Workspace {
                    path: case_dir.to_path_buf(),
                    source,
                })?;
            tracing::debug!("📁 Seeded {} from {}", path.display(), case_dir.display());
        }

        Ok(Self {
            path,
            run_id,
            isolated: true,
        })
    }

    /// Run directly inside an existing directory
    pub fn in_place(path: PathBuf, run_id: RunId) -> Self {
        Self {
            path,
            run_id,
            isolated: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }
}

/// Recursively copy everything under `from` into `to`
async fn copy_dir_contents(from: &Path, to: &Path) -> std::io::Result<()> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        fs::create_dir_all(&dst_dir).await?;
        let mut entries = fs::read_dir(&src_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let src = entry.path();
            let dst = dst_dir.join(entry.file_name());

            if entry.file_type().await?.is_dir() {
                pending.push((src, dst));
            } else {
                fs::copy(&src, &dst).await?;
            }
        }
    }

    Ok(())
}
