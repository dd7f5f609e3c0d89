//! Infrastructure implementation of the `StateLockStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::StateLockStore;

/// Lock-info files Terraform may leave behind in its working directory.
pub const LOCK_FILES: [&str; 2] = [".terraform.tfstate.lock.info", "terraform.tfstate.lock.info"];

#[derive(Debug, Deserialize)]
struct LockInfo {
    #[serde(rename = "ID")]
    id: Option<String>,
}

pub struct LockFiles {
    dir: PathBuf,
}

impl LockFiles {
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn existing(&self) -> impl Iterator<Item = PathBuf> + '_ {
        LOCK_FILES
            .iter()
            .map(|name| self.dir.join(name))
            .filter(|path| path.is_file())
    }
}

impl StateLockStore for LockFiles {
    fn lock_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for path in self.existing() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            // An unparsable lock file is still removed; it just yields no id.
            match serde_json::from_str::<LockInfo>(&content) {
                Ok(LockInfo { id: Some(id) }) if !id.trim().is_empty() => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "unreadable lock info"),
            }
        }
        Ok(ids)
    }

    fn remove_lock_files(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.existing().collect::<Vec<_>>() {
            std::fs::remove_file(&path)
                .with_context(|| format!("removing {}", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }
}
