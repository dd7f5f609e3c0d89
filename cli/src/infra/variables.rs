//! Infrastructure implementation of the `VariablesStore` port.
//!
//! `terraform.tfvars` is replaced atomically (temp file + rename) so an
//! interrupted run never leaves Terraform reading a half-written file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::VariablesStore;
use crate::domain::OwnerTag;
use crate::domain::owner_tag::{parse_previous_tag, render_variables};

/// File name Terraform loads implicitly from its working directory.
pub const VARIABLES_FILE: &str = "terraform.tfvars";

pub struct TfvarsFile {
    path: PathBuf,
}

impl TfvarsFile {
    /// `terraform.tfvars` inside `terraform_dir`.
    #[must_use]
    pub fn in_dir(terraform_dir: &Path) -> Self {
        Self::with_path(terraform_dir.join(VARIABLES_FILE))
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VariablesStore for TfvarsFile {
    fn previous_owner_tag(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(parse_previous_tag(&content))
    }

    fn write_owner_tag(&self, tag: &OwnerTag) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let temp_path = self.path.with_extension("tfvars.tmp");
        std::fs::write(&temp_path, render_variables(tag))
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), owner_tag = %tag, "variables file written");
        Ok(())
    }
}
