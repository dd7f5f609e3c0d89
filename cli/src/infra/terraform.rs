//! Infrastructure implementation of the `DeclarativeTool` port over `terraform`.
//!
//! Every command runs with the configured directory as its working
//! directory. Long-running commands stream their output live.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::application::ports::{CommandRunner, DeclarativeTool};

const TERRAFORM: &str = "terraform";

pub struct Terraform<R: CommandRunner> {
    runner: R,
    dir: PathBuf,
}

impl<R: CommandRunner> Terraform<R> {
    pub fn new(runner: R, dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            dir: dir.into(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn stream(&self, args: &[&str]) -> Result<()> {
        let status = self
            .runner
            .run_streaming(TERRAFORM, args, Some(&self.dir))
            .await
            .with_context(|| format!("terraform {}", args.join(" ")))?;
        if !status.success() {
            bail!("terraform {} exited with {status}", args.join(" "));
        }
        Ok(())
    }

    async fn capture(&self, args: &[&str]) -> Result<std::process::Output> {
        self.runner
            .run(TERRAFORM, args, Some(&self.dir))
            .await
            .with_context(|| format!("terraform {}", args.join(" ")))
    }

    async fn capture_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.capture(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("terraform {} failed: {}", args.join(" "), stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl<R: CommandRunner> DeclarativeTool for Terraform<R> {
    async fn init(&self) -> Result<()> {
        self.stream(&["init", "-input=false"]).await
    }

    async fn state_list(&self) -> Result<String> {
        self.capture_ok(&["state", "list"]).await
    }

    async fn import(&self, address: &str, id: &str) -> Result<()> {
        self.capture_ok(&["import", "-input=false", address, id])
            .await
            .map(drop)
    }

    async fn plan(&self, artifact: &str) -> Result<()> {
        let out = format!("-out={artifact}");
        self.stream(&["plan", "-input=false", &out]).await
    }

    async fn apply(&self, artifact: &str) -> Result<()> {
        self.stream(&["apply", "-input=false", "-auto-approve", artifact])
            .await
    }

    /// Destroy can be the first Terraform command of a run, so it
    /// initializes the working directory itself.
    async fn destroy(&self, owner_tag: &str) -> Result<()> {
        self.init().await?;
        let var = format!("owner_tag={owner_tag}");
        self.stream(&["destroy", "-auto-approve", "-input=false", "-var", &var])
            .await
    }

    async fn output(&self, name: &str) -> Result<Option<String>> {
        let output = self.capture(&["output", "-raw", name]).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!value.is_empty()).then_some(value))
    }

    async fn force_unlock(&self, lock_id: &str) -> Result<()> {
        self.capture_ok(&["force-unlock", "-force", lock_id])
            .await
            .map(drop)
    }
}
