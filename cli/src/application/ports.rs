//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{InfraConfig, OwnerTag, ResourceDescriptor, ResourceGroupHandle};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// The working directory is always an explicit argument; implementations
/// must never change the process-wide current directory.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program while echoing its stdout and stderr live.
    ///
    /// Both streams are drained concurrently; the call returns only after
    /// both are exhausted and the child has exited.
    async fn run_streaming(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ExitStatus>;
}

// ── Cloud Provider Port ───────────────────────────────────────────────────────

/// Deletion qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteMode {
    Normal,
    Force,
}

/// Read and delete operations against the cloud provider.
#[allow(async_fn_in_trait)]
pub trait CloudProvider {
    /// Subscription of the currently authenticated account, if any.
    async fn current_subscription(&self) -> Result<Option<String>>;
    /// Whether the resource group exists. A non-zero "not found" exit is `Ok(false)`.
    async fn group_exists(&self, group: &ResourceGroupHandle) -> Result<bool>;
    /// Whether a single resource exists inside `group`.
    async fn resource_exists(
        &self,
        group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
    ) -> Result<bool>;
    /// Security group id currently referenced by the network interface `nic`.
    async fn interface_security_group(
        &self,
        group: &ResourceGroupHandle,
        nic: &ResourceDescriptor,
    ) -> Result<Option<String>>;
    /// Delete the whole resource group.
    async fn delete_group(&self, group: &ResourceGroupHandle, mode: DeleteMode) -> Result<()>;
    /// Delete one resource inside `group`.
    async fn delete_resource(
        &self,
        group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
        mode: DeleteMode,
    ) -> Result<()>;
}

// ── Declarative Tool Port ─────────────────────────────────────────────────────

/// Terraform lifecycle commands, all executed in the configured directory.
#[allow(async_fn_in_trait)]
pub trait DeclarativeTool {
    async fn init(&self) -> Result<()>;
    /// Raw `state list` output.
    async fn state_list(&self) -> Result<String>;
    async fn import(&self, address: &str, id: &str) -> Result<()>;
    async fn plan(&self, artifact: &str) -> Result<()>;
    async fn apply(&self, artifact: &str) -> Result<()>;
    /// Destroy everything tracked for `owner_tag`.
    async fn destroy(&self, owner_tag: &str) -> Result<()>;
    /// Value of a root module output, `None` when it is not set.
    async fn output(&self, name: &str) -> Result<Option<String>>;
    async fn force_unlock(&self, lock_id: &str) -> Result<()>;
}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Abstracts waiting so retry cooldowns are deterministic in tests.
#[allow(async_fn_in_trait)]
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── File Ports ────────────────────────────────────────────────────────────────

/// The `terraform.tfvars` file read by Terraform as an implicit input.
pub trait VariablesStore {
    /// Owner tag written by a previous run, if the file exists.
    fn previous_owner_tag(&self) -> Result<Option<String>>;
    /// Replace the file with the single `owner_tag` line.
    fn write_owner_tag(&self, tag: &OwnerTag) -> Result<()>;
}

/// Local Terraform state lock files.
pub trait StateLockStore {
    /// Lock ids recorded in lock-info files.
    fn lock_ids(&self) -> Result<Vec<String>>;
    /// Remove lock-info files, returning how many were removed.
    fn remove_lock_files(&self) -> Result<usize>;
}

/// Loads the optional YAML configuration.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<InfraConfig>;
    /// Path that was (or would be) read.
    fn path(&self) -> PathBuf;
}
