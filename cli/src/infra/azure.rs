//! Infrastructure implementation of the `CloudProvider` port over the `az` CLI.
//!
//! Every call is an argument vector; names never pass through a shell.
//! Queries use the runner's default timeout. Deletes run under a separate,
//! much longer bound: removing a VM or a whole group can take many minutes.

use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::application::ports::{CloudProvider, CommandRunner, DeleteMode};
use crate::domain::{ResourceDescriptor, ResourceGroupHandle, ResourceKind};

const AZ: &str = "az";

/// Bound for a single delete when none is configured.
pub const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// `az` command group for a resource kind, `None` for kinds without one.
fn command_group(kind: ResourceKind) -> Option<&'static [&'static str]> {
    match kind {
        ResourceKind::ResourceGroup => Some(&["group"]),
        ResourceKind::VirtualNetwork => Some(&["network", "vnet"]),
        ResourceKind::Subnet => Some(&["network", "vnet", "subnet"]),
        ResourceKind::PublicIp => Some(&["network", "public-ip"]),
        ResourceKind::SecurityGroup => Some(&["network", "nsg"]),
        ResourceKind::NetworkInterface => Some(&["network", "nic"]),
        ResourceKind::VirtualMachine => Some(&["vm"]),
        ResourceKind::NicSecurityGroupAssociation => None,
    }
}

/// Argument vector for `az <group> show|delete` on one resource.
fn resource_args(
    verb: &'static str,
    group: &ResourceGroupHandle,
    resource: &ResourceDescriptor,
) -> Result<Vec<String>> {
    let Some(cmd) = command_group(resource.kind) else {
        bail!("{} has no az command group", resource.kind);
    };
    let mut args: Vec<String> = cmd.iter().map(ToString::to_string).collect();
    args.extend([
        verb.to_string(),
        "--resource-group".to_string(),
        group.name().to_string(),
        "--name".to_string(),
        group.resource_name(resource),
    ]);
    if let Some(parent) = group.parent_name(resource) {
        args.extend(["--vnet-name".to_string(), parent]);
    }
    Ok(args)
}

/// Azure CLI adapter.
pub struct AzCli<R: CommandRunner> {
    runner: R,
    delete_timeout: Duration,
}

impl<R: CommandRunner> AzCli<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            delete_timeout: DEFAULT_DELETE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_delete_timeout(mut self, timeout: Duration) -> Self {
        self.delete_timeout = timeout;
        self
    }

    async fn az(&self, args: &[String]) -> Result<std::process::Output> {
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run(AZ, &refs, None)
            .await
            .with_context(|| format!("az {}", refs.join(" ")))
    }

    /// Run a delete under `delete_timeout` and require a zero exit, folding
    /// stderr into the error.
    async fn az_delete(&self, args: &[String]) -> Result<()> {
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout(AZ, &refs, None, self.delete_timeout)
            .await
            .with_context(|| format!("az {}", refs.join(" ")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("az {} failed: {}", args.join(" "), stderr.trim());
        }
        Ok(())
    }
}

impl<R: CommandRunner> CloudProvider for AzCli<R> {
    async fn current_subscription(&self) -> Result<Option<String>> {
        let args = ["account", "show", "--query", "id", "--output", "tsv"].map(String::from);
        let output = self.az(&args).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!id.is_empty()).then_some(id))
    }

    async fn group_exists(&self, group: &ResourceGroupHandle) -> Result<bool> {
        let args = ["group", "show", "--name", group.name()].map(String::from);
        Ok(self.az(&args).await?.status.success())
    }

    async fn resource_exists(
        &self,
        group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
    ) -> Result<bool> {
        if resource.kind == ResourceKind::ResourceGroup {
            return self.group_exists(group).await;
        }
        let args = resource_args("show", group, resource)?;
        Ok(self.az(&args).await?.status.success())
    }

    async fn interface_security_group(
        &self,
        group: &ResourceGroupHandle,
        nic: &ResourceDescriptor,
    ) -> Result<Option<String>> {
        let mut args = resource_args("show", group, nic)?;
        args.extend(["--query", "networkSecurityGroup.id", "--output", "tsv"].map(String::from));
        let output = self.az(&args).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!id.is_empty()).then_some(id))
    }

    async fn delete_group(&self, group: &ResourceGroupHandle, mode: DeleteMode) -> Result<()> {
        let mut args = ["group", "delete", "--name", group.name(), "--yes"].map(String::from).to_vec();
        if mode == DeleteMode::Force {
            args.extend(
                ["--force-deletion-types", "Microsoft.Compute/virtualMachines"].map(String::from),
            );
        }
        self.az_delete(&args).await
    }

    async fn delete_resource(
        &self,
        group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
        mode: DeleteMode,
    ) -> Result<()> {
        let mut args = resource_args("delete", group, resource)?;
        if resource.kind == ResourceKind::VirtualMachine {
            args.push("--yes".to_string());
            if mode == DeleteMode::Force {
                args.extend(["--force-deletion", "true"].map(String::from));
            }
        }
        self.az_delete(&args).await
    }
}
