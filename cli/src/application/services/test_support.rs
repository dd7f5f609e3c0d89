//! Shared test doubles for application service tests.
//!
//! `FakeCloud`, `FakeTerraform` and `FakeClock` keep their state in
//! `Cell`/`RefCell` and record every call so tests can assert on both the
//! outcome and the exact sequence of port calls.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{
    CloudProvider, Clock, DeclarativeTool, DeleteMode, ProgressReporter,
};
use crate::domain::{ResourceDescriptor, ResourceGroupHandle, ResourceKind};

pub const SUBSCRIPTION: &str = "11111111-2222-3333-4444-555555555555";

// ── Cloud ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudCall {
    Subscription,
    GroupExists(String),
    ResourceExists(ResourceKind),
    InterfaceSecurityGroup,
    DeleteGroup(String, DeleteMode),
    DeleteResource(ResourceKind, DeleteMode),
}

pub struct FakeCloud {
    pub subscription: Option<String>,
    /// Group names that currently exist. Shared with `FakeTerraform` so a
    /// destroy can remove the group it manages.
    pub groups: Rc<RefCell<HashSet<String>>>,
    /// Resource kinds that currently exist (shared across groups).
    pub resources: RefCell<HashSet<ResourceKind>>,
    /// Remaining failing group delete attempts per mode.
    pub group_delete_failures: RefCell<HashMap<DeleteMode, u32>>,
    /// Remaining failing delete attempts per resource kind.
    pub delete_failures: RefCell<HashMap<ResourceKind, u32>>,
    /// Security group id the interface points at.
    pub nic_nsg: RefCell<Option<String>>,
    pub calls: RefCell<Vec<CloudCall>>,
}

impl FakeCloud {
    /// A cloud where `group` exists and holds every catalog resource.
    pub fn with_group(group: &ResourceGroupHandle) -> Self {
        let cloud = Self::empty();
        cloud.groups.borrow_mut().insert(group.name().to_string());
        cloud.resources.borrow_mut().extend(
            crate::domain::CATALOG
                .iter()
                .map(|d| d.kind)
                .filter(|k| *k != ResourceKind::ResourceGroup),
        );
        cloud
    }

    pub fn empty() -> Self {
        Self {
            subscription: Some(SUBSCRIPTION.to_string()),
            groups: Rc::new(RefCell::new(HashSet::new())),
            resources: RefCell::new(HashSet::new()),
            group_delete_failures: RefCell::new(HashMap::new()),
            delete_failures: RefCell::new(HashMap::new()),
            nic_nsg: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_group_delete(self, mode: DeleteMode) -> Self {
        self.fail_group_delete_times(mode, u32::MAX)
    }

    pub fn fail_group_delete_times(self, mode: DeleteMode, times: u32) -> Self {
        self.group_delete_failures.borrow_mut().insert(mode, times);
        self
    }

    pub fn fail_resource_delete(self, kind: ResourceKind, times: u32) -> Self {
        self.delete_failures.borrow_mut().insert(kind, times);
        self
    }

    pub fn calls(&self) -> Vec<CloudCall> {
        self.calls.borrow().clone()
    }

    pub fn resource_deletes(&self) -> Vec<(ResourceKind, DeleteMode)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CloudCall::DeleteResource(k, m) => Some((k, m)),
                _ => None,
            })
            .collect()
    }

    pub fn group_deletes(&self) -> Vec<DeleteMode> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CloudCall::DeleteGroup(_, m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn log(&self, call: CloudCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl CloudProvider for FakeCloud {
    async fn current_subscription(&self) -> Result<Option<String>> {
        self.log(CloudCall::Subscription);
        Ok(self.subscription.clone())
    }

    async fn group_exists(&self, group: &ResourceGroupHandle) -> Result<bool> {
        self.log(CloudCall::GroupExists(group.name().to_string()));
        Ok(self.groups.borrow().contains(group.name()))
    }

    async fn resource_exists(
        &self,
        _group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
    ) -> Result<bool> {
        self.log(CloudCall::ResourceExists(resource.kind));
        Ok(self.resources.borrow().contains(&resource.kind))
    }

    async fn interface_security_group(
        &self,
        _group: &ResourceGroupHandle,
        _nic: &ResourceDescriptor,
    ) -> Result<Option<String>> {
        self.log(CloudCall::InterfaceSecurityGroup);
        Ok(self.nic_nsg.borrow().clone())
    }

    async fn delete_group(&self, group: &ResourceGroupHandle, mode: DeleteMode) -> Result<()> {
        self.log(CloudCall::DeleteGroup(group.name().to_string(), mode));
        let mut failures = self.group_delete_failures.borrow_mut();
        if let Some(left) = failures.get_mut(&mode)
            && *left > 0
        {
            *left -= 1;
            anyhow::bail!("group {} still has dependent resources", group.name());
        }
        self.groups.borrow_mut().remove(group.name());
        self.resources.borrow_mut().clear();
        Ok(())
    }

    async fn delete_resource(
        &self,
        _group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
        mode: DeleteMode,
    ) -> Result<()> {
        self.log(CloudCall::DeleteResource(resource.kind, mode));
        let mut failures = self.delete_failures.borrow_mut();
        if let Some(left) = failures.get_mut(&resource.kind)
            && *left > 0
        {
            *left -= 1;
            anyhow::bail!("{} is in use", resource.kind);
        }
        self.resources.borrow_mut().remove(&resource.kind);
        Ok(())
    }
}

// ── Terraform ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Init,
    StateList,
    Import(String, String),
    Plan(String),
    Apply(String),
    Destroy(String),
    Output(String),
    ForceUnlock(String),
}

pub struct FakeTerraform {
    /// Addresses currently in state.
    pub state: RefCell<BTreeSet<String>>,
    /// Steps that fail: "init", "plan", "apply", "destroy", "state", "import".
    pub failing: HashSet<&'static str>,
    /// Successive answers of `output`.
    pub outputs: RefCell<VecDeque<Option<String>>>,
    /// Group a successful destroy removes from the fake cloud.
    pub manages: Option<(Rc<RefCell<HashSet<String>>>, String)>,
    pub calls: RefCell<Vec<ToolCall>>,
}

impl FakeTerraform {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(BTreeSet::new()),
            failing: HashSet::new(),
            outputs: RefCell::new(VecDeque::new()),
            manages: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(mut self, step: &'static str) -> Self {
        self.failing.insert(step);
        self
    }

    /// Make a successful destroy delete `group` from `cloud`.
    pub fn managing(mut self, cloud: &FakeCloud, group: &ResourceGroupHandle) -> Self {
        self.manages = Some((Rc::clone(&cloud.groups), group.name().to_string()));
        self
    }

    pub fn tracking(self, addresses: &[String]) -> Self {
        self.state.borrow_mut().extend(addresses.iter().cloned());
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.borrow().clone()
    }

    pub fn imports(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ToolCall::Import(a, i) => Some((a, i)),
                _ => None,
            })
            .collect()
    }

    fn step(&self, name: &str, call: ToolCall) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.failing.contains(name) {
            anyhow::bail!("terraform {name} exited with status 1");
        }
        Ok(())
    }
}

impl DeclarativeTool for FakeTerraform {
    async fn init(&self) -> Result<()> {
        self.step("init", ToolCall::Init)
    }

    async fn state_list(&self) -> Result<String> {
        self.step("state", ToolCall::StateList)?;
        Ok(self
            .state
            .borrow()
            .iter()
            .map(|a| format!("{a}\n"))
            .collect())
    }

    async fn import(&self, address: &str, id: &str) -> Result<()> {
        self.step("import", ToolCall::Import(address.to_string(), id.to_string()))?;
        self.state.borrow_mut().insert(address.to_string());
        Ok(())
    }

    async fn plan(&self, artifact: &str) -> Result<()> {
        self.step("plan", ToolCall::Plan(artifact.to_string()))
    }

    async fn apply(&self, artifact: &str) -> Result<()> {
        self.step("apply", ToolCall::Apply(artifact.to_string()))
    }

    async fn destroy(&self, owner_tag: &str) -> Result<()> {
        self.step("destroy", ToolCall::Destroy(owner_tag.to_string()))?;
        if let Some((groups, name)) = &self.manages {
            groups.borrow_mut().remove(name);
        }
        Ok(())
    }

    async fn output(&self, name: &str) -> Result<Option<String>> {
        self.step("output", ToolCall::Output(name.to_string()))?;
        Ok(self.outputs.borrow_mut().pop_front().flatten())
    }

    async fn force_unlock(&self, lock_id: &str) -> Result<()> {
        self.step("unlock", ToolCall::ForceUnlock(lock_id.to_string()))
    }
}

// ── Clock and reporter ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeClock {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

#[derive(Default)]
pub struct ReporterStub {
    pub warnings: Cell<usize>,
}

impl ProgressReporter for ReporterStub {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {
        self.warnings.set(self.warnings.get() + 1);
    }
}
