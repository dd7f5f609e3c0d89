//! Per-run outcome records for import, destroy and apply.

use std::fmt;

use serde::Serialize;

use crate::domain::resource::ResourceDescriptor;

// ── Import ────────────────────────────────────────────────────────────────────

/// What happened to one descriptor during an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportStatus {
    /// Address already in Terraform state; nothing to do.
    AlreadyTracked,
    /// Not present in the cloud; nothing to import.
    NotPresent,
    /// Imported during this run.
    Imported,
    /// Not attempted (association whose constituents are not tracked).
    Skipped { reason: String },
    /// Import or its prerequisites failed.
    Failed { detail: String },
}

impl ImportStatus {
    /// Tracked in state by the end of this run.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::AlreadyTracked | Self::Imported)
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub resource: &'static ResourceDescriptor,
    #[serde(flatten)]
    pub status: ImportStatus,
}

/// Outcomes in descriptor order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportReport {
    pub fn record(&mut self, resource: &'static ResourceDescriptor, status: ImportStatus) {
        self.outcomes.push(ImportOutcome { resource, status });
    }

    /// Status recorded for `resource` in this run, if any.
    #[must_use]
    pub fn status_of(&self, resource: &ResourceDescriptor) -> Option<&ImportStatus> {
        self.outcomes
            .iter()
            .find(|o| o.resource.kind == resource.kind)
            .map(|o| &o.status)
    }

    #[must_use]
    pub fn imported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ImportStatus::Imported)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImportOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

// ── Destroy ───────────────────────────────────────────────────────────────────

/// One deletion attempt of one resource in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptResult {
    pub resource: &'static ResourceDescriptor,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// One full pass over the (remaining) destruction plan.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass: u32,
    pub forced: bool,
    pub attempts: Vec<AttemptResult>,
}

impl PassReport {
    pub fn failed(&self) -> impl Iterator<Item = &'static ResourceDescriptor> + '_ {
        self.attempts
            .iter()
            .filter(|a| !a.succeeded)
            .map(|a| a.resource)
    }
}

/// Terminal state reached by one resource-group pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupResolution {
    /// The group never existed (or was already gone).
    Absent,
    /// Single group delete succeeded.
    DirectDelete,
    /// Per-resource passes emptied the group.
    OrderedDelete,
    /// Forced group delete after ordered passes were exhausted.
    ForcedGroupDelete,
    /// `terraform destroy` as last resort.
    DeclarativeDestroy,
    /// Every layer failed; manual cleanup needed.
    Unresolved,
}

impl GroupResolution {
    #[must_use]
    pub fn is_success(self) -> bool {
        self != Self::Unresolved
    }
}

impl fmt::Display for GroupResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Absent => "nothing to delete",
            Self::DirectDelete => "deleted",
            Self::OrderedDelete => "deleted resource by resource",
            Self::ForcedGroupDelete => "force-deleted",
            Self::DeclarativeDestroy => "destroyed by terraform",
            Self::Unresolved => "manual cleanup required",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub prefix: String,
    pub resolution: GroupResolution,
    pub passes: Vec<PassReport>,
    /// Resources still undeleted after the ordered passes.
    pub remaining: Vec<&'static ResourceDescriptor>,
}

/// Aggregate over every group pattern processed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DestroyReport {
    pub groups: Vec<GroupReport>,
}

impl DestroyReport {
    /// Vacuously true when no pattern's group existed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.groups.iter().all(|g| g.resolution.is_success())
    }

    #[must_use]
    pub fn unresolved_groups(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|g| !g.resolution.is_success())
            .map(|g| g.group.clone())
            .collect()
    }
}

// ── Apply ─────────────────────────────────────────────────────────────────────

/// Named stages of the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStep {
    Init,
    Import,
    Plan,
    Apply,
}

impl fmt::Display for ApplyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "terraform init",
            Self::Import => "state import",
            Self::Plan => "terraform plan",
            Self::Apply => "terraform apply",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub owner_tag: String,
    pub import: ImportReport,
    pub completed: Vec<ApplyStep>,
    /// Value of the configured Terraform output, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}
