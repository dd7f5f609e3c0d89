//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod owner_tag;
pub mod report;
pub mod resource;
pub mod retry;

pub use config::InfraConfig;
pub use error::{CatalogError, ConfigError, RunError, TagError};
pub use owner_tag::{BranchTable, OwnerTag, OwnerTagInputs, TagSource, resolve_owner_tag};
pub use report::{
    ApplyReport, ApplyStep, AttemptResult, DestroyReport, GroupReport, GroupResolution,
    ImportReport, ImportStatus, PassReport,
};
pub use resource::{
    ASSOCIATION, CATALOG, DestructionPlan, ResourceDescriptor, ResourceGroupHandle, ResourceKind,
};
pub use retry::{Backoff, RetryPolicy};
