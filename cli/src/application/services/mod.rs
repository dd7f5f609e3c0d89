//! Application services — use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports` — never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod apply;
pub mod destroyer;
pub mod existence;
pub mod importer;
pub mod locks;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_support;

pub use apply::{ApplyOrchestrator, ApplySettings};
pub use destroyer::DependencyOrderedDestroyer;
pub use existence::ExistenceChecker;
pub use importer::{StateImporter, default_import_list};
pub use locks::release_stale_locks;
pub use subscription::resolve_subscription;
