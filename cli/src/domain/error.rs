//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Run errors ────────────────────────────────────────────────────────────────

/// Errors surfaced by the provisioning and teardown use-cases.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(
        "No Azure subscription available. Set ARM_SUBSCRIPTION_ID or run 'az login'."
    )]
    SubscriptionUnavailable,

    #[error("{step} failed: {detail}")]
    StepFailed { step: String, detail: String },

    #[error(
        "Manual cleanup required: could not remove {}.\n\nDelete the resource group(s) in the Azure portal and re-run 'infractl destroy'.",
        groups.join(", ")
    )]
    ManualCleanupRequired { groups: Vec<String> },
}

// ── Catalog errors ────────────────────────────────────────────────────────────

/// Errors raised while validating the static resource catalog at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("destruction plan entry '{0}' is missing from the resource catalog")]
    MissingFromCatalog(String),

    #[error("duplicate {field} '{value}' in the resource catalog")]
    Duplicate { field: &'static str, value: String },

    #[error("association '{association}' references '{missing}', which is not in the catalog")]
    DanglingAssociation { association: String, missing: String },

    #[error("resource group descriptor is missing from the resource catalog")]
    NoResourceGroup,
}

// ── Owner tag errors ──────────────────────────────────────────────────────────

/// Reasons a value cannot be used verbatim as an owner tag.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("owner tag must not be empty")]
    Empty,

    #[error("owner tag '{tag}' contains '{ch}'; use letters, digits and '-' only")]
    InvalidCharacter { tag: String, ch: char },

    #[error("owner tag '{0}' must not start or end with '-'")]
    EdgeHyphen(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },

    #[error("Duplicate legacy prefix: {0}")]
    DuplicatePrefix(String),
}
