//! Domain types and validators for `infractl` configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::owner_tag::{BranchTable, OwnerTag};
use crate::domain::retry::{Backoff, RetryPolicy};

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `<terraform-dir>/infractl.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraConfig {
    /// Product segment of the resource group name (`<tag>-<product>-resources`).
    pub product: String,
    /// Branch reference that maps to `production_tag`.
    pub production_branch: String,
    /// Branch reference that maps to `staging_tag`.
    pub staging_branch: String,
    /// Owner tag used for deployments from the production branch.
    pub production_tag: String,
    /// Owner tag used for deployments from the staging branch.
    pub staging_tag: String,
    /// Older naming prefixes whose resource groups are also torn down.
    pub legacy_prefixes: Vec<String>,
    /// File name of the saved Terraform plan.
    pub plan_artifact: String,
    /// Terraform output reported after a successful apply.
    pub output_name: String,
    /// Upper bound for a single `az ... delete`, in seconds.
    pub delete_timeout_secs: u64,
    /// Retry settings for the ordered destroy.
    pub retry: RetryConfig,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            product: "biteswipe".to_string(),
            production_branch: "refs/heads/main".to_string(),
            staging_branch: "refs/heads/develop".to_string(),
            production_tag: "prod".to_string(),
            staging_tag: "staging".to_string(),
            legacy_prefixes: Vec::new(),
            plan_artifact: "tfplan".to_string(),
            output_name: "server_public_ip".to_string(),
            delete_timeout_secs: 3600,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Full passes over the destruction plan before escalating.
    pub max_passes: u32,
    /// Cooldown between passes, in seconds.
    pub cooldown_secs: u64,
    /// `fixed` or `exponential`.
    pub backoff: BackoffKind,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_passes: 3,
            cooldown_secs: 30,
            backoff: BackoffKind::Fixed,
        }
    }
}

/// Delay growth between ordered-destroy passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

impl InfraConfig {
    /// Build the retry policy injected into the destroyer.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        let base = std::time::Duration::from_secs(self.retry.cooldown_secs);
        let backoff = match self.retry.backoff {
            BackoffKind::Fixed => Backoff::Fixed(base),
            BackoffKind::Exponential => Backoff::Exponential { base },
        };
        RetryPolicy::new(self.retry.max_passes, backoff)
    }

    #[must_use]
    pub fn delete_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.delete_timeout_secs)
    }

    /// Branch → tag mapping consulted by the owner tag resolver.
    #[must_use]
    pub fn branch_table(&self) -> BranchTable {
        BranchTable {
            production_branch: self.production_branch.clone(),
            production_tag: self.production_tag.clone(),
            staging_branch: self.staging_branch.clone(),
            staging_tag: self.staging_tag.clone(),
        }
    }

    /// Validate every field that the rest of the run relies on.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid key.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("product", &self.product),
            ("plan_artifact", &self.plan_artifact),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(key, value, "Value must not be empty."));
            }
        }
        for (key, value) in [
            ("production_tag", &self.production_tag),
            ("staging_tag", &self.staging_tag),
        ] {
            OwnerTag::parse(value).map_err(|e| invalid(key, value, &e.to_string()))?;
        }
        if self.retry.max_passes == 0 {
            return Err(invalid(
                "retry.max_passes",
                "0",
                "At least one ordered pass is required.",
            ));
        }
        if self.delete_timeout_secs == 0 {
            return Err(invalid(
                "delete_timeout_secs",
                "0",
                "Deletions need a positive timeout.",
            ));
        }
        let mut seen = HashSet::new();
        for prefix in &self.legacy_prefixes {
            OwnerTag::parse(prefix)
                .map_err(|e| invalid("legacy_prefixes", prefix, &e.to_string()))?;
            if !seen.insert(prefix.as_str()) {
                return Err(ConfigError::DuplicatePrefix(prefix.clone()).into());
            }
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, hint: &str) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        hint: hint.to_string(),
    }
    .into()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
