//! Owner tag resolution and the variables file format.
//!
//! Pure functions only. Environment and filesystem reads happen in the
//! caller, which hands the collected values over as [`OwnerTagInputs`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::error::TagError;

/// Fallback when no local user identity can be determined.
pub const UNKNOWN_USER: &str = "unknown";

/// Namespace prefixing every resource name for one run.
///
/// Always non-empty ASCII letters, digits and inner hyphens, so it is a
/// legal Azure name segment and can be written into HCL without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OwnerTag(String);

impl OwnerTag {
    /// Normalize `value` into a tag: every other character becomes `-`, runs
    /// of `-` collapse, and edge hyphens are dropped. `None` when nothing is
    /// left.
    ///
    /// `dependabot[bot]` becomes `dependabot-bot`.
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let mut tag = String::with_capacity(value.len());
        for ch in value.trim().chars() {
            if ch.is_ascii_alphanumeric() {
                tag.push(ch);
            } else if !tag.is_empty() && !tag.ends_with('-') {
                tag.push('-');
            }
        }
        while tag.ends_with('-') {
            tag.pop();
        }
        (!tag.is_empty()).then_some(Self(tag))
    }

    /// Accept `value` (trimmed) only when it is already a valid tag.
    ///
    /// # Errors
    ///
    /// Returns a [`TagError`] naming what is wrong with `value`.
    pub fn parse(value: &str) -> Result<Self, TagError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TagError::Empty);
        }
        if let Some(ch) = trimmed.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return Err(TagError::InvalidCharacter {
                tag: trimmed.to_string(),
                ch,
            });
        }
        if trimmed.starts_with('-') || trimmed.ends_with('-') {
            return Err(TagError::EdgeHyphen(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which rule of the priority chain produced the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    Explicit,
    ProductionBranch,
    StagingBranch,
    CiActor,
    VariablesFile,
    LocalUser,
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Explicit => "--prefix",
            Self::ProductionBranch => "production branch",
            Self::StagingBranch => "staging branch",
            Self::CiActor => "CI actor",
            Self::VariablesFile => "terraform.tfvars",
            Self::LocalUser => "local user",
        };
        f.write_str(s)
    }
}

/// Fixed branch → tag mapping.
#[derive(Debug, Clone)]
pub struct BranchTable {
    pub production_branch: String,
    pub production_tag: String,
    pub staging_branch: String,
    pub staging_tag: String,
}

/// Everything the resolver may consult, already read from the environment.
#[derive(Debug, Clone, Default)]
pub struct OwnerTagInputs {
    /// `--prefix` override.
    pub explicit: Option<String>,
    /// CI branch reference, e.g. `refs/heads/main`.
    pub branch_ref: Option<String>,
    /// CI actor identity.
    pub actor: Option<String>,
    /// Tag recorded in the variables file by a previous run.
    pub previous: Option<String>,
    /// Local operating system user.
    pub local_user: Option<String>,
}

/// Resolve the owner tag. Total: the local user rule always yields a value.
#[must_use]
pub fn resolve_owner_tag(inputs: &OwnerTagInputs, table: &BranchTable) -> (OwnerTag, TagSource) {
    if let Some(tag) = non_empty(inputs.explicit.as_deref()) {
        return (tag, TagSource::Explicit);
    }
    if let Some(branch) = inputs.branch_ref.as_deref().map(str::trim) {
        if branch_matches(branch, &table.production_branch)
            && let Some(tag) = OwnerTag::new(&table.production_tag)
        {
            return (tag, TagSource::ProductionBranch);
        }
        if branch_matches(branch, &table.staging_branch)
            && let Some(tag) = OwnerTag::new(&table.staging_tag)
        {
            return (tag, TagSource::StagingBranch);
        }
    }
    if let Some(tag) = non_empty(inputs.actor.as_deref()) {
        return (tag, TagSource::CiActor);
    }
    if let Some(tag) = non_empty(inputs.previous.as_deref()) {
        return (tag, TagSource::VariablesFile);
    }
    let tag = non_empty(inputs.local_user.as_deref())
        .unwrap_or_else(|| OwnerTag(UNKNOWN_USER.to_string()));
    (tag, TagSource::LocalUser)
}

fn non_empty(value: Option<&str>) -> Option<OwnerTag> {
    value.and_then(OwnerTag::new)
}

/// `refs/heads/main` matches a configured `main` and vice versa.
fn branch_matches(actual: &str, configured: &str) -> bool {
    if actual.is_empty() || configured.is_empty() {
        return false;
    }
    actual == configured
        || actual.strip_prefix("refs/heads/") == Some(configured)
        || configured.strip_prefix("refs/heads/") == Some(actual)
}

// ── Variables file ────────────────────────────────────────────────────────────

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static OWNER_TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*owner_tag\s*=\s*"([^"]*)"\s*$"#).expect("valid owner_tag pattern")
});

/// Render the single-line variables file.
#[must_use]
pub fn render_variables(tag: &OwnerTag) -> String {
    format!("owner_tag = \"{tag}\"\n")
}

/// Extract the previously generated tag from variables file content.
#[must_use]
pub fn parse_previous_tag(content: &str) -> Option<String> {
    OWNER_TAG_LINE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
