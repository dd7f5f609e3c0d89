//! Application service — subscription resolution.

use tracing::debug;

use crate::application::ports::CloudProvider;
use crate::domain::RunError;

/// Resolve the Azure subscription id.
///
/// Prefers `env_value` (from `ARM_SUBSCRIPTION_ID`), then asks the cloud CLI
/// for the currently authenticated account. A failing query counts as "no
/// value", not as a hard error.
///
/// # Errors
///
/// Returns [`RunError::SubscriptionUnavailable`] when neither source yields
/// a non-empty value.
pub async fn resolve_subscription(
    env_value: Option<&str>,
    cloud: &impl CloudProvider,
) -> Result<String, RunError> {
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        debug!(source = "environment", "subscription resolved");
        return Ok(value.to_string());
    }
    match cloud.current_subscription().await {
        Ok(Some(value)) if !value.trim().is_empty() => {
            debug!(source = "az account", "subscription resolved");
            Ok(value.trim().to_string())
        }
        Ok(_) => Err(RunError::SubscriptionUnavailable),
        Err(e) => {
            debug!(error = %format!("{e:#}"), "az account query failed");
            Err(RunError::SubscriptionUnavailable)
        }
    }
}
