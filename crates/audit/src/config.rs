//! Audit run settings.

use seqcraft_core::error::CoreError;
use seqcraft_core::types::DbId;

/// Audit configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditConfig {
    /// Only audit sequences of this owner.
    pub owner_id: Option<DbId>,
    /// Exit with status 2 when any sequence is structurally invalid.
    pub fail_on_invalid: bool,
    /// Apply pending migrations before auditing.
    pub run_migrations: bool,
    /// Print the full report as JSON on stdout.
    pub report_json: bool,
}

impl AuditConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default  |
    /// |-------------------------|----------|
    /// | `AUDIT_OWNER_ID`        | (all)    |
    /// | `AUDIT_FAIL_ON_INVALID` | `false`  |
    /// | `AUDIT_RUN_MIGRATIONS`  | `false`  |
    /// | `AUDIT_REPORT_JSON`     | `false`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let owner_id = match lookup("AUDIT_OWNER_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse().map_err(|_| {
                CoreError::Validation(format!("AUDIT_OWNER_ID must be an integer id, got '{raw}'"))
            })?),
            _ => None,
        };

        Ok(Self {
            owner_id,
            fail_on_invalid: flag(&lookup, "AUDIT_FAIL_ON_INVALID")?,
            run_migrations: flag(&lookup, "AUDIT_RUN_MIGRATIONS")?,
            report_json: flag(&lookup, "AUDIT_REPORT_JSON")?,
        })
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool, CoreError> {
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(CoreError::Validation(format!(
            "{key} must be true or false, got '{raw}'"
        ))),
    }
}
