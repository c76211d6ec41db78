use serde::{Deserialize, Serialize};

/// How populated scope dimensions combine when a policy is not
/// "all tickets".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMatch {
    /// Any populated dimension matching is enough (channel OR priority OR
    /// custom field).
    #[default]
    Any,
    /// Every populated dimension must match. Custom-field scopes sharing a
    /// key still combine with OR among themselves.
    All,
}

/// Configuration for the SLA evaluator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaConfig {
    /// Combination rule for scope dimensions.
    pub scope_match: ScopeMatch,
}

impl SlaConfig {
    /// Configuration requiring every populated dimension to match.
    pub fn strict() -> Self {
        Self {
            scope_match: ScopeMatch::All,
        }
    }
}
