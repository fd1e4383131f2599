//! Domain value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── NulPolicy ────────────────────────────────────────────────────────────────

/// What to do with an argument that contains a NUL byte before its end.
///
/// A C callee reads each argument up to the first NUL, so such an argument
/// can never reach it intact.
///
/// Parsed from `preserve` or `reject`, ignoring ASCII case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NulPolicy {
    /// Copy all bytes anyway; the callee sees the prefix before the first NUL.
    #[default]
    Preserve,
    /// Refuse to marshal the list.
    Reject,
}

impl NulPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for NulPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failure for [`NulPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown NUL policy: {0} (expected 'preserve' or 'reject')")]
pub struct UnknownNulPolicy(pub String);

impl FromStr for NulPolicy {
    type Err = UnknownNulPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Preserve, Self::Reject]
            .into_iter()
            .find(|policy| s.eq_ignore_ascii_case(policy.as_str()))
            .ok_or_else(|| UnknownNulPolicy(s.to_owned()))
    }
}
