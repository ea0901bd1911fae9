//! Parse configuration.

use serde::{Deserialize, Serialize};

/// How construction faults are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Faults abort the parse with an [`AstError`](crate::AstError).
    #[default]
    Strict,
    /// Faults are logged and tolerated: a failing mandatory member stays
    /// empty and discards a mismatched stack top, and a root stack of the
    /// wrong depth is trimmed to its top node.
    Lenient,
}

/// Options for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    pub fault_policy: FaultPolicy,
}

impl ParseConfig {
    pub fn strict() -> Self {
        Self {
            fault_policy: FaultPolicy::Strict,
        }
    }

    pub fn lenient() -> Self {
        Self {
            fault_policy: FaultPolicy::Lenient,
        }
    }

    /// Reads a configuration from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
