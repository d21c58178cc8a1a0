//! Canonical node lifecycle states and the provider status mapping.

use crate::Result;
use brightbox_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical lifecycle state of a compute node.
///
/// The set is deliberately coarser than the provider's status strings so it
/// stays stable across providers. Several provider states collapse onto
/// [`NodeState::Unknown`] rather than growing the canonical set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Node is being provisioned
    Pending,
    /// Node is up
    Running,
    /// Node is restarting
    Rebooting,
    /// Node has been destroyed
    Terminated,
    /// Provider state with no canonical equivalent
    Unknown,
}

impl NodeState {
    /// Map a provider status string onto the canonical state.
    ///
    /// # Errors
    ///
    /// Returns a schema violation for statuses outside the documented set,
    /// so an undocumented provider status surfaces loudly instead of being
    /// defaulted.
    pub fn from_provider_status(status: &str) -> Result<Self> {
        match status {
            "creating" => Ok(Self::Pending),
            "active" => Ok(Self::Running),
            "inactive" => Ok(Self::Unknown),
            "deleting" => Ok(Self::Unknown),
            "deleted" => Ok(Self::Terminated),
            "failed" => Ok(Self::Unknown),
            "unavailable" => Ok(Self::Unknown),
            other => Err(Error::schema(
                "server",
                format!("unrecognized status `{other}`"),
            )),
        }
    }

    /// Canonical lowercase name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Rebooting => "rebooting",
            Self::Terminated => "terminated",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
