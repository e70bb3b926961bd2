//! Application lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Settings for the status transition controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Reject transitions outside the allowed-next table instead of
    /// logging a warning and applying them.
    #[serde(default)]
    pub strict_transitions: bool,
}
