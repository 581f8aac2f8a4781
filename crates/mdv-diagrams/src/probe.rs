//! Render probing capability.
//!
//! The verifier asks a [`RenderProbe`] whether a diagram renders. The answer
//! is tri-state because the renderer itself may be missing: only
//! [`RenderStatus::Failed`] counts as a defect.

use serde::{Serialize, Serializer};

/// Tri-state outcome of a render attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Renderer accepted the diagram.
    Rendered,
    /// Renderer rejected the diagram, or the probe itself broke.
    Failed,
    /// Renderer missing, timed out, or disabled. Not a defect.
    Unavailable,
}

impl RenderStatus {
    /// `Some(true)`, `Some(false)`, or `None` for unavailable.
    #[must_use]
    pub fn as_tri_state(self) -> Option<bool> {
        match self {
            Self::Rendered => Some(true),
            Self::Failed => Some(false),
            Self::Unavailable => None,
        }
    }

    /// Whether this status adds to the run's error count.
    #[must_use]
    pub fn is_defect(self) -> bool {
        self == Self::Failed
    }
}

impl Serialize for RenderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_tri_state().serialize(serializer)
    }
}

/// Status plus a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub status: RenderStatus,
    pub message: String,
}

impl RenderOutcome {
    #[must_use]
    pub fn rendered() -> Self {
        Self {
            status: RenderStatus::Rendered,
            message: "Rendered successfully".to_owned(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: RenderStatus::Failed,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: RenderStatus::Unavailable,
            message: message.into(),
        }
    }
}

/// Narrow interface to an external diagram renderer.
///
/// Implementations must not panic or propagate errors: every failure maps to
/// a [`RenderOutcome`], so one probe can never abort its siblings.
pub trait RenderProbe: Send + Sync {
    /// Attempt to render `source`.
    fn probe(&self, source: &str) -> RenderOutcome;
}

/// Probe used when rendering is switched off. Always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProbe;

impl RenderProbe for DisabledProbe {
    fn probe(&self, _source: &str) -> RenderOutcome {
        RenderOutcome::unavailable("Rendering disabled")
    }
}
