//! Fatal configuration/shape errors and the non-fatal solve status.
//!
//! Configuration and shape problems are reported as `Error` before a
//! [`crate::params::Parameters`] is ever built. Numerical trouble during
//! the solve itself is not an `Error` — it is folded into
//! [`SolveStatus`], since the minimizer always hands back a usable
//! elevation field (see spec §7).

/// Fatal errors raised while validating inputs, before a solve starts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown norm {0:?}, expected one of huber, tukey, hubertukey, L2")]
    UnknownNorm(String),

    #[error("non-finite parameter: {0}")]
    NonFiniteParameter(&'static str),

    #[error("vmax ({vmax}) must be greater than vmin ({vmin})")]
    InvalidRange { vmin: f64, vmax: f64 },

    #[error("shape mismatch: {what} is {got_w}x{got_h}, expected {want_w}x{want_h}")]
    ShapeMismatch {
        what: &'static str,
        got_w: usize,
        got_h: usize,
        want_w: usize,
        want_h: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of the minimizer loop. Non-fatal: every variant carries a
/// valid elevation field in [`crate::minimizer::SolveOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Gradient norm dropped at or below the tolerance.
    Converged { iterations: u32 },
    /// Iteration cap (30000) reached without meeting the tolerance.
    IterationCap { iterations: u32 },
    /// The minimizer step failed (non-descent direction, or the
    /// objective/gradient produced a non-finite value).
    NumericalFailure { iterations: u32 },
}

impl SolveStatus {
    pub fn iterations(&self) -> u32 {
        match *self {
            SolveStatus::Converged { iterations }
            | SolveStatus::IterationCap { iterations }
            | SolveStatus::NumericalFailure { iterations } => iterations,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Converged { .. })
    }
}
