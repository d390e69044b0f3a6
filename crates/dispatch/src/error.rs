use kernels::InstanceError;
use thiserror::Error;

/// Errors raised while selecting or installing a fill-segment kernel.
///
/// A candidate whose capability check fails is not an error; it is recorded
/// as [`CandidateStatus::CapabilityUnsupported`](crate::CandidateStatus) in
/// the [`Selection`](crate::Selection) report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SelectError {
    /// A sweep was started on a slot that already holds an installed kernel.
    #[error("dispatch slot already holds '{installed}'; selection not run")]
    AlreadySelected {
        /// Kernel the slot keeps.
        installed: &'static str,
    },
    /// The slot already holds an installed kernel.
    #[error("dispatch slot already holds '{installed}'; refusing to install '{rejected}'")]
    SlotFrozen {
        /// Kernel the slot keeps.
        installed: &'static str,
        /// Kernel that could not be installed.
        rejected: &'static str,
    },
    /// The synthetic microbenchmark instance could not be laid out or built.
    #[error("microbenchmark instance is invalid: {0}")]
    Instance(#[from] InstanceError),
}
