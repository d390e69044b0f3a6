use kernels::InstanceError;
use thiserror::Error;

/// Failure reported by the hashing entry points.
///
/// [`HashError::code`] returns the status code the reference library uses
/// for the same condition, so callers that surface numeric statuses stay
/// compatible with tooling built around it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum HashError {
    /// Output buffer shorter than four bytes.
    #[error("output is too short")]
    OutputTooShort,
    /// Output buffer longer than `u32::MAX` bytes.
    #[error("output is too long")]
    OutputTooLong,
    /// Password longer than `u32::MAX` bytes.
    #[error("password is too long")]
    PwdTooLong,
    /// Salt shorter than eight bytes.
    #[error("salt is too short")]
    SaltTooShort,
    /// Salt longer than `u32::MAX` bytes.
    #[error("salt is too long")]
    SaltTooLong,
    /// Associated data longer than `u32::MAX` bytes.
    #[error("associated data is too long")]
    AdTooLong,
    /// Secret longer than `u32::MAX` bytes.
    #[error("secret is too long")]
    SecretTooLong,
    /// Time cost of zero.
    #[error("time cost is too small")]
    TimeTooSmall,
    /// Memory cost below `2 * SYNC_POINTS` blocks per lane.
    #[error("memory cost is too small")]
    MemoryTooLittle,
    /// Lane count of zero.
    #[error("too few lanes")]
    LanesTooFew,
    /// Lane count above `0xFF_FFFF`.
    #[error("too many lanes")]
    LanesTooMany,
    /// The allocator could not provide the requested blocks.
    #[error("memory allocation error")]
    MemoryAllocation,
    /// Thread count of zero.
    #[error("not enough threads")]
    ThreadsTooFew,
    /// Thread count above `0xFF_FFFF`.
    #[error("too many threads")]
    ThreadsTooMany,
    /// The validated parameters still could not be laid out.
    #[error("invalid instance parameters: {0}")]
    Instance(#[from] InstanceError),
}

impl HashError {
    /// Reference-library status code for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashing::HashError;
    ///
    /// assert_eq!(HashError::MemoryAllocation.code(), -22);
    /// assert_eq!(HashError::SaltTooShort.code(), -6);
    /// ```
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::OutputTooShort => -2,
            Self::OutputTooLong => -3,
            Self::PwdTooLong => -5,
            Self::SaltTooShort => -6,
            Self::SaltTooLong => -7,
            Self::AdTooLong => -9,
            Self::SecretTooLong => -11,
            Self::TimeTooSmall => -12,
            Self::MemoryTooLittle => -14,
            Self::LanesTooFew => -16,
            Self::LanesTooMany => -17,
            Self::MemoryAllocation => -22,
            Self::Instance(_) => -25,
            Self::ThreadsTooFew => -28,
            Self::ThreadsTooMany => -29,
        }
    }
}
