use std::io;

use hashing::HashError;
use thiserror::Error;

use crate::config::GridPoint;

/// Failures that abort a sweep.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The shared arena could not be reserved up front.
    #[error("cannot reserve {blocks} blocks for the benchmark arena")]
    ArenaAllocation {
        /// Blocks requested.
        blocks: usize,
    },
    /// A hash at one grid point returned an error.
    #[error("hashing failed at {point}: {source}")]
    Hashing {
        /// Grid point being measured.
        point: GridPoint,
        /// Error returned by the hash.
        #[source]
        source: HashError,
    },
    /// Writing the report failed.
    #[error("cannot write report: {0}")]
    Output(#[from] io::Error),
}

impl HarnessError {
    /// Process exit status for this failure.
    ///
    /// Hash failures exit with the low byte of the hash error code so a
    /// parameter error stays distinguishable from an allocation failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ArenaAllocation { .. } | Self::Output(_) => 1,
            Self::Hashing { source, .. } => source.code() as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_failures_exit_with_the_error_code() {
        let error = HarnessError::Hashing {
            point: GridPoint::new(1, 1024, 1),
            source: HashError::MemoryAllocation,
        };
        assert_eq!(error.exit_code(), 234);
        assert_eq!(
            error.to_string(),
            format!(
                "hashing failed at t_cost=1 m_cost=1024 threads=1: {}",
                HashError::MemoryAllocation
            )
        );
    }

    #[test]
    fn arena_and_output_failures_exit_with_one() {
        assert_eq!(HarnessError::ArenaAllocation { blocks: 8 }.exit_code(), 1);
        let output = HarnessError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(output.exit_code(), 1);
    }
}
