//! Synthetic single-segment workload used to rank candidate kernels.

use std::hint::black_box;
use std::time::Instant;

use kernels::{Block, Implementation, Instance, Layout, Position, Variant, Version};

use crate::error::SelectError;

/// Blocks in the synthetic instance; small enough to stay cache resident.
pub const BENCH_MEMORY_BLOCKS: u32 = 512;

/// Timed calls per round.
pub const DEFAULT_ITERATIONS: u32 = 2048;

/// Timed rounds per candidate.
pub const DEFAULT_ROUNDS: u32 = 3;

/// Repetition counts for one candidate measurement.
///
/// Both counts are floored at one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MicrobenchConfig {
    iterations: u32,
    rounds: u32,
}

impl Default for MicrobenchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl MicrobenchConfig {
    /// Sets the timed calls per round.
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Sets the number of timed rounds.
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    /// Timed calls per round.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Timed rounds.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Kernel invocations per measurement, warm-up included.
    #[must_use]
    pub const fn calls(&self) -> u64 {
        1 + self.iterations as u64 * self.rounds as u64
    }
}

/// Owns the scratch arena kernels are timed against.
///
/// The instance is Argon2i v0x13 with one pass, one lane and
/// [`BENCH_MEMORY_BLOCKS`] blocks. Every measurement fills the first segment
/// of the first slice, which is the only segment whose addresses do not
/// depend on earlier slices.
///
/// Costs are nanoseconds, but only their ordering within one process means
/// anything.
pub struct Microbenchmark {
    config: MicrobenchConfig,
    layout: Layout,
    arena: Box<[Block]>,
}

impl Microbenchmark {
    /// Allocates the scratch arena.
    pub fn new(config: MicrobenchConfig) -> Result<Self, SelectError> {
        let layout = Layout::new(
            Variant::Argon2i,
            Version::V0x13,
            1,
            1,
            1,
            BENCH_MEMORY_BLOCKS,
        )?;
        let arena = vec![Block::ZERO; layout.memory_blocks() as usize].into_boxed_slice();
        // Deserialized configs skip the setters' floor.
        let config = config
            .with_iterations(config.iterations)
            .with_rounds(config.rounds);
        Ok(Self {
            config,
            layout,
            arena,
        })
    }

    /// Repetition counts in use.
    #[must_use]
    pub const fn config(&self) -> MicrobenchConfig {
        self.config
    }

    /// Times `implementation` and returns its cost.
    ///
    /// The arena is zeroed, one untimed warm-up call runs, then each round
    /// times [`MicrobenchConfig::iterations`] calls back to back. The cost is
    /// the fastest round.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::Instance`] if the arena no longer matches the
    /// synthetic layout.
    pub fn measure(&mut self, implementation: &Implementation) -> Result<u64, SelectError> {
        self.arena.fill(Block::ZERO);
        let instance = Instance::new(&mut self.arena, self.layout)?;
        let position = Position::segment(0, 0, 0);

        implementation.fill_segment(&instance, position);

        let mut best = u64::MAX;
        for round in 0..self.config.rounds {
            let start = Instant::now();
            for _ in 0..self.config.iterations {
                implementation.fill_segment(&instance, black_box(position));
            }
            let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            tracing::trace!(
                target: "argon2::select",
                implementation = implementation.name(),
                round,
                elapsed_ns = elapsed,
                "microbenchmark round"
            );
            best = best.min(elapsed);
        }
        Ok(best)
    }
}

impl std::fmt::Debug for Microbenchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Microbenchmark")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
