//! Sample loop over the grid.

use std::io::Write;
use std::time::Instant;

use dispatch::DispatchSlot;
use hashing::{Context, FixedArena, Variant, Version, hash_ctx};

use crate::config::{GridPoint, HarnessConfig};
use crate::error::HarnessError;
use crate::report;

/// Tag length of every measured hash.
pub const OUTPUT_LEN: usize = 16;
/// Password of every measured hash.
pub const PASSWORD: [u8; 16] = [0; 16];
/// Salt of every measured hash.
pub const SALT: [u8; 16] = {
    let mut salt = [0u8; 16];
    salt[0] = 1;
    salt
};

/// Best latencies for one grid point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointResult {
    /// Parameters measured.
    pub point: GridPoint,
    /// Samples taken per variant.
    pub samples: u32,
    /// Fastest Argon2d sample in milliseconds.
    pub argon2d_ms: f64,
    /// Fastest Argon2i sample in milliseconds.
    pub argon2i_ms: f64,
}

/// Runs hashes for grid points against one pre-reserved arena.
#[derive(Debug)]
pub struct Harness<'a> {
    config: HarnessConfig,
    arena: &'a mut FixedArena,
    dispatch: &'a DispatchSlot,
}

impl<'a> Harness<'a> {
    /// Creates a harness; every sample hashes into `arena` through `dispatch`.
    pub fn new(
        config: HarnessConfig,
        arena: &'a mut FixedArena,
        dispatch: &'a DispatchSlot,
    ) -> Self {
        Self {
            config,
            arena,
            dispatch,
        }
    }

    /// Sweep bounds in use.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Takes [`HarnessConfig::sample_count`] Argon2d samples, then as many
    /// Argon2i samples, and keeps the minimum of each.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Hashing`] for the first failing sample.
    pub fn measure_point(&mut self, point: GridPoint) -> Result<PointResult, HarnessError> {
        let samples = self.config.sample_count(point);
        let argon2d_ms = self.min_latency(Variant::Argon2d, point, samples)?;
        let argon2i_ms = self.min_latency(Variant::Argon2i, point, samples)?;

        tracing::info!(
            target: "argon2::bench",
            t_cost = point.t_cost,
            m_cost = point.m_cost,
            threads = point.threads,
            samples,
            argon2d_ms,
            argon2i_ms,
            "grid point measured"
        );

        Ok(PointResult {
            point,
            samples,
            argon2d_ms,
            argon2i_ms,
        })
    }

    fn min_latency(
        &mut self,
        variant: Variant,
        point: GridPoint,
        samples: u32,
    ) -> Result<f64, HarnessError> {
        let mut out = [0u8; OUTPUT_LEN];
        let mut best = f64::INFINITY;

        for sample in 0..samples {
            let mut ctx = Context::new(&mut out, &PASSWORD, &SALT)
                .with_time_cost(point.t_cost)
                .with_memory_cost(point.m_cost)
                .with_parallelism(point.threads)
                .with_version(Version::V0x13)
                .with_allocator(&mut *self.arena)
                .with_dispatch(self.dispatch);

            let start = Instant::now();
            let result = hash_ctx(&mut ctx, variant);
            let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

            if let Err(source) = result {
                tracing::error!(
                    target: "argon2::bench",
                    %point,
                    variant = variant.name(),
                    code = source.code(),
                    "sample failed"
                );
                return Err(HarnessError::Hashing { point, source });
            }

            tracing::trace!(
                target: "argon2::bench",
                variant = variant.name(),
                sample,
                elapsed_ms,
                "sample"
            );
            best = best.min(elapsed_ms);
        }

        Ok(best)
    }
}

/// Reserves the arena for `config`, then runs [`run_with_arena`].
///
/// # Errors
///
/// Returns [`HarnessError::ArenaAllocation`] when the arena cannot be
/// reserved, otherwise whatever [`run_with_arena`] returns.
pub fn run<W: Write>(
    config: &HarnessConfig,
    dispatch: &DispatchSlot,
    out: &mut W,
) -> Result<Vec<PointResult>, HarnessError> {
    let blocks = config.arena_blocks();
    let mut arena = FixedArena::with_capacity(blocks).map_err(|error| {
        tracing::error!(target: "argon2::bench", blocks, %error, "arena reservation failed");
        HarnessError::ArenaAllocation { blocks }
    })?;
    run_with_arena(config, &mut arena, dispatch, out)
}

/// Writes the header, then measures and writes one row per grid point.
///
/// Rows are flushed as they complete. The sweep stops at the first failure,
/// leaving the rows already written in place.
///
/// # Errors
///
/// Returns [`HarnessError::Hashing`] for the first failing hash or
/// [`HarnessError::Output`] when `out` rejects a write.
pub fn run_with_arena<W: Write>(
    config: &HarnessConfig,
    arena: &mut FixedArena,
    dispatch: &DispatchSlot,
    out: &mut W,
) -> Result<Vec<PointResult>, HarnessError> {
    let grid = config.grid();
    tracing::debug!(
        target: "argon2::bench",
        points = grid.len(),
        arena_blocks = arena.capacity(),
        kernel = dispatch.current().name(),
        "sweep started"
    );

    writeln!(out, "{}", report::header())?;
    out.flush()?;

    let mut harness = Harness::new(config.clone(), arena, dispatch);
    let mut results = Vec::with_capacity(grid.len());
    for point in grid {
        let result = harness.measure_point(point)?;
        writeln!(out, "{}", report::format_row(&result))?;
        out.flush()?;
        results.push(result);
    }
    Ok(results)
}
