//! Sweep bounds and the adaptive sample count.

use std::fmt;

/// Highest time cost in the sweep.
pub const MAX_T_COST: u32 = 8;
/// Lowest memory cost in the sweep, in KiB.
pub const MIN_M_COST: u32 = 1024;
/// Highest memory cost in the sweep, in KiB (1 GiB).
pub const MAX_M_COST: u32 = 1024 * 1024;
/// Highest parallelism in the sweep.
pub const MAX_THREADS: u32 = 4;
/// Block passes each grid point should cover across its samples.
pub const MIN_PASSES: u32 = 1024 * 1024;
/// Upper bound on samples per variant and grid point.
pub const MAX_SAMPLES: u32 = 128;

/// One `(t_cost, m_cost, threads)` combination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// Passes over memory.
    pub t_cost: u32,
    /// Memory in KiB.
    pub m_cost: u32,
    /// Lanes and threads.
    pub threads: u32,
}

impl GridPoint {
    /// Creates a grid point.
    #[must_use]
    pub const fn new(t_cost: u32, m_cost: u32, threads: u32) -> Self {
        Self {
            t_cost,
            m_cost,
            threads,
        }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t_cost={} m_cost={} threads={}",
            self.t_cost, self.m_cost, self.threads
        )
    }
}

/// Bounds of the sweep.
///
/// Each axis doubles from its floor up to and including its ceiling: time
/// cost from 1, memory cost from [`MIN_M_COST`], threads from 1.
///
/// # Examples
///
/// ```
/// use throughput::HarnessConfig;
///
/// let config = HarnessConfig::default()
///     .with_max_t_cost(2)
///     .with_max_m_cost(2048)
///     .with_max_threads(1);
/// assert_eq!(config.grid().len(), 4);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HarnessConfig {
    /// Time cost ceiling.
    pub max_t_cost: u32,
    /// Memory cost floor, in KiB.
    pub min_m_cost: u32,
    /// Memory cost ceiling, in KiB; also the arena size.
    pub max_m_cost: u32,
    /// Parallelism ceiling.
    pub max_threads: u32,
    /// Target passes per grid point.
    pub min_passes: u32,
    /// Sample cap.
    pub max_samples: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_t_cost: MAX_T_COST,
            min_m_cost: MIN_M_COST,
            max_m_cost: MAX_M_COST,
            max_threads: MAX_THREADS,
            min_passes: MIN_PASSES,
            max_samples: MAX_SAMPLES,
        }
    }
}

impl HarnessConfig {
    /// Sets the time cost ceiling.
    #[must_use]
    pub fn with_max_t_cost(mut self, max_t_cost: u32) -> Self {
        self.max_t_cost = max_t_cost;
        self
    }

    /// Sets the memory cost floor.
    #[must_use]
    pub fn with_min_m_cost(mut self, min_m_cost: u32) -> Self {
        self.min_m_cost = min_m_cost;
        self
    }

    /// Sets the memory cost ceiling.
    #[must_use]
    pub fn with_max_m_cost(mut self, max_m_cost: u32) -> Self {
        self.max_m_cost = max_m_cost;
        self
    }

    /// Sets the parallelism ceiling.
    #[must_use]
    pub fn with_max_threads(mut self, max_threads: u32) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Sets the target passes per grid point.
    #[must_use]
    pub fn with_min_passes(mut self, min_passes: u32) -> Self {
        self.min_passes = min_passes;
        self
    }

    /// Sets the sample cap.
    #[must_use]
    pub fn with_max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Grid points in sweep order: time cost outermost, threads innermost.
    #[must_use]
    pub fn grid(&self) -> Vec<GridPoint> {
        let mut points = Vec::new();
        for t_cost in doublings(1, self.max_t_cost) {
            for m_cost in doublings(self.min_m_cost, self.max_m_cost) {
                for threads in doublings(1, self.max_threads) {
                    points.push(GridPoint::new(t_cost, m_cost, threads));
                }
            }
        }
        points
    }

    /// Samples per variant: `ceil(min_passes * threads / (t_cost * m_cost))`,
    /// clamped to `[1, max_samples]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use throughput::{GridPoint, HarnessConfig};
    ///
    /// let config = HarnessConfig::default();
    /// assert_eq!(config.sample_count(GridPoint::new(1, 1024, 1)), 128);
    /// assert_eq!(config.sample_count(GridPoint::new(8, 65536, 1)), 2);
    /// assert_eq!(config.sample_count(GridPoint::new(8, 1 << 20, 4)), 1);
    /// ```
    #[must_use]
    pub fn sample_count(&self, point: GridPoint) -> u32 {
        let work = u64::from(point.t_cost) * u64::from(point.m_cost);
        let passes = u64::from(self.min_passes) * u64::from(point.threads);
        let samples = passes.div_ceil(work.max(1));
        let capped = samples.min(u64::from(self.max_samples)) as u32;
        capped.max(1)
    }

    /// Blocks the shared arena needs to serve every grid point.
    #[must_use]
    pub fn arena_blocks(&self) -> usize {
        self.max_m_cost as usize
    }
}

fn doublings(start: u32, ceiling: u32) -> impl Iterator<Item = u32> {
    std::iter::successors(Some(start).filter(|&first| first > 0), |value| {
        value.checked_mul(2)
    })
    .take_while(move |&value| value <= ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_every_combination() {
        let grid = HarnessConfig::default().grid();
        // 4 time costs, 11 memory costs, 3 thread counts
        assert_eq!(grid.len(), 4 * 11 * 3);
        assert_eq!(grid[0], GridPoint::new(1, 1024, 1));
        assert_eq!(grid[1], GridPoint::new(1, 1024, 2));
        assert_eq!(grid[3], GridPoint::new(1, 2048, 1));
        assert_eq!(grid.last(), Some(&GridPoint::new(8, 1 << 20, 4)));
    }

    #[test]
    fn doublings_include_the_ceiling() {
        assert_eq!(doublings(1, 8).collect::<Vec<_>>(), [1, 2, 4, 8]);
        assert_eq!(doublings(1, 7).collect::<Vec<_>>(), [1, 2, 4]);
        assert_eq!(doublings(3, 2).count(), 0);
        assert_eq!(doublings(0, 8).count(), 0);
    }

    #[test]
    fn doublings_stop_before_overflow() {
        assert_eq!(doublings(1 << 30, u32::MAX).collect::<Vec<_>>(), [1 << 30, 1 << 31]);
    }

    #[test]
    fn sample_count_rounds_up() {
        let config = HarnessConfig::default().with_min_passes(10);
        assert_eq!(config.sample_count(GridPoint::new(1, 3, 1)), 4);
        assert_eq!(config.sample_count(GridPoint::new(1, 5, 1)), 2);
        assert_eq!(config.sample_count(GridPoint::new(1, 20, 1)), 1);
    }

    #[test]
    fn display_names_every_axis() {
        assert_eq!(
            GridPoint::new(2, 4096, 4).to_string(),
            "t_cost=2 m_cost=4096 threads=4"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_fills_missing_fields() {
        let config: HarnessConfig = serde_json::from_str(r#"{"max_threads":1}"#).unwrap();
        assert_eq!(config.max_threads, 1);
        assert_eq!(config.max_m_cost, MAX_M_COST);
    }
}
