#![deny(missing_docs)]
#![deny(unsafe_code)]

//! End-to-end Argon2 throughput sweep.
//!
//! The harness walks a grid of time cost, memory cost and parallelism, each
//! doubling from its floor to its ceiling. At every point it takes an
//! adaptive number of Argon2d samples, then as many Argon2i samples, and
//! reports the fastest of each in milliseconds. Every hash draws its memory
//! from one [`FixedArena`](hashing::FixedArena) reserved before the sweep so
//! allocation stays out of the timings.
//!
//! ```no_run
//! use throughput::{HarnessConfig, run};
//!
//! let config = HarnessConfig::default().with_max_m_cost(4096);
//! run(&config, dispatch::global(), &mut std::io::stdout().lock())?;
//! # Ok::<(), throughput::HarnessError>(())
//! ```

mod config;
mod error;
mod harness;
mod report;

pub use config::{
    GridPoint, HarnessConfig, MAX_M_COST, MAX_SAMPLES, MAX_T_COST, MAX_THREADS, MIN_M_COST,
    MIN_PASSES,
};
pub use error::HarnessError;
pub use harness::{Harness, OUTPUT_LEN, PASSWORD, PointResult, SALT, run, run_with_arena};
pub use report::{format_row, header};
