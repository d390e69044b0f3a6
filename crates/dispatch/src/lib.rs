#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Benchmark-driven selection of the Argon2 fill-segment kernel.
//!
//! At start-up an embedding application calls [`select_implementation`]
//! once. Every catalog entry whose capability check passes is timed with the
//! [`Microbenchmark`], and the cheapest one is installed in the process-wide
//! [`DispatchSlot`]. Hashing then routes every segment fill through the slot.
//! The slot starts out holding the portable reference kernel, so hashing is
//! correct whether or not selection ever ran.
//!
//! The selector takes its cost function as a closure, which lets tests rank
//! fake candidates deterministically:
//!
//! ```
//! use dispatch::{DispatchSlot, KernelSelector};
//! use kernels::{Implementation, Reference};
//!
//! static SLOW: Implementation = Implementation::new("slow", None, &Reference);
//! static FAST: Implementation = Implementation::new("fast", None, &Reference);
//!
//! let slot = DispatchSlot::new();
//! let selection = KernelSelector::new(&slot)
//!     .run(&[SLOW, FAST], |candidate| Ok(if candidate.name() == "fast" { 10 } else { 20 }))
//!     .unwrap();
//!
//! assert_eq!(selection.chosen(), Some(FAST));
//! assert_eq!(slot.current().name(), "fast");
//! ```

mod error;
mod microbench;
mod select;
mod slot;

use std::borrow::Cow;
use std::io::Write;

use logging::ProgressSink;

pub use error::SelectError;
pub use microbench::{
    BENCH_MEMORY_BLOCKS, DEFAULT_ITERATIONS, DEFAULT_ROUNDS, MicrobenchConfig, Microbenchmark,
};
pub use select::{CandidateStatus, KernelSelector, Outcome, Selection};
pub use slot::{DispatchSlot, active_implementation, global};

/// Selects the fastest supported kernel and installs it in [`global`].
///
/// Progress lines go to `out`, each prefixed with `label`; `None` keeps the
/// sweep silent.
///
/// # Errors
///
/// Returns [`SelectError::AlreadySelected`] when the global slot already
/// holds a selected kernel.
pub fn select_implementation<W: Write>(
    out: Option<W>,
    label: impl Into<Cow<'static, str>>,
) -> Result<Selection, SelectError> {
    select_implementation_with(global(), MicrobenchConfig::default(), out, label)
}

/// Runs the real catalog through the real microbenchmark into `slot`.
///
/// # Errors
///
/// Returns [`SelectError::AlreadySelected`] when `slot` already holds a
/// selected kernel.
pub fn select_implementation_with<W: Write>(
    slot: &DispatchSlot,
    config: MicrobenchConfig,
    out: Option<W>,
    label: impl Into<Cow<'static, str>>,
) -> Result<Selection, SelectError> {
    let mut bench = Microbenchmark::new(config)?;
    let _span = tracing::debug_span!(
        target: "argon2::select",
        "select_implementation",
        iterations = config.iterations(),
        rounds = config.rounds()
    )
    .entered();

    KernelSelector::new(slot)
        .with_progress(ProgressSink::from_option(out, label))
        .run(kernels::implementations(), |candidate| bench.measure(candidate))
}
