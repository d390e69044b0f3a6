//! Sweeps the candidate list, ranks the passers and installs the winner.

use std::io::{self, Write};

use kernels::Implementation;
use logging::ProgressSink;

use crate::error::SelectError;
use crate::slot::DispatchSlot;

/// What happened to one candidate during a sweep.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CandidateStatus {
    /// The capability check failed; the candidate was never benchmarked.
    CapabilityUnsupported,
    /// The candidate passed its check and was measured.
    Measured {
        /// Cost reported by the measure function.
        cost: u64,
    },
}

/// Per-candidate record in a [`Selection`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Outcome {
    /// Candidate name.
    pub name: &'static str,
    /// Check and measurement result.
    pub status: CandidateStatus,
}

/// Report returned by [`KernelSelector::run`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    outcomes: Vec<Outcome>,
    chosen: Option<(Implementation, u64)>,
}

impl Selection {
    /// Outcomes in candidate order.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// The installed candidate, if any passed its check.
    #[must_use]
    pub fn chosen(&self) -> Option<Implementation> {
        self.chosen.map(|(implementation, _)| implementation)
    }

    /// Cost of the installed candidate.
    #[must_use]
    pub fn chosen_cost(&self) -> Option<u64> {
        self.chosen.map(|(_, cost)| cost)
    }

    /// Reports whether the slot kept its default.
    #[must_use]
    pub fn kept_default(&self) -> bool {
        self.chosen.is_none()
    }
}

/// One-shot driver of the selection sweep.
///
/// Not safe to run concurrently with itself or with hashing that reads the
/// same slot. Run it once, before any hashing starts.
pub struct KernelSelector<'s, W> {
    slot: &'s DispatchSlot,
    progress: ProgressSink<W>,
}

impl<'s> KernelSelector<'s, io::Sink> {
    /// A silent selector that installs into `slot`.
    #[must_use]
    pub const fn new(slot: &'s DispatchSlot) -> Self {
        Self {
            slot,
            progress: ProgressSink::disabled(),
        }
    }
}

impl<'s, W: Write> KernelSelector<'s, W> {
    /// Routes progress lines to `progress`.
    #[must_use]
    pub fn with_progress<V: Write>(self, progress: ProgressSink<V>) -> KernelSelector<'s, V> {
        KernelSelector {
            slot: self.slot,
            progress,
        }
    }

    /// Gives back the progress sink.
    #[must_use]
    pub fn into_progress(self) -> ProgressSink<W> {
        self.progress
    }

    /// Checks and measures every candidate in order, then installs the
    /// cheapest passer.
    ///
    /// Only a strictly lower cost displaces the current best, so ties go to
    /// the earlier candidate. When nothing passes the slot is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::AlreadySelected`] before checking or measuring
    /// anything if the slot already holds an installed kernel. An error from
    /// `measure` aborts the sweep with the slot untouched.
    pub fn run<M>(
        &mut self,
        candidates: &[Implementation],
        mut measure: M,
    ) -> Result<Selection, SelectError>
    where
        M: FnMut(&Implementation) -> Result<u64, SelectError>,
    {
        if self.slot.is_frozen() {
            let installed = self.slot.current().name();
            tracing::warn!(
                target: "argon2::select",
                implementation = installed,
                "slot already frozen; skipping selection"
            );
            return Err(SelectError::AlreadySelected { installed });
        }

        let progress = &mut self.progress;
        progress.line(format_args!("Selecting fill_segment function implementation..."));

        let mut selection = Selection {
            outcomes: Vec::with_capacity(candidates.len()),
            chosen: None,
        };

        for candidate in candidates {
            let name = candidate.name();
            if !candidate.is_supported() {
                progress.line(format_args!(
                    "  Checking implementation '{name}'... CHECK FAILED!"
                ));
                tracing::debug!(
                    target: "argon2::select",
                    implementation = name,
                    "capability check failed"
                );
                selection.outcomes.push(Outcome {
                    name,
                    status: CandidateStatus::CapabilityUnsupported,
                });
                continue;
            }

            progress.line(format_args!("  Checking implementation '{name}'... OK!"));
            progress.line(format_args!("    Measuring..."));
            let cost = measure(candidate).inspect_err(|error| {
                tracing::error!(
                    target: "argon2::select",
                    implementation = name,
                    %error,
                    "measurement failed"
                );
            })?;
            progress.line(format_args!("    Benchmark result: {cost}"));
            tracing::debug!(
                target: "argon2::select",
                implementation = name,
                cost,
                "candidate measured"
            );

            selection.outcomes.push(Outcome {
                name,
                status: CandidateStatus::Measured { cost },
            });
            if selection.chosen.is_none_or(|(_, best)| cost < best) {
                selection.chosen = Some((*candidate, cost));
            }
        }

        match selection.chosen {
            Some((implementation, cost)) => {
                progress.line(format_args!(
                    "  Selecting best implementation: '{}' (bench {cost})...",
                    implementation.name()
                ));
                self.slot.install(implementation)?;
                tracing::info!(
                    target: "argon2::select",
                    implementation = implementation.name(),
                    cost,
                    "fill_segment implementation installed"
                );
            }
            None => {
                progress.line(format_args!(
                    "  No optimized implementation available, using default!"
                ));
                tracing::info!(
                    target: "argon2::select",
                    implementation = self.slot.current().name(),
                    "no candidate passed; keeping default"
                );
            }
        }

        progress.line(format_args!("  Done!"));
        Ok(selection)
    }
}

impl<W> std::fmt::Debug for KernelSelector<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelSelector")
            .field("slot", self.slot)
            .field("progress", &self.progress)
            .finish()
    }
}
