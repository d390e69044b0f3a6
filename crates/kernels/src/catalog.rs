//! Candidate fill-segment implementations known to this build.

use core::fmt;

use crate::arch;
use crate::compress::Portable;
use crate::instance::{Instance, Position};
use crate::segment;

/// A fill-segment kernel: derives one segment of blocks in place.
///
/// Implementations must produce memory identical to [`Reference`] for every
/// instance and position, and must be safe to call on any host. Kernels that
/// need optional instructions verify them before entering the
/// instruction-specific body.
pub trait FillSegment: Send + Sync {
    /// Fills the segment at `position` of `instance`.
    fn fill_segment(&self, instance: &Instance<'_>, position: Position);
}

/// Portable kernel compiled for the target's baseline feature set.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reference;

impl FillSegment for Reference {
    fn fill_segment(&self, instance: &Instance<'_>, position: Position) {
        segment::fill_segment::<Portable>(instance, position);
    }
}

/// Descriptor of one catalog entry.
#[derive(Clone, Copy)]
pub struct Implementation {
    name: &'static str,
    check: Option<fn() -> bool>,
    kernel: &'static dyn FillSegment,
}

impl Implementation {
    /// Creates a descriptor. `check` of `None` means the kernel is always applicable.
    #[must_use]
    pub const fn new(
        name: &'static str,
        check: Option<fn() -> bool>,
        kernel: &'static dyn FillSegment,
    ) -> Self {
        Self {
            name,
            check,
            kernel,
        }
    }

    /// Diagnostic name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reports whether the descriptor carries a capability check.
    #[inline]
    #[must_use]
    pub const fn has_check(&self) -> bool {
        self.check.is_some()
    }

    /// Runs the capability check; entries without one always pass.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.check.is_none_or(|check| check())
    }

    /// Invokes the entry point.
    #[inline]
    pub fn fill_segment(&self, instance: &Instance<'_>, position: Position) {
        self.kernel.fill_segment(instance, position);
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("name", &self.name)
            .field("has_check", &self.has_check())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Implementation {
    /// Catalog names are unique, so descriptors compare by name.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Implementation {}

/// The portable implementation every dispatch slot starts with.
pub const REFERENCE: Implementation = Implementation::new("(default)", None, &Reference);

/// Returns the optimized candidates compiled into this build, in the order
/// they should be benchmarked.
///
/// The list is empty on targets without architecture-specific kernels.
#[must_use]
pub fn implementations() -> &'static [Implementation] {
    arch::IMPLEMENTATIONS
}
