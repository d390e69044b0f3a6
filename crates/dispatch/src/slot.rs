//! Initialize-then-freeze holder of the active fill-segment kernel.

use std::fmt;
use std::sync::OnceLock;

use kernels::{Implementation, Instance, Position, REFERENCE};

use crate::error::SelectError;

/// Holds the kernel every fill-segment call goes through.
///
/// The slot starts out answering with its default implementation and accepts
/// exactly one [`install`](Self::install). After that it is frozen, and reads
/// need no further synchronisation.
///
/// # Examples
///
/// ```
/// use dispatch::DispatchSlot;
///
/// let slot = DispatchSlot::new();
/// assert_eq!(slot.current().name(), "(default)");
/// assert!(!slot.is_frozen());
/// ```
pub struct DispatchSlot {
    selected: OnceLock<Implementation>,
    default: Implementation,
}

impl DispatchSlot {
    /// A slot seeded with the portable reference kernel.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_default(REFERENCE)
    }

    /// A slot seeded with `default`.
    #[must_use]
    pub const fn with_default(default: Implementation) -> Self {
        Self {
            selected: OnceLock::new(),
            default,
        }
    }

    /// The installed kernel, or the default before installation.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Implementation {
        self.selected.get().copied().unwrap_or(self.default)
    }

    /// The kernel the slot was seeded with.
    #[must_use]
    pub const fn default_implementation(&self) -> Implementation {
        self.default
    }

    /// Reports whether a kernel has been installed.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.selected.get().is_some()
    }

    /// Installs `implementation` and freezes the slot.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::SlotFrozen`] if a kernel was already installed.
    pub fn install(&self, implementation: Implementation) -> Result<(), SelectError> {
        self.selected
            .set(implementation)
            .map_err(|rejected| SelectError::SlotFrozen {
                installed: self.current().name(),
                rejected: rejected.name(),
            })
    }

    /// Fills one segment with the current kernel.
    #[inline]
    pub fn fill_segment(&self, instance: &Instance<'_>, position: Position) {
        self.current().fill_segment(instance, position);
    }
}

impl Default for DispatchSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSlot")
            .field("current", &self.current().name())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

static GLOBAL: DispatchSlot = DispatchSlot::new();

/// Process-wide slot used by hashing contexts that do not name their own.
#[must_use]
pub fn global() -> &'static DispatchSlot {
    &GLOBAL
}

/// Name of the kernel the global slot currently dispatches to.
#[must_use]
pub fn active_implementation() -> &'static str {
    global().current().name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernels::Reference;

    static OTHER: Implementation = Implementation::new("other", None, &Reference);

    #[test]
    fn install_freezes_the_slot() {
        let slot = DispatchSlot::new();
        slot.install(OTHER).unwrap();
        assert!(slot.is_frozen());
        assert_eq!(slot.current(), OTHER);
        assert_eq!(slot.default_implementation(), REFERENCE);
    }

    #[test]
    fn second_install_is_rejected() {
        let slot = DispatchSlot::new();
        slot.install(OTHER).unwrap();
        assert_eq!(
            slot.install(REFERENCE),
            Err(SelectError::SlotFrozen {
                installed: "other",
                rejected: "(default)",
            })
        );
        assert_eq!(slot.current(), OTHER);
    }

    #[test]
    fn custom_default_is_served_before_install() {
        let slot = DispatchSlot::with_default(OTHER);
        assert_eq!(slot.current().name(), "other");
        assert!(!slot.is_frozen());
    }

    #[test]
    fn global_slot_is_shared() {
        assert!(std::ptr::eq(global(), global()));
        assert_eq!(active_implementation(), global().current().name());
    }
}
