//! Instance state and segment positions handed to fill-segment kernels.

use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr::NonNull;

use thiserror::Error;

use crate::block::Block;

/// Number of synchronisation points (slices) per pass.
pub const SYNC_POINTS: u32 = 4;

/// Argon2 addressing variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Variant {
    /// Data-dependent addressing.
    Argon2d = 0,
    /// Data-independent addressing.
    Argon2i = 1,
    /// Data-independent for the first half of the first pass, data-dependent afterwards.
    Argon2id = 2,
}

impl Variant {
    /// Numeric identifier mixed into the pre-hash and address blocks.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Canonical display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Argon2d => "Argon2d",
            Self::Argon2i => "Argon2i",
            Self::Argon2id => "Argon2id",
        }
    }

    /// Reports whether the segment at `position` derives its reference
    /// indices from the address generator instead of block contents.
    #[inline]
    #[must_use]
    pub const fn data_independent_at(self, position: Position) -> bool {
        match self {
            Self::Argon2d => false,
            Self::Argon2i => true,
            Self::Argon2id => position.pass == 0 && position.slice < SYNC_POINTS / 2,
        }
    }
}

/// Argon2 algorithm revision.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Version {
    /// Version 1.0: later passes overwrite blocks.
    V0x10 = 0x10,
    /// Version 1.3: later passes xor into existing blocks.
    #[default]
    V0x13 = 0x13,
}

impl Version {
    /// Numeric version tag.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Errors raised when building an [`Instance`] or its [`Layout`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum InstanceError {
    /// The pass count was zero.
    #[error("instance requires at least one pass")]
    ZeroPasses,
    /// The lane count was zero.
    #[error("instance requires at least one lane")]
    ZeroLanes,
    /// The thread count was zero.
    #[error("instance requires at least one thread")]
    ZeroThreads,
    /// The lane count cannot be laid out in 32-bit block indices.
    #[error("{lanes} lanes cannot be addressed with 32-bit block indices")]
    TooManyLanes {
        /// Requested lane count.
        lanes: u32,
    },
    /// The supplied memory does not match the layout's block count.
    #[error("instance expects {expected} memory blocks, received {actual}")]
    MemoryMismatch {
        /// Block count required by the layout.
        expected: usize,
        /// Block count actually supplied.
        actual: usize,
    },
}

/// Scalar shape of an Argon2 instance.
///
/// The constructor applies the reference memory rounding so that
/// `segment_length * SYNC_POINTS == lane_length` and
/// `lane_length * lanes == memory_blocks` always hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    variant: Variant,
    version: Version,
    passes: u32,
    lanes: u32,
    threads: u32,
    memory_blocks: u32,
    segment_length: u32,
    lane_length: u32,
}

impl Layout {
    /// Derives a layout from the cost parameters.
    ///
    /// `memory_cost` is in 1 KiB blocks. It is raised to the minimum of
    /// `2 * SYNC_POINTS` blocks per lane and rounded down to a whole number of
    /// segments per lane.
    pub fn new(
        variant: Variant,
        version: Version,
        passes: u32,
        lanes: u32,
        threads: u32,
        memory_cost: u32,
    ) -> Result<Self, InstanceError> {
        if passes == 0 {
            return Err(InstanceError::ZeroPasses);
        }
        if lanes == 0 {
            return Err(InstanceError::ZeroLanes);
        }
        if threads == 0 {
            return Err(InstanceError::ZeroThreads);
        }

        let lanes_wide = u64::from(lanes);
        let minimum = 2 * u64::from(SYNC_POINTS) * lanes_wide;
        let blocks = u64::from(memory_cost).max(minimum);
        let segment_length = blocks / (lanes_wide * u64::from(SYNC_POINTS));
        let memory_blocks = segment_length * lanes_wide * u64::from(SYNC_POINTS);
        let memory_blocks =
            u32::try_from(memory_blocks).map_err(|_| InstanceError::TooManyLanes { lanes })?;
        let segment_length = segment_length as u32;

        Ok(Self {
            variant,
            version,
            passes,
            lanes,
            threads,
            memory_blocks,
            segment_length,
            lane_length: segment_length * SYNC_POINTS,
        })
    }

    /// Addressing variant.
    #[inline]
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Algorithm revision.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Number of passes over memory.
    #[inline]
    #[must_use]
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    /// Number of lanes.
    #[inline]
    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    /// Number of threads the caller intends to fill lanes with.
    #[inline]
    #[must_use]
    pub const fn threads(&self) -> u32 {
        self.threads
    }

    /// Total number of memory blocks after rounding.
    #[inline]
    #[must_use]
    pub const fn memory_blocks(&self) -> u32 {
        self.memory_blocks
    }

    /// Blocks per segment.
    #[inline]
    #[must_use]
    pub const fn segment_length(&self) -> u32 {
        self.segment_length
    }

    /// Blocks per lane.
    #[inline]
    #[must_use]
    pub const fn lane_length(&self) -> u32 {
        self.lane_length
    }
}

/// Identifies the segment a kernel fills.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Position {
    /// Lane being filled.
    pub lane: u32,
    /// Pass over memory.
    pub pass: u32,
    /// Slice within the pass.
    pub slice: u32,
    /// Block index within the segment.
    pub index: u32,
}

impl Position {
    /// Position of the first block of the segment at (`pass`, `lane`, `slice`).
    #[must_use]
    pub const fn segment(pass: u32, lane: u32, slice: u32) -> Self {
        Self {
            lane,
            pass,
            slice,
            index: 0,
        }
    }
}

/// A [`Layout`] bound to the memory it describes.
///
/// The instance holds the memory as a raw pointer for its lifetime `'a`, so
/// kernels can mutate blocks through a shared reference. It is neither `Send`
/// nor `Sync`. Lanes of one slice can be filled concurrently only through
/// [`Instance::share`].
pub struct Instance<'a> {
    memory: NonNull<Block>,
    layout: Layout,
    _memory: PhantomData<&'a mut [Block]>,
}

impl<'a> Instance<'a> {
    /// Binds `layout` to `memory`.
    ///
    /// Fails with [`InstanceError::MemoryMismatch`] unless
    /// `memory.len() == layout.memory_blocks()`.
    pub fn new(memory: &'a mut [Block], layout: Layout) -> Result<Self, InstanceError> {
        let expected = layout.memory_blocks() as usize;
        if memory.len() != expected {
            return Err(InstanceError::MemoryMismatch {
                expected,
                actual: memory.len(),
            });
        }

        Ok(Self {
            memory: NonNull::from(memory).cast::<Block>(),
            layout,
            _memory: PhantomData,
        })
    }

    /// Returns the instance's layout.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Copies the block at `index` out of instance memory.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the instance's memory.
    #[must_use]
    pub fn read_block(&self, index: usize) -> Block {
        // SAFETY: `block_ptr` bounds-checks the index and no kernel runs while
        // this thread holds `&self` outside a fill call.
        unsafe { *self.block_ptr(index) }
    }

    /// Raw pointer to the block at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the instance's memory.
    #[inline(always)]
    pub(crate) fn block_ptr(&self, index: usize) -> *mut Block {
        assert!(index < self.layout.memory_blocks() as usize);
        // SAFETY: the index is within the allocation established in `new`.
        unsafe { self.memory.as_ptr().add(index) }
    }

    /// Shares the instance so several threads can fill lanes of one slice.
    ///
    /// # Safety
    ///
    /// While any [`SharedInstance`] is alive, concurrent kernel calls must
    /// target distinct lanes of the same `(pass, slice)`. That is the
    /// synchronisation pattern Argon2 defines. No other access to the
    /// instance may happen concurrently with those calls.
    #[must_use]
    pub const unsafe fn share(&self) -> SharedInstance<'_, 'a> {
        SharedInstance { instance: self }
    }

    /// Releases the instance and returns exclusive access to its memory.
    #[must_use]
    pub fn into_memory(self) -> &'a mut [Block] {
        let len = self.layout.memory_blocks() as usize;
        // SAFETY: the pointer and length came from the `&'a mut [Block]`
        // consumed by `new`, and `self` is consumed here.
        unsafe { core::slice::from_raw_parts_mut(self.memory.as_ptr(), len) }
    }
}

impl core::fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Instance")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Thread-shareable view of an [`Instance`], created by [`Instance::share`].
#[derive(Clone, Copy)]
pub struct SharedInstance<'i, 'a> {
    instance: &'i Instance<'a>,
}

// SAFETY: the contract of `Instance::share` restricts concurrent use to
// disjoint segments of one slice, which never write a block another thread reads.
unsafe impl Send for SharedInstance<'_, '_> {}
// SAFETY: see `Send` above.
unsafe impl Sync for SharedInstance<'_, '_> {}

impl<'a> Deref for SharedInstance<'_, 'a> {
    type Target = Instance<'a>;

    fn deref(&self) -> &Self::Target {
        self.instance
    }
}
