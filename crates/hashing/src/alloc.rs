//! Block memory providers for hashing contexts.

use kernels::Block;

use crate::error::HashError;

/// Supplies the block memory one hash runs in.
///
/// [`allocate`](Self::allocate) is called once per hash with the number of
/// blocks the layout needs; the returned slice may be longer and only its
/// prefix is used. [`release`](Self::release) is called after the hash
/// finished and the blocks were wiped.
pub trait BlockAllocator {
    /// Provides at least `blocks` blocks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::MemoryAllocation`] when the request cannot be met.
    fn allocate(&mut self, blocks: usize) -> Result<&mut [Block], HashError>;

    /// Ends the allocation made by the last [`allocate`](Self::allocate).
    fn release(&mut self) {}
}

/// Heap allocator used when a context names no allocator.
///
/// Every allocation is a fresh, fallibly reserved buffer that is freed on
/// release.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    blocks: Vec<Block>,
}

impl HeapAllocator {
    /// An allocator holding no memory.
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }
}

impl BlockAllocator for HeapAllocator {
    fn allocate(&mut self, blocks: usize) -> Result<&mut [Block], HashError> {
        self.blocks = Vec::new();
        self.blocks
            .try_reserve_exact(blocks)
            .map_err(|_| HashError::MemoryAllocation)?;
        self.blocks.resize(blocks, Block::ZERO);
        Ok(self.blocks.as_mut_slice())
    }

    fn release(&mut self) {
        self.blocks = Vec::new();
    }
}

/// Word every block of a [`FixedArena`] is prefaulted with.
pub const PREFAULT_WORD: u64 = u64::from_ne_bytes([0xAB; 8]);

/// Pre-allocated arena reused across hashes.
///
/// The arena is written once at construction so its pages are resident
/// before any timing starts. Requests larger than the capacity fail with
/// [`HashError::MemoryAllocation`]; release is a no-op.
///
/// # Examples
///
/// ```
/// use hashing::{BlockAllocator, FixedArena, HashError};
///
/// let mut arena = FixedArena::with_capacity(16).unwrap();
/// assert_eq!(arena.allocate(16).unwrap().len(), 16);
/// assert_eq!(arena.allocate(17).unwrap_err(), HashError::MemoryAllocation);
/// ```
pub struct FixedArena {
    blocks: Box<[Block]>,
}

impl FixedArena {
    /// Reserves and prefaults `blocks` blocks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::MemoryAllocation`] when the reservation fails.
    pub fn with_capacity(blocks: usize) -> Result<Self, HashError> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(blocks)
            .map_err(|_| HashError::MemoryAllocation)?;
        storage.resize(blocks, Block::filled(PREFAULT_WORD));
        Ok(Self {
            blocks: storage.into_boxed_slice(),
        })
    }

    /// Number of blocks the arena can hand out.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }
}

impl BlockAllocator for FixedArena {
    fn allocate(&mut self, blocks: usize) -> Result<&mut [Block], HashError> {
        self.blocks
            .get_mut(..blocks)
            .ok_or(HashError::MemoryAllocation)
    }
}

impl std::fmt::Debug for FixedArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedArena")
            .field("capacity", &self.capacity())
            .finish()
    }
}
