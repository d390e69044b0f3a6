#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

//! Context-based Argon2 entry points.
//!
//! Each entry point validates a [`Context`], derives the instance layout,
//! seeds the first two blocks of every lane, fills memory slice by slice and
//! hashes the xor of the last column into the output buffer. Every segment
//! fill goes through the context's [`DispatchSlot`](dispatch::DispatchSlot),
//! which is [`dispatch::global`] unless the caller names another slot.
//!
//! Lanes of one slice are filled on rayon workers when the context asks for
//! more than one thread and the `parallel` feature is enabled.
//!
//! ```
//! use hashing::{Context, HashError, argon2id_ctx};
//!
//! let mut tag = [0u8; 32];
//! let mut ctx = Context::new(&mut tag, b"password", b"somesalt").with_memory_cost(32);
//! argon2id_ctx(&mut ctx)?;
//! # Ok::<(), HashError>(())
//! ```

mod alloc;
mod blake2b;
mod context;
mod engine;
mod error;

pub use alloc::{BlockAllocator, FixedArena, HeapAllocator, PREFAULT_WORD};
pub use context::{Context, MAX_LANES, MAX_THREADS, MIN_OUTLEN, MIN_SALT_LENGTH};
pub use error::HashError;
pub use kernels::{Variant, Version};

/// Argon2d: data-dependent addressing throughout.
///
/// # Errors
///
/// Returns the first parameter violation, or [`HashError::MemoryAllocation`]
/// when the allocator cannot supply the blocks.
pub fn argon2d_ctx(ctx: &mut Context<'_>) -> Result<(), HashError> {
    hash_ctx(ctx, Variant::Argon2d)
}

/// Argon2i: data-independent addressing throughout.
///
/// # Errors
///
/// See [`argon2d_ctx`].
pub fn argon2i_ctx(ctx: &mut Context<'_>) -> Result<(), HashError> {
    hash_ctx(ctx, Variant::Argon2i)
}

/// Argon2id: data-independent for the first half of the first pass.
///
/// # Errors
///
/// See [`argon2d_ctx`].
pub fn argon2id_ctx(ctx: &mut Context<'_>) -> Result<(), HashError> {
    hash_ctx(ctx, Variant::Argon2id)
}

/// Hashes `ctx` with an explicit variant.
///
/// # Errors
///
/// See [`argon2d_ctx`].
pub fn hash_ctx(ctx: &mut Context<'_>, variant: Variant) -> Result<(), HashError> {
    engine::hash(ctx, variant)
}
