//! One complete hash: pre-hash, first blocks, memory fill and finalization.

use dispatch::DispatchSlot;
use kernels::{BLOCK_SIZE, Block, Instance, Layout, Position, SYNC_POINTS, Variant};
use zeroize::Zeroize;

use crate::alloc::{BlockAllocator, HeapAllocator};
use crate::blake2b::{self, DIGEST_LENGTH};
use crate::context::Context;
use crate::error::HashError;

/// Validates `ctx` and writes the tag for `variant` into its output buffer.
pub(crate) fn hash(ctx: &mut Context<'_>, variant: Variant) -> Result<(), HashError> {
    ctx.validate()?;
    let layout = Layout::new(
        variant,
        ctx.version,
        ctx.t_cost,
        ctx.lanes,
        ctx.threads,
        ctx.m_cost,
    )?;

    tracing::trace!(
        target: "argon2::hash",
        variant = variant.name(),
        t_cost = ctx.t_cost,
        m_cost = ctx.m_cost,
        lanes = ctx.lanes,
        kernel = ctx.dispatch.current().name(),
        "hash started"
    );

    let mut h0 = initial_hash(ctx, variant)?;
    let dispatch = ctx.dispatch;
    let result = match ctx.allocator.as_deref_mut() {
        Some(allocator) => run(allocator, layout, &h0, dispatch, ctx.out),
        None => run(&mut HeapAllocator::new(), layout, &h0, dispatch, ctx.out),
    };
    h0.zeroize();

    if let Err(error) = &result {
        tracing::debug!(target: "argon2::hash", %error, code = error.code(), "hash failed");
    }
    result
}

/// `H0`: BLAKE2b-512 over the cost parameters and every input with its length.
fn initial_hash(ctx: &Context<'_>, variant: Variant) -> Result<[u8; DIGEST_LENGTH], HashError> {
    let secret = ctx.secret.unwrap_or_default();
    let ad = ctx.ad.unwrap_or_default();
    blake2b::digest(&[
        &ctx.lanes.to_le_bytes(),
        &length(ctx.out.len())?,
        &ctx.m_cost.to_le_bytes(),
        &ctx.t_cost.to_le_bytes(),
        &ctx.version.as_u32().to_le_bytes(),
        &variant.as_u32().to_le_bytes(),
        &length(ctx.pwd.len())?,
        ctx.pwd,
        &length(ctx.salt.len())?,
        ctx.salt,
        &length(secret.len())?,
        secret,
        &length(ad.len())?,
        ad,
    ])
}

fn length(len: usize) -> Result<[u8; 4], HashError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| HashError::OutputTooLong)
}

fn run<A: BlockAllocator + ?Sized>(
    allocator: &mut A,
    layout: Layout,
    h0: &[u8; DIGEST_LENGTH],
    dispatch: &DispatchSlot,
    out: &mut [u8],
) -> Result<(), HashError> {
    let memory = allocator.allocate(layout.memory_blocks() as usize)?;
    let result = fill_and_finalize(memory, layout, h0, dispatch, out);
    allocator.release();
    result
}

fn fill_and_finalize(
    memory: &mut [Block],
    layout: Layout,
    h0: &[u8; DIGEST_LENGTH],
    dispatch: &DispatchSlot,
    out: &mut [u8],
) -> Result<(), HashError> {
    let memory = memory
        .get_mut(..layout.memory_blocks() as usize)
        .ok_or(HashError::MemoryAllocation)?;

    let result = fill_first_blocks(memory, layout, h0).and_then(|()| {
        let instance = Instance::new(&mut *memory, layout)?;
        fill_memory(&instance, layout, dispatch);
        let memory = instance.into_memory();
        finalize(memory, layout, out)
    });

    for block in memory.iter_mut() {
        block.words_mut().zeroize();
    }
    result
}

/// Blocks 0 and 1 of every lane: `H'^1024(H0 || LE32(i) || LE32(lane))`.
fn fill_first_blocks(
    memory: &mut [Block],
    layout: Layout,
    h0: &[u8; DIGEST_LENGTH],
) -> Result<(), HashError> {
    let lane_length = layout.lane_length() as usize;
    let mut bytes = [0u8; BLOCK_SIZE];
    for lane in 0..layout.lanes() {
        for index in 0..2u32 {
            blake2b::blake2b_long(
                &mut bytes,
                &[h0, &index.to_le_bytes(), &lane.to_le_bytes()],
            )?;
            memory[lane as usize * lane_length + index as usize] = Block::from_le_bytes(&bytes);
        }
    }
    bytes.zeroize();
    Ok(())
}

fn fill_memory(instance: &Instance<'_>, layout: Layout, dispatch: &DispatchSlot) {
    for pass in 0..layout.passes() {
        for slice in 0..SYNC_POINTS {
            fill_slice(instance, layout, dispatch, pass, slice);
        }
    }
}

#[cfg(feature = "parallel")]
fn fill_slice(
    instance: &Instance<'_>,
    layout: Layout,
    dispatch: &DispatchSlot,
    pass: u32,
    slice: u32,
) {
    use rayon::prelude::*;

    if layout.threads() > 1 && layout.lanes() > 1 {
        // SAFETY: each worker fills a different lane of the same (pass, slice)
        // and nothing else touches the instance until the iterator returns.
        let shared = unsafe { instance.share() };
        (0..layout.lanes()).into_par_iter().for_each(|lane| {
            dispatch.fill_segment(&shared, Position::segment(pass, lane, slice));
        });
    } else {
        fill_slice_sequential(instance, layout, dispatch, pass, slice);
    }
}

#[cfg(not(feature = "parallel"))]
fn fill_slice(
    instance: &Instance<'_>,
    layout: Layout,
    dispatch: &DispatchSlot,
    pass: u32,
    slice: u32,
) {
    fill_slice_sequential(instance, layout, dispatch, pass, slice);
}

fn fill_slice_sequential(
    instance: &Instance<'_>,
    layout: Layout,
    dispatch: &DispatchSlot,
    pass: u32,
    slice: u32,
) {
    for lane in 0..layout.lanes() {
        dispatch.fill_segment(instance, Position::segment(pass, lane, slice));
    }
}

/// Xors the last block of every lane and hashes it into `out`.
fn finalize(memory: &[Block], layout: Layout, out: &mut [u8]) -> Result<(), HashError> {
    let lane_length = layout.lane_length() as usize;
    let mut last = memory[lane_length - 1];
    for lane in 1..layout.lanes() as usize {
        last ^= &memory[lane * lane_length + lane_length - 1];
    }

    let mut bytes = last.to_le_bytes();
    let result = blake2b::blake2b_long(out, &[&bytes]);
    bytes.zeroize();
    last.words_mut().zeroize();
    result
}
