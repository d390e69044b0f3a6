//! Argon2 compression function `G` built on the BLAKE2b round.
//!
//! Every function here is `#[inline(always)]` so the whole round body is
//! re-emitted inside each `#[target_feature]` kernel and vectorised for that
//! instruction set. Kernels with hand-written rounds plug in through
//! [`Permute`].

use crate::block::{Block, QWORDS_IN_BLOCK};

/// Multiply-hardened addition: `x + y + 2 * lo32(x) * lo32(y)`.
#[inline(always)]
const fn blamka(x: u64, y: u64) -> u64 {
    let product = (x & 0xffff_ffff).wrapping_mul(y & 0xffff_ffff);
    x.wrapping_add(y).wrapping_add(product.wrapping_mul(2))
}

#[inline(always)]
fn quarter_round(v: &mut [u64; QWORDS_IN_BLOCK], a: usize, b: usize, c: usize, d: usize) {
    v[a] = blamka(v[a], v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = blamka(v[c], v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = blamka(v[a], v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = blamka(v[c], v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// One BLAKE2b round without message words over the 16 words at `idx`.
#[inline(always)]
fn round(v: &mut [u64; QWORDS_IN_BLOCK], idx: &[usize; 16]) {
    quarter_round(v, idx[0], idx[4], idx[8], idx[12]);
    quarter_round(v, idx[1], idx[5], idx[9], idx[13]);
    quarter_round(v, idx[2], idx[6], idx[10], idx[14]);
    quarter_round(v, idx[3], idx[7], idx[11], idx[15]);
    quarter_round(v, idx[0], idx[5], idx[10], idx[15]);
    quarter_round(v, idx[1], idx[6], idx[11], idx[12]);
    quarter_round(v, idx[2], idx[7], idx[8], idx[13]);
    quarter_round(v, idx[3], idx[4], idx[9], idx[14]);
}

/// The permutation `P` applied to the whole block inside `G`.
pub(crate) trait Permute {
    fn permute(block: &mut Block);
}

/// Scalar rounds, left to the compiler to vectorise.
pub(crate) struct Portable;

impl Permute for Portable {
    #[inline(always)]
    fn permute(block: &mut Block) {
        permute_portable(block);
    }
}

/// Applies the permutation `P` to the eight rows, then the eight columns,
/// of the block viewed as an 8x8 matrix of 128-bit registers.
#[inline(always)]
fn permute_portable(block: &mut Block) {
    let v = block.words_mut();

    for row in 0..8 {
        let base = row * 16;
        let idx = core::array::from_fn(|i| base + i);
        round(v, &idx);
    }

    for column in 0..8 {
        let base = column * 2;
        let idx = core::array::from_fn(|i| base + (i / 2) * 16 + (i % 2));
        round(v, &idx);
    }
}

/// Computes `next = G(prev, reference)`, xoring into the previous contents of
/// `next` when `with_xor` is set (version 1.3, passes after the first).
#[inline(always)]
pub(crate) fn fill_block<P: Permute>(
    prev: &Block,
    reference: &Block,
    next: &mut Block,
    with_xor: bool,
) {
    let mut r = *reference;
    r ^= prev;

    let mut tmp = r;
    if with_xor {
        tmp ^= &*next;
    }

    P::permute(&mut r);

    *next = tmp;
    *next ^= &r;
}

/// Advances the address generator and produces the next 128 pseudo-random
/// reference words for data-independent addressing.
#[inline(always)]
pub(crate) fn next_addresses<P: Permute>(address: &mut Block, input: &mut Block) {
    input.words_mut()[6] = input.words()[6].wrapping_add(1);
    fill_block::<P>(&Block::ZERO, input, address, false);
    let first = *address;
    fill_block::<P>(&Block::ZERO, &first, address, false);
}
