//! BLAKE2b rounds on 256-bit YMM registers.
//!
//! One round holds its sixteen words in four registers `a`, `b`, `c`, `d`
//! of four lanes each. The column step runs the four quarter-rounds lane by
//! lane; the diagonal step first rotates `b`, `c` and `d` across lanes so the
//! same lane-wise code applies.

use std::arch::x86_64::{
    __m256i, _mm256_add_epi64, _mm256_mul_epu32, _mm256_or_si256, _mm256_permute4x64_epi64,
    _mm256_set1_epi64x, _mm256_setr_epi64x, _mm256_sllv_epi64, _mm256_srlv_epi64,
    _mm256_storeu_si256, _mm256_xor_si256,
};

use crate::block::Block;
use crate::compress::Permute;

/// Words one round operates on.
const ROUND_WORDS: usize = 16;

/// Lane-wise `x + y + 2 * lo32(x) * lo32(y)`.
#[target_feature(enable = "avx2")]
#[inline]
fn blamka(x: __m256i, y: __m256i) -> __m256i {
    let product = _mm256_mul_epu32(x, y);
    _mm256_add_epi64(_mm256_add_epi64(x, y), _mm256_add_epi64(product, product))
}

/// Rotate right helper; AVX2 has no 64-bit rotate.
#[target_feature(enable = "avx2")]
#[inline]
fn rotr(x: __m256i, n: i64) -> __m256i {
    _mm256_or_si256(
        _mm256_srlv_epi64(x, _mm256_set1_epi64x(n)),
        _mm256_sllv_epi64(x, _mm256_set1_epi64x(64 - n)),
    )
}

#[target_feature(enable = "avx2")]
#[inline]
fn quarter_round(a: &mut __m256i, b: &mut __m256i, c: &mut __m256i, d: &mut __m256i) {
    *a = blamka(*a, *b);
    *d = rotr(_mm256_xor_si256(*d, *a), 32);
    *c = blamka(*c, *d);
    *b = rotr(_mm256_xor_si256(*b, *c), 24);
    *a = blamka(*a, *b);
    *d = rotr(_mm256_xor_si256(*d, *a), 16);
    *c = blamka(*c, *d);
    *b = rotr(_mm256_xor_si256(*b, *c), 63);
}

#[target_feature(enable = "avx2")]
#[inline]
fn load(words: &[u64]) -> __m256i {
    _mm256_setr_epi64x(
        words[0] as i64,
        words[1] as i64,
        words[2] as i64,
        words[3] as i64,
    )
}

#[target_feature(enable = "avx2")]
#[inline]
fn store(x: __m256i, words: &mut [u64]) {
    let mut lanes = [0u64; 4];
    // SAFETY: `lanes` is 32 writable bytes and the store is unaligned.
    unsafe { _mm256_storeu_si256(lanes.as_mut_ptr().cast(), x) };
    words[..4].copy_from_slice(&lanes);
}

/// One BLAKE2b round without message words.
#[target_feature(enable = "avx2")]
#[inline]
fn round(v: &mut [u64; ROUND_WORDS]) {
    let mut a = load(&v[0..4]);
    let mut b = load(&v[4..8]);
    let mut c = load(&v[8..12]);
    let mut d = load(&v[12..16]);

    quarter_round(&mut a, &mut b, &mut c, &mut d);

    // Lane j of the diagonal step pairs a[j] with b[j+1], c[j+2], d[j+3].
    b = _mm256_permute4x64_epi64::<0x39>(b);
    c = _mm256_permute4x64_epi64::<0x4E>(c);
    d = _mm256_permute4x64_epi64::<0x93>(d);

    quarter_round(&mut a, &mut b, &mut c, &mut d);

    b = _mm256_permute4x64_epi64::<0x93>(b);
    c = _mm256_permute4x64_epi64::<0x4E>(c);
    d = _mm256_permute4x64_epi64::<0x39>(d);

    store(a, &mut v[0..4]);
    store(b, &mut v[4..8]);
    store(c, &mut v[8..12]);
    store(d, &mut v[12..16]);
}

/// Word `i` of the round over register column `column`.
const fn column_word(column: usize, i: usize) -> usize {
    column * 2 + (i / 2) * 16 + (i % 2)
}

#[target_feature(enable = "avx2")]
fn permute(block: &mut Block) {
    let v = block.words_mut();
    let mut words = [0u64; ROUND_WORDS];

    for row in v.chunks_exact_mut(ROUND_WORDS) {
        words.copy_from_slice(row);
        round(&mut words);
        row.copy_from_slice(&words);
    }

    for column in 0..8 {
        for (i, word) in words.iter_mut().enumerate() {
            *word = v[column_word(column, i)];
        }
        round(&mut words);
        for (i, word) in words.iter().enumerate() {
            v[column_word(column, i)] = *word;
        }
    }
}

/// Explicit AVX2 rounds; only the AVX2 kernel body names this type.
pub(super) struct Avx2Permute;

impl Permute for Avx2Permute {
    #[inline(always)]
    fn permute(block: &mut Block) {
        debug_assert!(std::arch::is_x86_feature_detected!("avx2"));
        // SAFETY: reached only from the AVX2 kernel body, which is entered
        // after runtime detection confirms AVX2.
        unsafe { permute(block) }
    }
}
