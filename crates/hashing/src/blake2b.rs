//! BLAKE2b helpers: the fixed-width digest and the variable-length `H'`.

use blake2::Blake2bVar;
use blake2::digest::{Update, VariableOutput};
use zeroize::Zeroize;

use crate::error::HashError;

/// Width of a full BLAKE2b digest.
pub(crate) const DIGEST_LENGTH: usize = 64;

const HALF_DIGEST: usize = DIGEST_LENGTH / 2;

fn hasher(len: usize) -> Result<Blake2bVar, HashError> {
    Blake2bVar::new(len).map_err(|_| HashError::OutputTooLong)
}

fn finish(hasher: Blake2bVar, out: &mut [u8]) -> Result<(), HashError> {
    hasher
        .finalize_variable(out)
        .map_err(|_| HashError::OutputTooLong)
}

/// BLAKE2b-512 of the concatenated `inputs`.
pub(crate) fn digest(inputs: &[&[u8]]) -> Result<[u8; DIGEST_LENGTH], HashError> {
    let mut state = hasher(DIGEST_LENGTH)?;
    for input in inputs {
        state.update(input);
    }
    let mut out = [0u8; DIGEST_LENGTH];
    finish(state, &mut out)?;
    Ok(out)
}

/// Variable-length hash `H'` filling all of `out`.
///
/// Outputs up to 64 bytes are a single BLAKE2b call over
/// `LE32(out.len()) || inputs`. Longer outputs chain 64-byte digests, keep
/// the first half of each, and finish with one digest sized to the tail.
pub(crate) fn blake2b_long(out: &mut [u8], inputs: &[&[u8]]) -> Result<(), HashError> {
    if out.is_empty() {
        return Err(HashError::OutputTooShort);
    }
    let out_len = u32::try_from(out.len()).map_err(|_| HashError::OutputTooLong)?;
    let len_bytes = out_len.to_le_bytes();

    if out.len() <= DIGEST_LENGTH {
        let mut state = hasher(out.len())?;
        state.update(&len_bytes);
        for input in inputs {
            state.update(input);
        }
        return finish(state, out);
    }

    let mut chain = [0u8; DIGEST_LENGTH];
    let mut state = hasher(DIGEST_LENGTH)?;
    state.update(&len_bytes);
    for input in inputs {
        state.update(input);
    }
    finish(state, &mut chain)?;
    out[..HALF_DIGEST].copy_from_slice(&chain[..HALF_DIGEST]);

    let mut written = HALF_DIGEST;
    while out.len() - written > DIGEST_LENGTH {
        let mut state = hasher(DIGEST_LENGTH)?;
        state.update(&chain);
        finish(state, &mut chain)?;
        out[written..written + HALF_DIGEST].copy_from_slice(&chain[..HALF_DIGEST]);
        written += HALF_DIGEST;
    }

    let mut state = hasher(out.len() - written)?;
    state.update(&chain);
    chain.zeroize();
    finish(state, &mut out[written..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_output_prefixes_the_length() {
        let mut direct = [0u8; 32];
        blake2b_long(&mut direct, &[b"abc"]).unwrap();

        let mut state = Blake2bVar::new(32).unwrap();
        state.update(&32u32.to_le_bytes());
        state.update(b"abc");
        let mut expected = [0u8; 32];
        state.finalize_variable(&mut expected).unwrap();

        assert_eq!(direct, expected);
    }

    #[test]
    fn long_output_starts_with_half_of_the_first_digest() {
        let mut long = [0u8; 1024];
        blake2b_long(&mut long, &[b"seed"]).unwrap();
        let first = digest(&[&1024u32.to_le_bytes(), b"seed"]).unwrap();
        assert_eq!(long[..32], first[..32]);
    }

    #[test]
    fn boundary_lengths_fill_the_whole_buffer() {
        for len in [63, 64, 65, 96, 97, 128, 1024] {
            let mut out = vec![0u8; len];
            blake2b_long(&mut out, &[b"x"]).unwrap();
            assert!(out[len - 8..].iter().any(|&b| b != 0), "tail of {len} bytes left unwritten");
        }
    }

    #[test]
    fn inputs_are_concatenated() {
        let mut split = [0u8; 80];
        let mut joined = [0u8; 80];
        blake2b_long(&mut split, &[b"ab", b"cd"]).unwrap();
        blake2b_long(&mut joined, &[b"abcd"]).unwrap();
        assert_eq!(split, joined);
    }

    #[test]
    fn empty_output_is_rejected() {
        assert_eq!(blake2b_long(&mut [], &[b"x"]), Err(HashError::OutputTooShort));
    }

    proptest! {
        #[test]
        fn splitting_the_input_never_changes_the_output(
            len in 1usize..=1100,
            data in proptest::collection::vec(any::<u8>(), 0..200),
            split in any::<prop::sample::Index>(),
        ) {
            let at = split.index(data.len() + 1);
            let mut whole = vec![0u8; len];
            let mut parts = vec![0u8; len];
            blake2b_long(&mut whole, &[&data]).unwrap();
            blake2b_long(&mut parts, &[&data[..at], &data[at..]]).unwrap();
            prop_assert_eq!(whole, parts);
        }
    }
}
