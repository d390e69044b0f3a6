use core::fmt;
use core::ops::BitXorAssign;

/// Size of one Argon2 memory block in bytes.
pub const BLOCK_SIZE: usize = 1024;

/// Number of 64-bit words in one memory block.
pub const QWORDS_IN_BLOCK: usize = BLOCK_SIZE / 8;

/// One 1 KiB Argon2 memory block stored as little-endian 64-bit words.
///
/// The 64-byte alignment keeps every block on its own cache lines so the
/// vectorised kernels never straddle a line boundary when loading a row.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct Block([u64; QWORDS_IN_BLOCK]);

impl Block {
    /// Block with every word set to zero.
    pub const ZERO: Self = Self([0; QWORDS_IN_BLOCK]);

    /// Creates a block with every word set to `word`.
    #[must_use]
    pub const fn filled(word: u64) -> Self {
        Self([word; QWORDS_IN_BLOCK])
    }

    /// Decodes a block from its 1024-byte little-endian encoding.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; BLOCK_SIZE]) -> Self {
        let mut block = Self::ZERO;
        for (word, chunk) in block.0.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *word = u64::from_le_bytes(buf);
        }
        block
    }

    /// Encodes the block as 1024 little-endian bytes.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; BLOCK_SIZE] {
        let mut bytes = [0u8; BLOCK_SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Returns the block's words.
    #[inline]
    #[must_use]
    pub const fn words(&self) -> &[u64; QWORDS_IN_BLOCK] {
        &self.0
    }

    /// Returns the block's words for in-place mutation.
    #[inline]
    pub const fn words_mut(&mut self) -> &mut [u64; QWORDS_IN_BLOCK] {
        &mut self.0
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("first", &format_args!("{:#018x}", self.0[0]))
            .field("last", &format_args!("{:#018x}", self.0[QWORDS_IN_BLOCK - 1]))
            .finish_non_exhaustive()
    }
}

impl BitXorAssign<&Self> for Block {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: &Self) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs ^= rhs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_encoding_is_little_endian() {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[0] = 0x01;
        bytes[8] = 0x02;
        bytes[BLOCK_SIZE - 1] = 0x80;

        let block = Block::from_le_bytes(&bytes);
        assert_eq!(block.words()[0], 1);
        assert_eq!(block.words()[1], 2);
        assert_eq!(block.words()[QWORDS_IN_BLOCK - 1], 0x80 << 56);
        assert_eq!(block.to_le_bytes(), bytes);
    }

    #[test]
    fn xor_assign_combines_every_word() {
        let mut block = Block::filled(0xff00);
        block ^= &Block::filled(0x0ff0);
        assert!(block.words().iter().all(|&word| word == 0xf0f0));
    }

    #[test]
    fn blocks_are_cache_line_aligned() {
        assert_eq!(core::mem::align_of::<Block>(), 64);
        assert_eq!(core::mem::size_of::<Block>(), BLOCK_SIZE);
    }
}
