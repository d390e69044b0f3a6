//! Architecture-specific kernels.
//!
//! Each kernel is the shared segment body compiled under `#[target_feature]`
//! so the compression rounds are vectorised for that instruction set:
//! - **x86_64**: SSE2, SSSE3, SSE4.1, AVX2 (explicit 256-bit rounds)
//! - **aarch64**: NEON

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "aarch64")]
pub(crate) use aarch64::IMPLEMENTATIONS;
#[cfg(target_arch = "x86_64")]
pub(crate) use x86_64::IMPLEMENTATIONS;

#[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
pub(crate) static IMPLEMENTATIONS: &[crate::Implementation] = &[];
