//! Hashing inputs, cost parameters and their validation.

use std::fmt;

use dispatch::DispatchSlot;
use kernels::{SYNC_POINTS, Version};

use crate::alloc::BlockAllocator;
use crate::error::HashError;

/// Shortest accepted output, in bytes.
pub const MIN_OUTLEN: usize = 4;
/// Shortest accepted salt, in bytes.
pub const MIN_SALT_LENGTH: usize = 8;
/// Upper bound on lanes.
pub const MAX_LANES: u32 = 0xFF_FFFF;
/// Upper bound on threads.
pub const MAX_THREADS: u32 = 0xFF_FFFF;

/// Everything one hash consumes and produces.
///
/// A context borrows its inputs and output buffer. Cost parameters default
/// to three passes over 4096 KiB in one lane, version 0x13, and segment
/// fills go through [`dispatch::global`] unless
/// [`with_dispatch`](Self::with_dispatch) names another slot.
///
/// # Examples
///
/// ```
/// use hashing::{Context, argon2i_ctx};
///
/// let mut tag = [0u8; 16];
/// let mut ctx = Context::new(&mut tag, b"password", b"somesalt")
///     .with_time_cost(1)
///     .with_memory_cost(64)
///     .with_parallelism(2);
/// argon2i_ctx(&mut ctx).unwrap();
/// assert_ne!(ctx.output(), &[0u8; 16]);
/// ```
pub struct Context<'a> {
    pub(crate) out: &'a mut [u8],
    pub(crate) pwd: &'a [u8],
    pub(crate) salt: &'a [u8],
    pub(crate) secret: Option<&'a [u8]>,
    pub(crate) ad: Option<&'a [u8]>,
    pub(crate) t_cost: u32,
    pub(crate) m_cost: u32,
    pub(crate) lanes: u32,
    pub(crate) threads: u32,
    pub(crate) version: Version,
    pub(crate) allocator: Option<&'a mut dyn BlockAllocator>,
    pub(crate) dispatch: &'a DispatchSlot,
}

impl<'a> Context<'a> {
    /// Creates a context writing `out.len()` bytes of tag.
    #[must_use]
    pub fn new(out: &'a mut [u8], pwd: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            out,
            pwd,
            salt,
            secret: None,
            ad: None,
            t_cost: 3,
            m_cost: 1 << 12,
            lanes: 1,
            threads: 1,
            version: Version::V0x13,
            allocator: None,
            dispatch: dispatch::global(),
        }
    }

    /// Keyed hashing secret.
    #[must_use]
    pub fn with_secret(mut self, secret: &'a [u8]) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Associated data.
    #[must_use]
    pub fn with_ad(mut self, ad: &'a [u8]) -> Self {
        self.ad = Some(ad);
        self
    }

    /// Number of passes.
    #[must_use]
    pub fn with_time_cost(mut self, t_cost: u32) -> Self {
        self.t_cost = t_cost;
        self
    }

    /// Memory in KiB.
    #[must_use]
    pub fn with_memory_cost(mut self, m_cost: u32) -> Self {
        self.m_cost = m_cost;
        self
    }

    /// Sets lanes and threads together.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.lanes = parallelism;
        self.threads = parallelism;
        self
    }

    /// Sets the lane count alone.
    #[must_use]
    pub fn with_lanes(mut self, lanes: u32) -> Self {
        self.lanes = lanes;
        self
    }

    /// Sets the thread count alone.
    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Algorithm revision.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Block memory provider; a fresh [`HeapAllocator`](crate::HeapAllocator) is used otherwise.
    #[must_use]
    pub fn with_allocator(mut self, allocator: &'a mut dyn BlockAllocator) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Slot whose kernel fills every segment.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: &'a DispatchSlot) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Tag written by the last successful hash.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &*self.out
    }

    /// Time cost.
    #[must_use]
    pub const fn time_cost(&self) -> u32 {
        self.t_cost
    }

    /// Memory cost in KiB.
    #[must_use]
    pub const fn memory_cost(&self) -> u32 {
        self.m_cost
    }

    /// Lane count.
    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    /// Thread count.
    #[must_use]
    pub const fn threads(&self) -> u32 {
        self.threads
    }

    /// Checks every parameter against the reference bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound, in the order the reference library
    /// checks them.
    pub fn validate(&self) -> Result<(), HashError> {
        if self.out.len() < MIN_OUTLEN {
            return Err(HashError::OutputTooShort);
        }
        if exceeds_u32(self.out.len()) {
            return Err(HashError::OutputTooLong);
        }
        if exceeds_u32(self.pwd.len()) {
            return Err(HashError::PwdTooLong);
        }
        if self.salt.len() < MIN_SALT_LENGTH {
            return Err(HashError::SaltTooShort);
        }
        if exceeds_u32(self.salt.len()) {
            return Err(HashError::SaltTooLong);
        }
        if self.secret.is_some_and(|secret| exceeds_u32(secret.len())) {
            return Err(HashError::SecretTooLong);
        }
        if self.ad.is_some_and(|ad| exceeds_u32(ad.len())) {
            return Err(HashError::AdTooLong);
        }

        let minimum_memory = 2 * SYNC_POINTS;
        if self.m_cost < minimum_memory {
            return Err(HashError::MemoryTooLittle);
        }
        if u64::from(self.m_cost) < 8 * u64::from(self.lanes) {
            return Err(HashError::MemoryTooLittle);
        }
        if self.t_cost < 1 {
            return Err(HashError::TimeTooSmall);
        }
        if self.lanes < 1 {
            return Err(HashError::LanesTooFew);
        }
        if self.lanes > MAX_LANES {
            return Err(HashError::LanesTooMany);
        }
        if self.threads < 1 {
            return Err(HashError::ThreadsTooFew);
        }
        if self.threads > MAX_THREADS {
            return Err(HashError::ThreadsTooMany);
        }
        Ok(())
    }
}

fn exceeds_u32(len: usize) -> bool {
    u32::try_from(len).is_err()
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("out_len", &self.out.len())
            .field("pwd_len", &self.pwd.len())
            .field("salt_len", &self.salt.len())
            .field("secret_len", &self.secret.map(<[u8]>::len))
            .field("ad_len", &self.ad.map(<[u8]>::len))
            .field("t_cost", &self.t_cost)
            .field("m_cost", &self.m_cost)
            .field("lanes", &self.lanes)
            .field("threads", &self.threads)
            .field("version", &self.version)
            .field("custom_allocator", &self.allocator.is_some())
            .field("dispatch", self.dispatch)
            .finish()
    }
}
