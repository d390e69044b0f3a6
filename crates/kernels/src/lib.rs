//! Argon2 block compression and fill-segment kernels.
//!
//! The crate provides the memory-filling inner loop of Argon2 in several
//! functionally identical builds, one per instruction-set class, plus the
//! types a kernel operates on:
//!
//! - [`Block`]: one 1 KiB memory block.
//! - [`Layout`] and [`Instance`]: the shape of an Argon2 instance and the
//!   memory it fills.
//! - [`Position`]: the segment a kernel call fills.
//! - [`FillSegment`] and [`Implementation`]: the kernel interface and the
//!   catalog descriptors returned by [`implementations`].
//!
//! Every catalog entry carries a capability check built on the standard
//! library's runtime feature detection. Entry points re-check before entering
//! `#[target_feature]` code, so calling any kernel on any host is safe.
//!
//! # Example
//!
//! ```
//! use kernels::{Block, Instance, Layout, Position, REFERENCE, Variant, Version};
//!
//! let layout = Layout::new(Variant::Argon2i, Version::V0x13, 1, 1, 1, 32).unwrap();
//! let mut memory = vec![Block::ZERO; layout.memory_blocks() as usize];
//! memory[0] = Block::filled(1);
//! memory[1] = Block::filled(2);
//! let instance = Instance::new(&mut memory, layout).unwrap();
//!
//! REFERENCE.fill_segment(&instance, Position::segment(0, 0, 0));
//! assert_ne!(instance.read_block(2), Block::ZERO);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(rustdoc::broken_intra_doc_links)]

mod arch;
mod block;
mod catalog;
mod compress;
mod instance;
mod segment;

pub use block::{BLOCK_SIZE, Block, QWORDS_IN_BLOCK};
pub use catalog::{FillSegment, Implementation, REFERENCE, Reference, implementations};
pub use instance::{
    Instance, InstanceError, Layout, Position, SYNC_POINTS, SharedInstance, Variant, Version,
};
