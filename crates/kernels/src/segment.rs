//! The segment-fill body shared by every kernel.

use crate::block::Block;
use crate::compress::{Permute, fill_block, next_addresses};
use crate::instance::{Instance, Layout, Position, SYNC_POINTS, Version};

/// Pseudo-random words produced per address block.
const ADDRESSES_IN_BLOCK: u32 = 128;

/// Maps a pseudo-random value onto a block index within the reference lane.
///
/// The reference area excludes the block being filled and its predecessor,
/// and for other lanes it excludes the segment currently being filled. The
/// square-then-scale mapping biases towards recently written blocks.
#[inline(always)]
pub(crate) fn reference_index(
    layout: &Layout,
    position: Position,
    pseudo_rand: u32,
    same_lane: bool,
) -> u32 {
    let segment_length = layout.segment_length();
    let lane_length = layout.lane_length();
    let Position {
        pass, slice, index, ..
    } = position;

    let area: u32 = if pass == 0 {
        if slice == 0 {
            index - 1
        } else if same_lane {
            slice * segment_length + index - 1
        } else if index == 0 {
            slice * segment_length - 1
        } else {
            slice * segment_length
        }
    } else if same_lane {
        lane_length - segment_length + index - 1
    } else if index == 0 {
        lane_length - segment_length - 1
    } else {
        lane_length - segment_length
    };

    let area = u64::from(area);
    let mut relative = u64::from(pseudo_rand);
    relative = (relative * relative) >> 32;
    let relative = area - 1 - ((area * relative) >> 32);

    let start = if pass != 0 && slice != SYNC_POINTS - 1 {
        (slice + 1) * segment_length
    } else {
        0
    };

    ((u64::from(start) + relative) % u64::from(lane_length)) as u32
}

/// Fills the segment at `position` in place.
///
/// `position.index` is ignored; filling always covers the whole segment,
/// skipping the two seed blocks of each lane on the first slice of the first pass.
/// `P` supplies the compression rounds.
#[inline(always)]
pub(crate) fn fill_segment<P: Permute>(instance: &Instance<'_>, position: Position) {
    let layout = *instance.layout();
    let Position {
        lane, pass, slice, ..
    } = position;
    let data_independent = layout.variant().data_independent_at(position);

    let mut address_block = Block::ZERO;
    let mut input_block = Block::ZERO;
    if data_independent {
        let input = input_block.words_mut();
        input[0] = u64::from(pass);
        input[1] = u64::from(lane);
        input[2] = u64::from(slice);
        input[3] = u64::from(layout.memory_blocks());
        input[4] = u64::from(layout.passes());
        input[5] = u64::from(layout.variant().as_u32());
    }

    let mut starting_index = 0;
    if pass == 0 && slice == 0 {
        starting_index = 2;
        if data_independent {
            next_addresses::<P>(&mut address_block, &mut input_block);
        }
    }

    let lane_length = layout.lane_length() as usize;
    let mut curr_offset = lane as usize * lane_length
        + slice as usize * layout.segment_length() as usize
        + starting_index as usize;
    let mut prev_offset = if curr_offset % lane_length == 0 {
        curr_offset + lane_length - 1
    } else {
        curr_offset - 1
    };

    let with_xor = layout.version() == Version::V0x13 && pass != 0;

    for index in starting_index..layout.segment_length() {
        if curr_offset % lane_length == 1 {
            prev_offset = curr_offset - 1;
        }

        let pseudo_rand = if data_independent {
            if index % ADDRESSES_IN_BLOCK == 0 {
                next_addresses::<P>(&mut address_block, &mut input_block);
            }
            address_block.words()[(index % ADDRESSES_IN_BLOCK) as usize]
        } else {
            // SAFETY: the previous block belongs to this lane and is not
            // written while this segment is being filled.
            unsafe { (*instance.block_ptr(prev_offset)).words()[0] }
        };

        let ref_lane = if pass == 0 && slice == 0 {
            u64::from(lane)
        } else {
            (pseudo_rand >> 32) % u64::from(layout.lanes())
        };
        let same_lane = ref_lane == u64::from(lane);
        let ref_index = reference_index(
            &layout,
            Position {
                lane,
                pass,
                slice,
                index,
            },
            pseudo_rand as u32,
            same_lane,
        );
        let ref_offset = lane_length * ref_lane as usize + ref_index as usize;

        debug_assert_ne!(ref_offset, curr_offset);
        debug_assert_ne!(prev_offset, curr_offset);

        // SAFETY: `curr_offset` differs from both inputs, so the mutable
        // reference does not alias them. Blocks read from other lanes lie
        // outside the slice being filled concurrently.
        unsafe {
            let prev = &*instance.block_ptr(prev_offset);
            let reference = &*instance.block_ptr(ref_offset);
            let next = &mut *instance.block_ptr(curr_offset);
            fill_block::<P>(prev, reference, next, with_xor);
        }

        curr_offset += 1;
        prev_offset += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Variant;
    use proptest::prelude::*;

    fn layout(passes: u32, lanes: u32, memory: u32) -> Layout {
        Layout::new(Variant::Argon2d, Version::V0x13, passes, lanes, 1, memory).unwrap()
    }

    fn at(pass: u32, slice: u32, index: u32) -> Position {
        Position {
            lane: 0,
            pass,
            slice,
            index,
        }
    }

    #[test]
    fn first_slice_never_references_previous_block() {
        let layout = layout(1, 1, 32);
        for index in 2..layout.segment_length() {
            for rand in [0, 1, u32::MAX / 2, u32::MAX] {
                let reference =
                    reference_index(&layout, at(0, 0, index), rand, true);
                assert!(reference + 1 < index, "index {index} rand {rand} -> {reference}");
            }
        }
    }

    #[test]
    fn later_passes_skip_the_current_segment_of_other_lanes() {
        let layout = layout(2, 4, 64);
        let segment_length = layout.segment_length();
        for slice in 0..SYNC_POINTS {
            for rand in [0, 7, u32::MAX] {
                let reference = reference_index(&layout, at(1, slice, 0), rand, false);
                let owner = reference / segment_length;
                assert_ne!(owner, slice);
            }
        }
    }

    proptest! {
        #[test]
        fn reference_stays_inside_lane(
            pass in 0u32..3,
            slice in 0u32..SYNC_POINTS,
            lanes in 1u32..5,
            memory in 8u32..512,
            index_seed in any::<u32>(),
            rand in any::<u32>(),
            same_lane in any::<bool>(),
        ) {
            let layout = layout(3, lanes, memory);
            let segment_length = layout.segment_length();
            let first = if pass == 0 && slice == 0 { 2 } else { 0 };
            prop_assume!(segment_length > first);
            let index = first + index_seed % (segment_length - first);
            let same_lane = same_lane || (pass == 0 && slice == 0);
            let reference = reference_index(&layout, at(pass, slice, index), rand, same_lane);
            prop_assert!(reference < layout.lane_length());
            if same_lane {
                let current = slice * segment_length + index;
                prop_assert_ne!(reference, current);
            }
        }
    }
}
