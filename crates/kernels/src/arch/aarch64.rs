use crate::catalog::{FillSegment, Implementation};
use crate::compress::Portable;
use crate::instance::{Instance, Position};
use crate::segment;

#[target_feature(enable = "neon")]
unsafe fn fill_segment_neon(instance: &Instance<'_>, position: Position) {
    segment::fill_segment::<Portable>(instance, position);
}

fn has_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

struct Neon;

impl FillSegment for Neon {
    #[inline]
    fn fill_segment(&self, instance: &Instance<'_>, position: Position) {
        if has_neon() {
            // SAFETY: NEON support was confirmed at runtime.
            unsafe { fill_segment_neon(instance, position) }
        } else {
            segment::fill_segment::<Portable>(instance, position);
        }
    }
}

pub(crate) static IMPLEMENTATIONS: &[Implementation] =
    &[Implementation::new("NEON", Some(has_neon), &Neon)];
