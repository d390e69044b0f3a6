mod avx2;

use crate::catalog::{FillSegment, Implementation};
use crate::compress::Portable;
use crate::instance::{Instance, Position};
use crate::segment;

/// Declares a kernel type whose entry point enters the `$feature` body only
/// after runtime detection confirms the feature. `$permute` supplies the
/// compression rounds inside that body.
macro_rules! x86_kernel {
    ($kernel:ident, $body:ident, $check:ident, $feature:tt, $permute:ty) => {
        #[target_feature(enable = $feature)]
        unsafe fn $body(instance: &Instance<'_>, position: Position) {
            segment::fill_segment::<$permute>(instance, position);
        }

        fn $check() -> bool {
            std::arch::is_x86_feature_detected!($feature)
        }

        struct $kernel;

        impl FillSegment for $kernel {
            #[inline]
            fn fill_segment(&self, instance: &Instance<'_>, position: Position) {
                if $check() {
                    // SAFETY: the CPU reports the feature the body was compiled for.
                    unsafe { $body(instance, position) }
                } else {
                    segment::fill_segment::<Portable>(instance, position);
                }
            }
        }
    };
}

x86_kernel!(Sse2, fill_segment_sse2, has_sse2, "sse2", Portable);
x86_kernel!(Ssse3, fill_segment_ssse3, has_ssse3, "ssse3", Portable);
x86_kernel!(Sse41, fill_segment_sse41, has_sse41, "sse4.1", Portable);
x86_kernel!(Avx2, fill_segment_avx2, has_avx2, "avx2", avx2::Avx2Permute);

pub(crate) static IMPLEMENTATIONS: &[Implementation] = &[
    Implementation::new("SSE2", Some(has_sse2), &Sse2),
    Implementation::new("SSSE3", Some(has_ssse3), &Ssse3),
    Implementation::new("SSE4.1", Some(has_sse41), &Sse41),
    Implementation::new("AVX2", Some(has_avx2), &Avx2),
];
