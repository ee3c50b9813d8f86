//! Patch distance kernel implementations.
//!
//! The full kernel sums per-pixel distances over a `(2r+1)²` window and
//! is monomorphized over early termination and per-image mirroring. The
//! shift kernels update a cached distance in O(side) when a patch pair
//! moves by one pixel; they are only used on the interior fast path.

use crate::image::ImageView;
use crate::pixel::Pixel;
use crate::util::rect::{Point, Rect};

pub(crate) mod scalar;
pub(crate) mod shift;

/// Valid-center rectangles for a source/target pair and one patch radius.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldGeometry {
    pub radius: i32,
    pub source: Rect,
    pub target: Rect,
    pub source_1px: Rect,
    pub target_1px: Rect,
}

impl FieldGeometry {
    pub(crate) fn new(
        source_width: i32,
        source_height: i32,
        target_width: i32,
        target_height: i32,
        radius: i32,
    ) -> Self {
        let source = Rect::patch_centers(source_width, source_height, radius);
        let target = Rect::patch_centers(target_width, target_height, radius);
        Self {
            radius,
            source,
            target,
            source_1px: source.shrunk_1px(),
            target_1px: target.shrunk_1px(),
        }
    }
}

/// Full patch distance between `target` at `t` and `source` at `s`.
///
/// Centers inside the 1-px-shrunk rectangles take the branch-free
/// direct-addressing path; boundary centers go through coordinate
/// reflection. With `EARLY`, any value above `known` may be returned as
/// soon as the running sum exceeds it.
#[inline]
pub(crate) fn patch_distance<P: Pixel, const EARLY: bool>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    geom: &FieldGeometry,
    t: Point,
    s: Point,
    known: P::Distance,
) -> P::Distance {
    match (
        geom.target_1px.contains_point(t),
        geom.source_1px.contains_point(s),
    ) {
        (true, true) => scalar::distance_direct::<P, EARLY>(target, source, t, s, geom.radius, known),
        (true, false) => {
            scalar::distance_mirror::<P, EARLY, false, true>(target, source, t, s, geom.radius, known)
        }
        (false, true) => {
            scalar::distance_mirror::<P, EARLY, true, false>(target, source, t, s, geom.radius, known)
        }
        (false, false) => {
            scalar::distance_mirror::<P, EARLY, true, true>(target, source, t, s, geom.radius, known)
        }
    }
}

/// Reflects an out-of-bounds coordinate back into `[0, n)`.
#[inline]
pub(crate) fn reflect(c: i32, n: i32) -> i32 {
    if c < 0 {
        -c
    } else if c >= n {
        2 * n - c - 2
    } else {
        c
    }
}
