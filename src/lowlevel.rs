//! Low-level building blocks for cross-checking the solver.
//!
//! These helpers recompute patch distances from scratch, independent of
//! the cache kept by [`crate::NnField`]. They exist for tests and
//! debugging; most users only need the driver API.

use crate::image::ImageView;
use crate::kernel::{self, FieldGeometry};
use crate::pixel::Pixel;
use crate::util::rect::Point;
use crate::util::{PatchFieldError, PatchFieldResult};

/// Full patch distance between `target` at `target_center` and `source`
/// at `source_center`, computed from scratch.
///
/// Fails on invalid patch geometry. Panics if a center's patch exits its
/// image; pass centers inside the valid rectangles.
pub fn patch_distance<P: Pixel>(
    target: ImageView<'_, P>,
    source: ImageView<'_, P>,
    target_center: (i32, i32),
    source_center: (i32, i32),
    patch_side: usize,
) -> PatchFieldResult<P::Distance> {
    if patch_side < 3 || patch_side % 2 == 0 {
        return Err(PatchFieldError::InvalidPatchSide { side: patch_side });
    }
    for (width, height) in [
        (target.width(), target.height()),
        (source.width(), source.height()),
    ] {
        if width < patch_side || height < patch_side {
            return Err(PatchFieldError::ImageSmallerThanPatch {
                width,
                height,
                side: patch_side,
            });
        }
    }

    let radius = (patch_side as i32 - 1) / 2;
    let geom = FieldGeometry::new(
        source.width() as i32,
        source.height() as i32,
        target.width() as i32,
        target.height() as i32,
        radius,
    );
    let t = Point::new(target_center.0, target_center.1);
    let s = Point::new(source_center.0, source_center.1);
    assert!(
        geom.target.contains_point(t),
        "target center outside the valid patch-center rectangle"
    );
    assert!(
        geom.source.contains_point(s),
        "source center outside the valid patch-center rectangle"
    );

    Ok(kernel::patch_distance::<P, false>(
        &target,
        &source,
        &geom,
        t,
        s,
        P::Distance::default(),
    ))
}
