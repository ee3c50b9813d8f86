//! Field refinement: initialization, propagation and random search.
//!
//! `FieldCtx` bundles everything one iteration needs: the image views,
//! the patch geometry, the mask predicate, and shared-cell access to the
//! offset field and the best-distance cache. Cells are addressed through
//! raw pointers so tile workers can mutate disjoint pixels concurrently;
//! the wavefront scheduler's release rule guarantees that a pixel and
//! its propagation neighbors are never touched by two workers at once
//! (see [`crate::schedule`]).

use std::marker::PhantomData;

use rand::rngs::StdRng;

use crate::field::Offset;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::FieldGeometry;
use crate::pixel::Pixel;
use crate::util::rect::{Point, Rect};

pub(crate) mod init;
pub(crate) mod propagate;
pub(crate) mod random;

/// Initial contents of the offset field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitialField {
    /// Uniform random source center per target pixel.
    #[default]
    Random,
    /// Bilinear rescaling of target coordinates onto the source.
    Smooth,
}

/// Configuration for a [`crate::NnField`] solver.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    /// Patch side in pixels; odd, at least 3.
    pub patch_side: usize,
    /// How the offset field is seeded before the first iteration.
    pub initial_field: InitialField,
    /// When true, a source mask must be bound and non-degenerate.
    pub use_source_mask: bool,
    /// Mask samples below this value mark forbidden source centers.
    pub mask_threshold: u8,
    /// Superpatch side for the parallel scheduler.
    pub tile_size: usize,
    /// Explicit PRNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            patch_side: 7,
            initial_field: InitialField::Random,
            use_source_mask: false,
            mask_threshold: 128,
            tile_size: 64,
            seed: None,
        }
    }
}

/// Shared mutable access to a contiguous cell grid.
///
/// SAFETY: callers must ensure no two threads access the same cell
/// concurrently. The wavefront schedule provides that exclusivity; the
/// serial path has a single worker. (Same pattern as rayon demosaic
/// workers sharing an output buffer through a raw pointer.)
struct CellGrid<T> {
    ptr: *mut T,
    width: usize,
}

unsafe impl<T: Send> Send for CellGrid<T> {}
unsafe impl<T: Send> Sync for CellGrid<T> {}

impl<T: Copy> CellGrid<T> {
    fn new(img: &mut OwnedImage<T>) -> Self {
        Self {
            ptr: img.as_mut_ptr(),
            width: img.width(),
        }
    }

    #[inline]
    unsafe fn get(&self, x: i32, y: i32) -> T {
        *self.ptr.add(y as usize * self.width + x as usize)
    }

    #[inline]
    unsafe fn set(&self, x: i32, y: i32, value: T) {
        *self.ptr.add(y as usize * self.width + x as usize) = value;
    }
}

/// Per-iteration context shared by the serial loop and tile workers.
pub(crate) struct FieldCtx<'a, P: Pixel> {
    pub target: ImageView<'a, P>,
    pub source: ImageView<'a, P>,
    pub mask: Option<ImageView<'a, u8>>,
    pub mask_threshold: u8,
    pub geom: FieldGeometry,
    offsets: CellGrid<Offset>,
    distances: CellGrid<P::Distance>,
    _borrow: PhantomData<&'a mut ()>,
}

impl<'a, P: Pixel> FieldCtx<'a, P> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        target: ImageView<'a, P>,
        source: ImageView<'a, P>,
        mask: Option<ImageView<'a, u8>>,
        mask_threshold: u8,
        geom: FieldGeometry,
        offsets: &'a mut OwnedImage<Offset>,
        distances: &'a mut OwnedImage<P::Distance>,
    ) -> Self {
        Self {
            target,
            source,
            mask,
            mask_threshold,
            geom,
            offsets: CellGrid::new(offsets),
            distances: CellGrid::new(distances),
            _borrow: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn offset(&self, x: i32, y: i32) -> Offset {
        // SAFETY: cell exclusivity per the wavefront schedule.
        unsafe { self.offsets.get(x, y) }
    }

    #[inline]
    pub(crate) fn distance(&self, x: i32, y: i32) -> P::Distance {
        // SAFETY: cell exclusivity per the wavefront schedule.
        unsafe { self.distances.get(x, y) }
    }

    /// Stores a new best match for the target center `(x, y)`.
    #[inline]
    pub(crate) fn record(&self, x: i32, y: i32, offset: Offset, distance: P::Distance) {
        // SAFETY: cell exclusivity per the wavefront schedule.
        unsafe {
            self.offsets.set(x, y, offset);
            self.distances.set(x, y, distance);
        }
    }

    /// Stores only the offset; used when seeding cells outside the
    /// valid-center rectangle.
    #[inline]
    pub(crate) fn set_offset(&self, x: i32, y: i32, offset: Offset) {
        // SAFETY: cell exclusivity per the wavefront schedule.
        unsafe { self.offsets.set(x, y, offset) }
    }

    /// Returns true if the source center `s` may be matched.
    #[inline]
    pub(crate) fn allowed(&self, s: Point) -> bool {
        match &self.mask {
            None => true,
            Some(mask) => mask.pixel(s.x, s.y) >= self.mask_threshold,
        }
    }
}

/// Runs propagation and random search over `span` in scan order.
///
/// `span` must lie inside the valid target-center rectangle. Neighbor
/// availability is resolved per row and per first column against the
/// full rectangle, so tile-boundary pixels still propagate from
/// already-processed neighbor tiles.
pub(crate) fn process_span<P: Pixel>(
    ctx: &FieldCtx<'_, P>,
    span: Rect,
    reverse: bool,
    rng: &mut StdRng,
) {
    if span.is_empty() {
        return;
    }
    if reverse {
        for y in (span.top..span.bottom).rev() {
            if y + 1 < ctx.geom.target.bottom {
                process_row::<P, true, true>(ctx, y, span, rng);
            } else {
                process_row::<P, true, false>(ctx, y, span, rng);
            }
        }
    } else {
        for y in span.top..span.bottom {
            if y > ctx.geom.target.top {
                process_row::<P, false, true>(ctx, y, span, rng);
            } else {
                process_row::<P, false, false>(ctx, y, span, rng);
            }
        }
    }
}

fn process_row<P: Pixel, const REVERSE: bool, const VERT: bool>(
    ctx: &FieldCtx<'_, P>,
    y: i32,
    span: Rect,
    rng: &mut StdRng,
) {
    if REVERSE {
        let first = span.right - 1;
        if first + 1 < ctx.geom.target.right {
            visit::<P, REVERSE, true, VERT>(ctx, first, y, rng);
        } else {
            visit::<P, REVERSE, false, VERT>(ctx, first, y, rng);
        }
        for x in (span.left..first).rev() {
            visit::<P, REVERSE, true, VERT>(ctx, x, y, rng);
        }
    } else {
        let first = span.left;
        if first > ctx.geom.target.left {
            visit::<P, REVERSE, true, VERT>(ctx, first, y, rng);
        } else {
            visit::<P, REVERSE, false, VERT>(ctx, first, y, rng);
        }
        for x in first + 1..span.right {
            visit::<P, REVERSE, true, VERT>(ctx, x, y, rng);
        }
    }
}

#[inline]
fn visit<P: Pixel, const REVERSE: bool, const HORIZ: bool, const VERT: bool>(
    ctx: &FieldCtx<'_, P>,
    x: i32,
    y: i32,
    rng: &mut StdRng,
) {
    propagate::step::<P, REVERSE, HORIZ, VERT>(ctx, x, y);
    random::step(ctx, rng, x, y);
}
