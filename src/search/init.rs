//! Offset-field initialization and the source-mask filter.
//!
//! Every field cell is seeded (cells outside the valid-center rectangle
//! included, so a surrendered field is fully populated for voting); the
//! distance cache is then prepared over the valid rectangle only.

use rand::rngs::StdRng;
use rand::Rng;

use crate::field::Offset;
use crate::image::ImageView;
use crate::kernel::patch_distance;
use crate::pixel::Pixel;
use crate::search::FieldCtx;
use crate::util::rect::{Point, Rect};
use crate::util::{PatchFieldError, PatchFieldResult};

/// Re-roll budget before a forbidden draw falls back deterministically.
const MASK_RETRY_LIMIT: usize = 8;

/// Mask predicate over source patch centers, with the allowed-center
/// list that backs the deterministic fallback.
pub(crate) struct SourceFilter<'a> {
    mask: Option<ImageView<'a, u8>>,
    threshold: u8,
    rect: Rect,
    allowed: Vec<Point>,
}

impl<'a> SourceFilter<'a> {
    /// Builds the filter; fails with `MaskDegenerate` when a mask is
    /// bound but forbids every candidate center.
    pub(crate) fn new(
        mask: Option<ImageView<'a, u8>>,
        threshold: u8,
        rect: Rect,
    ) -> PatchFieldResult<Self> {
        let mut allowed = Vec::new();
        if let Some(mask) = &mask {
            for y in rect.top..rect.bottom {
                for x in rect.left..rect.right {
                    if mask.pixel(x, y) >= threshold {
                        allowed.push(Point::new(x, y));
                    }
                }
            }
            if allowed.is_empty() {
                return Err(PatchFieldError::MaskDegenerate);
            }
        }
        Ok(Self {
            mask,
            threshold,
            rect,
            allowed,
        })
    }

    #[inline]
    fn is_allowed(&self, s: Point) -> bool {
        match &self.mask {
            None => true,
            Some(mask) => mask.pixel(s.x, s.y) >= self.threshold,
        }
    }

    /// Returns `s` if allowed; otherwise re-rolls uniformly up to the
    /// retry budget and finally falls back to the nearest allowed center
    /// (ties broken by scan order).
    pub(crate) fn resolve(&self, rng: &mut StdRng, s: Point) -> Point {
        if self.is_allowed(s) {
            return s;
        }
        for _ in 0..MASK_RETRY_LIMIT {
            let candidate = Point::new(
                rng.random_range(self.rect.left..self.rect.right),
                rng.random_range(self.rect.top..self.rect.bottom),
            );
            if self.is_allowed(candidate) {
                return candidate;
            }
        }
        self.nearest_allowed(s)
    }

    fn nearest_allowed(&self, s: Point) -> Point {
        let mut best = self.allowed[0];
        let mut best_d = i64::MAX;
        for &p in &self.allowed {
            let dx = i64::from(p.x - s.x);
            let dy = i64::from(p.y - s.y);
            let d = dx * dx + dy * dy;
            if d < best_d {
                best_d = d;
                best = p;
            }
        }
        best
    }
}

/// Seeds every field cell with a uniform draw from the source rectangle.
pub(crate) fn random_fill<P: Pixel>(
    ctx: &FieldCtx<'_, P>,
    filter: &SourceFilter<'_>,
    rng: &mut StdRng,
) {
    let rect = ctx.geom.source;
    for y in 0..ctx.target.height() as i32 {
        for x in 0..ctx.target.width() as i32 {
            let t = Point::new(x, y);
            let draw = Point::new(
                rng.random_range(rect.left..rect.right),
                rng.random_range(rect.top..rect.bottom),
            );
            let s = filter.resolve(rng, draw);
            ctx.set_offset(x, y, Offset::between(t, s));
        }
    }
    prepare_cache(ctx);
}

/// Seeds every field cell with the rescaled target coordinate.
pub(crate) fn smooth_fill<P: Pixel>(
    ctx: &FieldCtx<'_, P>,
    filter: &SourceFilter<'_>,
    rng: &mut StdRng,
) {
    let rect = ctx.geom.source;
    let sx_scale = (ctx.source.width() - 1) as f64 / (ctx.target.width() - 1).max(1) as f64;
    let sy_scale = (ctx.source.height() - 1) as f64 / (ctx.target.height() - 1).max(1) as f64;
    for y in 0..ctx.target.height() as i32 {
        for x in 0..ctx.target.width() as i32 {
            let t = Point::new(x, y);
            let mapped = Point::new(
                rect.clamp_x((f64::from(x) * sx_scale).round() as i32),
                rect.clamp_y((f64::from(y) * sy_scale).round() as i32),
            );
            let s = filter.resolve(rng, mapped);
            ctx.set_offset(x, y, Offset::between(t, s));
        }
    }
    prepare_cache(ctx);
}

/// Computes the full-patch distance for every valid target center.
fn prepare_cache<P: Pixel>(ctx: &FieldCtx<'_, P>) {
    let rect = ctx.geom.target;
    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            let t = Point::new(x, y);
            let offset = ctx.offset(x, y);
            let d = patch_distance::<P, false>(
                &ctx.target,
                &ctx.source,
                &ctx.geom,
                t,
                offset.apply(t),
                P::Distance::default(),
            );
            ctx.record(x, y, offset, d);
        }
    }
}
