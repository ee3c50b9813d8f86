//! Random search: probe geometrically shrinking windows around the
//! current best offset.

use rand::rngs::StdRng;
use rand::Rng;

use crate::field::Offset;
use crate::kernel::patch_distance;
use crate::pixel::Pixel;
use crate::search::FieldCtx;
use crate::util::rect::Point;

pub(crate) fn step<P: Pixel>(ctx: &FieldCtx<'_, P>, rng: &mut StdRng, x: i32, y: i32) {
    let t = Point::new(x, y);
    let mut best_offset = ctx.offset(x, y);
    let mut best = ctx.distance(x, y);

    // Integer halving realizes floor(w0 * 0.5^k).
    let mut window = ctx.source.width().max(ctx.source.height()) as i32;
    while window >= 1 {
        let u: f32 = rng.random_range(-1.0..=1.0);
        let v: f32 = rng.random_range(-1.0..=1.0);
        let base = best_offset.apply(t);
        let s = Point::new(
            ctx.geom.source.clamp_x(base.x + (u * window as f32).round() as i32),
            ctx.geom.source.clamp_y(base.y + (v * window as f32).round() as i32),
        );
        if ctx.allowed(s) {
            let candidate = patch_distance::<P, true>(&ctx.target, &ctx.source, &ctx.geom, t, s, best);
            if candidate < best {
                best = candidate;
                best_offset = Offset::between(t, s);
                ctx.record(x, y, best_offset, candidate);
            }
        }
        window /= 2;
    }
}
