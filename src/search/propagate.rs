//! Propagation: adopt a scan-order neighbor's offset when it improves.
//!
//! Monomorphized over scan direction and neighbor availability so the
//! inner loop carries no per-pixel availability branches. On the
//! interior fast path the candidate distance is derived from the
//! neighbor's cached distance with a one-column (or one-row) exchange;
//! boundary centers fall back to the full kernel with early termination.

use crate::kernel::{patch_distance, shift};
use crate::pixel::Pixel;
use crate::search::FieldCtx;
use crate::util::rect::Point;

pub(crate) fn step<P: Pixel, const REVERSE: bool, const HORIZ: bool, const VERT: bool>(
    ctx: &FieldCtx<'_, P>,
    x: i32,
    y: i32,
) {
    let t = Point::new(x, y);
    let mut best = ctx.distance(x, y);

    if HORIZ {
        let nx = if REVERSE { x + 1 } else { x - 1 };
        let offset = ctx.offset(nx, y);
        let s = offset.apply(t);
        if ctx.geom.source.contains_point(s) && ctx.allowed(s) {
            let candidate = if ctx.geom.target_1px.contains_point(t)
                && ctx.geom.source_1px.contains_point(s)
            {
                let prev = ctx.distance(nx, y);
                if REVERSE {
                    shift::shift_left(&ctx.target, &ctx.source, t, s, ctx.geom.radius, prev)
                } else {
                    shift::shift_right(&ctx.target, &ctx.source, t, s, ctx.geom.radius, prev)
                }
            } else {
                patch_distance::<P, true>(&ctx.target, &ctx.source, &ctx.geom, t, s, best)
            };
            if candidate < best {
                ctx.record(x, y, offset, candidate);
                best = candidate;
            }
        }
    }

    if VERT {
        let ny = if REVERSE { y + 1 } else { y - 1 };
        let offset = ctx.offset(x, ny);
        let s = offset.apply(t);
        if ctx.geom.source.contains_point(s) && ctx.allowed(s) {
            let candidate = if ctx.geom.target_1px.contains_point(t)
                && ctx.geom.source_1px.contains_point(s)
            {
                let prev = ctx.distance(x, ny);
                if REVERSE {
                    shift::shift_up(&ctx.target, &ctx.source, t, s, ctx.geom.radius, prev)
                } else {
                    shift::shift_down(&ctx.target, &ctx.source, t, s, ctx.geom.radius, prev)
                }
            } else {
                patch_distance::<P, true>(&ctx.target, &ctx.source, &ctx.geom, t, s, best)
            };
            if candidate < best {
                ctx.record(x, y, offset, candidate);
            }
        }
    }
}
