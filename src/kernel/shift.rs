//! Incremental patch-distance updates for one-pixel moves.
//!
//! Moving a target/source patch pair by one pixel exchanges a single
//! column (or row): the new distance is the previous one minus the
//! departing line's contribution plus the entering line's. All four
//! primitives run in O(side) and address pixels directly; callers
//! guarantee both new centers lie inside the 1-px-shrunk center
//! rectangles so every access stays in bounds.

use crate::image::ImageView;
use crate::pixel::Pixel;
use crate::util::rect::Point;

/// Distance for `(t, s)` given the cached distance for `(t - (1,0), s - (1,0))`.
pub(crate) fn shift_right<P: Pixel>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    prev: P::Distance,
) -> P::Distance {
    column_exchange(target, source, t, s, radius, prev, t.x - radius - 1, t.x + radius)
}

/// Distance for `(t, s)` given the cached distance for `(t + (1,0), s + (1,0))`.
pub(crate) fn shift_left<P: Pixel>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    prev: P::Distance,
) -> P::Distance {
    column_exchange(target, source, t, s, radius, prev, t.x + radius + 1, t.x - radius)
}

/// Distance for `(t, s)` given the cached distance for `(t - (0,1), s - (0,1))`.
pub(crate) fn shift_down<P: Pixel>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    prev: P::Distance,
) -> P::Distance {
    row_exchange(target, source, t, s, radius, prev, t.y - radius - 1, t.y + radius)
}

/// Distance for `(t, s)` given the cached distance for `(t + (0,1), s + (0,1))`.
pub(crate) fn shift_up<P: Pixel>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    prev: P::Distance,
) -> P::Distance {
    row_exchange(target, source, t, s, radius, prev, t.y + radius + 1, t.y - radius)
}

fn column_exchange<P: Pixel>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    prev: P::Distance,
    lost_tx: i32,
    gained_tx: i32,
) -> P::Distance {
    let dx = s.x - t.x;
    let lost_sx = (lost_tx + dx) as usize;
    let gained_sx = (gained_tx + dx) as usize;
    let lost_tx = lost_tx as usize;
    let gained_tx = gained_tx as usize;

    let mut lost = P::Distance::default();
    let mut gained = P::Distance::default();
    for dy in -radius..=radius {
        let trow = target
            .row((t.y + dy) as usize)
            .expect("target row within shift bounds");
        let srow = source
            .row((s.y + dy) as usize)
            .expect("source row within shift bounds");
        lost += P::distance(trow[lost_tx], srow[lost_sx]);
        gained += P::distance(trow[gained_tx], srow[gained_sx]);
    }
    // `prev` contains the departing column, so the subtraction is exact.
    prev - lost + gained
}

fn row_exchange<P: Pixel>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    prev: P::Distance,
    lost_ty: i32,
    gained_ty: i32,
) -> P::Distance {
    let dy = s.y - t.y;
    let t0 = (t.x - radius) as usize;
    let s0 = (s.x - radius) as usize;
    let side = (2 * radius + 1) as usize;

    let lost_trow = target
        .row(lost_ty as usize)
        .expect("target row within shift bounds");
    let lost_srow = source
        .row((lost_ty + dy) as usize)
        .expect("source row within shift bounds");
    let gained_trow = target
        .row(gained_ty as usize)
        .expect("target row within shift bounds");
    let gained_srow = source
        .row((gained_ty + dy) as usize)
        .expect("source row within shift bounds");

    let mut lost = P::Distance::default();
    let mut gained = P::Distance::default();
    for i in 0..side {
        lost += P::distance(lost_trow[t0 + i], lost_srow[s0 + i]);
        gained += P::distance(gained_trow[t0 + i], gained_srow[s0 + i]);
    }
    prev - lost + gained
}
