//! Scalar full-patch distance kernels.

use crate::image::ImageView;
use crate::kernel::reflect;
use crate::pixel::Pixel;
use crate::util::rect::Point;

/// Direct-addressing distance for interior centers.
///
/// Callers guarantee both patches lie fully inside their images. The
/// early-termination check runs once per patch row.
pub(crate) fn distance_direct<P: Pixel, const EARLY: bool>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    known: P::Distance,
) -> P::Distance {
    let side = (2 * radius + 1) as usize;
    let t0 = (t.x - radius) as usize;
    let s0 = (s.x - radius) as usize;

    let mut acc = P::Distance::default();
    for dy in -radius..=radius {
        let trow = target
            .row((t.y + dy) as usize)
            .expect("target row within patch bounds");
        let srow = source
            .row((s.y + dy) as usize)
            .expect("source row within patch bounds");
        for i in 0..side {
            acc += P::distance(trow[t0 + i], srow[s0 + i]);
        }
        if EARLY && acc > known {
            return acc;
        }
    }
    acc
}

/// Reflecting distance for boundary centers.
///
/// Coordinates that fall outside an image are mirrored back in along the
/// offending axis; in-bounds coordinates pass through unchanged.
pub(crate) fn distance_mirror<P: Pixel, const EARLY: bool, const MIRROR_T: bool, const MIRROR_S: bool>(
    target: &ImageView<'_, P>,
    source: &ImageView<'_, P>,
    t: Point,
    s: Point,
    radius: i32,
    known: P::Distance,
) -> P::Distance {
    let tw = target.width() as i32;
    let th = target.height() as i32;
    let sw = source.width() as i32;
    let sh = source.height() as i32;

    let mut acc = P::Distance::default();
    for dy in -radius..=radius {
        let ty = if MIRROR_T { reflect(t.y + dy, th) } else { t.y + dy };
        let sy = if MIRROR_S { reflect(s.y + dy, sh) } else { s.y + dy };
        for dx in -radius..=radius {
            let tx = if MIRROR_T { reflect(t.x + dx, tw) } else { t.x + dx };
            let sx = if MIRROR_S { reflect(s.x + dx, sw) } else { s.x + dx };
            acc += P::distance(target.pixel(tx, ty), source.pixel(sx, sy));
        }
        if EARLY && acc > known {
            return acc;
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::{distance_direct, distance_mirror};
    use crate::image::ImageView;
    use crate::kernel::{patch_distance, FieldGeometry};
    use crate::pixel::{Gray8, Pixel};
    use crate::util::rect::Point;

    fn make_image(width: usize, height: usize, salt: usize) -> Vec<Gray8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(Gray8((((x * 13) ^ (y * 7) ^ (x * y) ^ salt) & 0xFF) as u8));
            }
        }
        data
    }

    fn brute_force(
        target: &ImageView<'_, Gray8>,
        source: &ImageView<'_, Gray8>,
        t: Point,
        s: Point,
        radius: i32,
    ) -> u64 {
        let mut acc = 0u64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let tp = target.pixel(t.x + dx, t.y + dy);
                let sp = source.pixel(s.x + dx, s.y + dy);
                acc += Gray8::distance(tp, sp);
            }
        }
        acc
    }

    #[test]
    fn direct_matches_bruteforce() {
        let data_a = make_image(16, 12, 0);
        let data_b = make_image(16, 12, 99);
        let target = ImageView::from_slice(&data_a, 16, 12).unwrap();
        let source = ImageView::from_slice(&data_b, 16, 12).unwrap();

        let t = Point::new(7, 6);
        let s = Point::new(9, 4);
        let expected = brute_force(&target, &source, t, s, 3);
        let got = distance_direct::<Gray8, false>(&target, &source, t, s, 3, 0);
        assert_eq!(got, expected);
    }

    #[test]
    fn mirror_is_identity_for_interior_centers() {
        let data_a = make_image(16, 12, 1);
        let data_b = make_image(16, 12, 2);
        let target = ImageView::from_slice(&data_a, 16, 12).unwrap();
        let source = ImageView::from_slice(&data_b, 16, 12).unwrap();

        let t = Point::new(6, 5);
        let s = Point::new(8, 6);
        let direct = distance_direct::<Gray8, false>(&target, &source, t, s, 3, 0);
        let mirrored =
            distance_mirror::<Gray8, false, true, true>(&target, &source, t, s, 3, 0);
        assert_eq!(direct, mirrored);
    }

    #[test]
    fn early_termination_reports_at_least_known() {
        let data_a = make_image(16, 12, 3);
        let data_b = make_image(16, 12, 200);
        let target = ImageView::from_slice(&data_a, 16, 12).unwrap();
        let source = ImageView::from_slice(&data_b, 16, 12).unwrap();

        let t = Point::new(7, 6);
        let s = Point::new(8, 5);
        let full = distance_direct::<Gray8, false>(&target, &source, t, s, 3, 0);
        assert!(full > 0);

        let truncated = distance_direct::<Gray8, true>(&target, &source, t, s, 3, full / 4);
        assert!(truncated > full / 4);
        // An unreachable bound leaves the result exact.
        let exact = distance_direct::<Gray8, true>(&target, &source, t, s, 3, full);
        assert_eq!(exact, full);
    }

    #[test]
    fn dispatch_picks_mirror_on_tiny_images() {
        // 4x4 with patch 3x3: the 1px rectangles are empty, every center
        // routes through the reflecting path and stays in bounds.
        let data_a = make_image(4, 4, 4);
        let data_b = make_image(4, 4, 5);
        let target = ImageView::from_slice(&data_a, 4, 4).unwrap();
        let source = ImageView::from_slice(&data_b, 4, 4).unwrap();
        let geom = FieldGeometry::new(4, 4, 4, 4, 1);
        assert!(geom.target_1px.is_empty());

        for ty in 1..3 {
            for tx in 1..3 {
                for sy in 1..3 {
                    for sx in 1..3 {
                        let t = Point::new(tx, ty);
                        let s = Point::new(sx, sy);
                        let got = patch_distance::<Gray8, false>(&target, &source, &geom, t, s, 0);
                        assert_eq!(got, brute_force(&target, &source, t, s, 1));
                    }
                }
            }
        }
    }
}
