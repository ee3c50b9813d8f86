//! Pixel contracts consumed by the distance kernel.
//!
//! The kernel never inspects channels; it only needs a per-pixel distance
//! returning a scalar accumulator wide enough for a whole-patch sum.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Scalar accumulator for squared-difference sums over a patch.
///
/// Implementations must hold `side² * max_pixel_distance` without
/// overflow; `u64` covers every supported geometry (sides up to 32767,
/// three 8-bit channels).
pub trait Accumulator:
    Copy
    + Ord
    + Default
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + 'static
{
    /// Largest representable distance.
    ///
    /// The solver filters forbidden source centers before the kernel
    /// runs, so it never produces this value itself; it is the natural
    /// rejection sentinel for consumers ranking matches downstream.
    const MAX: Self;
}

impl Accumulator for u32 {
    const MAX: Self = u32::MAX;
}

impl Accumulator for u64 {
    const MAX: Self = u64::MAX;
}

/// Element type the nearest-neighbor field is computed over.
pub trait Pixel: Copy + Send + Sync + 'static {
    /// Accumulator for patch distances between pixels of this type.
    type Distance: Accumulator;

    /// Non-negative distance between two pixels, summed over channels.
    fn distance(a: Self, b: Self) -> Self::Distance;
}

/// 8-bit grayscale pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gray8(pub u8);

impl Pixel for Gray8 {
    type Distance = u64;

    #[inline]
    fn distance(a: Self, b: Self) -> u64 {
        let d = i32::from(a.0) - i32::from(b.0);
        (d * d) as u64
    }
}

/// 8-bit RGB pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Pixel for Rgb8 {
    type Distance = u64;

    #[inline]
    fn distance(a: Self, b: Self) -> u64 {
        let dr = i32::from(a.r) - i32::from(b.r);
        let dg = i32::from(a.g) - i32::from(b.g);
        let db = i32::from(a.b) - i32::from(b.b);
        (dr * dr + dg * dg + db * db) as u64
    }
}
