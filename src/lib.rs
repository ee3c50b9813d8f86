//! PatchField computes approximate nearest-neighbor fields between images.
//!
//! For a target image *A* and a source image *B*, the solver maintains an
//! offset field mapping every target patch center to its currently best
//! source patch center under summed squared pixel differences. The field
//! is refined with the randomized PatchMatch scheme: random (or smooth)
//! initialization, then iterations alternating propagation (adopt a scan
//! neighbor's offset) and random search (probe geometrically shrinking
//! windows). A best-distance cache, incremental scanline distance
//! updates, and a superpatch wavefront scheduler keep iterations fast.
//! Parallel runs trade bit-reproducibility for throughput; seed the
//! configuration and run serially when exact replay matters.
//!
//! ```no_run
//! use patchfield::{FieldConfig, Gray8, ImageView, NnField};
//!
//! # fn main() -> patchfield::PatchFieldResult<()> {
//! # let (target_data, source_data) = (vec![Gray8(0); 64 * 64], vec![Gray8(0); 64 * 64]);
//! let target = ImageView::from_slice(&target_data, 64, 64)?;
//! let source = ImageView::from_slice(&source_data, 64, 64)?;
//! let mut field = NnField::new(target, source, FieldConfig::default());
//! field.initialize()?;
//! for _ in 0..4 {
//!     field.iteration(true)?;
//! }
//! let offsets = field.offsets().expect("initialized");
//! # let _ = offsets;
//! # Ok(())
//! # }
//! ```

pub mod field;
pub mod image;
pub mod lowlevel;
pub mod pixel;
pub mod util;

mod kernel;
mod nnf;
mod schedule;
mod search;
pub(crate) mod trace;

pub use field::{Offset, OffsetField};
pub use image::{ImageView, OwnedImage};
pub use nnf::{NnField, MAX_IMAGE_SIDE};
pub use pixel::{Accumulator, Gray8, Pixel, Rgb8};
pub use search::{FieldConfig, InitialField};
pub use util::{PatchFieldError, PatchFieldResult, Rect};
