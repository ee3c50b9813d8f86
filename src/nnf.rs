//! Nearest-neighbor-field driver.
//!
//! `NnField` owns the configuration and, once initialized, the offset
//! field, the best-distance cache, the patch geometry and the superpatch
//! grid. Each `iteration()` call runs one propagation + random-search
//! pass over the valid target centers, alternating scan direction.

#[cfg(feature = "image-io")]
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(feature = "rayon")]
use rand::Rng;

use crate::field::OffsetField;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::FieldGeometry;
use crate::pixel::Pixel;
use crate::schedule::TileGrid;
use crate::search::init::{random_fill, smooth_fill, SourceFilter};
use crate::search::{process_span, FieldConfig, FieldCtx, InitialField};
use crate::trace::{field_initialized, init_span, iteration_span};
use crate::util::{PatchFieldError, PatchFieldResult, Rect};

/// Largest supported image side; offsets between any two coordinates
/// below this bound fit in `i16`.
pub const MAX_IMAGE_SIDE: usize = i16::MAX as usize;

/// Approximate nearest-neighbor field between a target and a source image.
pub struct NnField<'a, P: Pixel> {
    target: ImageView<'a, P>,
    source: ImageView<'a, P>,
    source_mask: Option<ImageView<'a, u8>>,
    config: FieldConfig,
    state: Option<FieldState<P>>,
}

struct FieldState<P: Pixel> {
    offsets: OffsetField,
    distances: OwnedImage<P::Distance>,
    geom: FieldGeometry,
    tiles: TileGrid,
    rng: StdRng,
    iteration: u32,
}

impl<'a, P: Pixel> NnField<'a, P> {
    /// Creates an uninitialized solver over the given image pair.
    pub fn new(target: ImageView<'a, P>, source: ImageView<'a, P>, config: FieldConfig) -> Self {
        Self {
            target,
            source,
            source_mask: None,
            config,
            state: None,
        }
    }

    /// Binds a source mask; consulted only when
    /// [`FieldConfig::use_source_mask`] is set.
    pub fn with_source_mask(mut self, mask: ImageView<'a, u8>) -> Self {
        self.source_mask = Some(mask);
        self
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Allocates the field and cache, builds the superpatch grid and
    /// seeds the field per [`FieldConfig::initial_field`]. Idempotent.
    pub fn initialize(&mut self) -> PatchFieldResult<()> {
        if self.state.is_some() {
            return Ok(());
        }
        let geom = self.validate()?;
        let _span = init_span();

        let mask = self.effective_mask()?;
        let filter = SourceFilter::new(mask, self.config.mask_threshold, geom.source)?;

        let mut offsets = OffsetField::filled(
            self.target.width(),
            self.target.height(),
            crate::field::Offset::ZERO,
        )?;
        let mut distances = OwnedImage::filled(
            self.target.width(),
            self.target.height(),
            P::Distance::default(),
        )?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let ctx = FieldCtx::new(
            self.target,
            self.source,
            mask,
            self.config.mask_threshold,
            geom,
            &mut offsets,
            &mut distances,
        );
        match self.config.initial_field {
            InitialField::Random => random_fill(&ctx, &filter, &mut rng),
            InitialField::Smooth => smooth_fill(&ctx, &filter, &mut rng),
        }
        drop(ctx);

        let tiles = TileGrid::build(geom.target, self.config.tile_size);
        field_initialized(tiles.len());
        self.state = Some(FieldState {
            offsets,
            distances,
            geom,
            tiles,
            rng,
            iteration: 0,
        });
        Ok(())
    }

    /// Runs one iteration: direct scan on even counters, reverse on odd.
    ///
    /// With `parallel` (and the `rayon` feature) the superpatch
    /// scheduler fans tiles out to the thread pool; otherwise the whole
    /// rectangle is processed in scan order on the calling thread.
    pub fn iteration(&mut self, parallel: bool) -> PatchFieldResult<()> {
        let state = self.state.as_mut().ok_or(PatchFieldError::NotInitialized)?;
        let reverse = state.iteration % 2 == 1;
        let _span = iteration_span(state.iteration, reverse, parallel);

        let geom = state.geom;
        let ctx = FieldCtx::new(
            self.target,
            self.source,
            if self.config.use_source_mask {
                self.source_mask
            } else {
                None
            },
            self.config.mask_threshold,
            geom,
            &mut state.offsets,
            &mut state.distances,
        );

        #[cfg(feature = "rayon")]
        {
            if parallel {
                let worker_seed: u64 = state.rng.random();
                crate::schedule::run_parallel(&ctx, &state.tiles, reverse, worker_seed);
            } else {
                process_span(&ctx, geom.target, reverse, &mut state.rng);
            }
        }
        #[cfg(not(feature = "rayon"))]
        {
            let _ = parallel;
            process_span(&ctx, geom.target, reverse, &mut state.rng);
        }

        drop(ctx);
        state.iteration += 1;
        Ok(())
    }

    /// Number of completed iterations.
    pub fn iteration_count(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.iteration)
    }

    /// The offset field, once initialized.
    pub fn offsets(&self) -> Option<&OffsetField> {
        self.state.as_ref().map(|s| &s.offsets)
    }

    /// The best-distance cache, once initialized.
    pub fn distances(&self) -> Option<&OwnedImage<P::Distance>> {
        self.state.as_ref().map(|s| &s.distances)
    }

    /// Valid target patch centers, once initialized.
    pub fn target_rect(&self) -> Option<Rect> {
        self.state.as_ref().map(|s| s.geom.target)
    }

    /// Valid source patch centers, once initialized.
    pub fn source_rect(&self) -> Option<Rect> {
        self.state.as_ref().map(|s| s.geom.source)
    }

    /// Surrenders the field and cache to the caller.
    pub fn into_parts(self) -> Option<(OffsetField, OwnedImage<P::Distance>)> {
        self.state.map(|s| (s.offsets, s.distances))
    }

    /// Writes the offset field as a two-channel 8-bit image with a +128
    /// bias per component (debugging aid).
    #[cfg(feature = "image-io")]
    pub fn save<Q: AsRef<Path>>(&self, path: Q) -> PatchFieldResult<()> {
        let state = self.state.as_ref().ok_or(PatchFieldError::NotInitialized)?;
        crate::image::io::save_offset_field(&state.offsets, path)
    }

    fn effective_mask(&self) -> PatchFieldResult<Option<ImageView<'a, u8>>> {
        if !self.config.use_source_mask {
            return Ok(None);
        }
        let mask = self.source_mask.ok_or(PatchFieldError::MaskMissing)?;
        if mask.width() != self.source.width() || mask.height() != self.source.height() {
            return Err(PatchFieldError::MaskSizeMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                width: self.source.width(),
                height: self.source.height(),
            });
        }
        Ok(Some(mask))
    }

    fn validate(&self) -> PatchFieldResult<FieldGeometry> {
        let side = self.config.patch_side;
        if side < 3 || side % 2 == 0 {
            return Err(PatchFieldError::InvalidPatchSide { side });
        }
        for (width, height) in [
            (self.target.width(), self.target.height()),
            (self.source.width(), self.source.height()),
        ] {
            if width < side || height < side {
                return Err(PatchFieldError::ImageSmallerThanPatch {
                    width,
                    height,
                    side,
                });
            }
            for dim in [width, height] {
                if dim > MAX_IMAGE_SIDE {
                    return Err(PatchFieldError::DimensionTooLarge {
                        side: dim,
                        limit: MAX_IMAGE_SIDE,
                    });
                }
            }
        }
        let radius = (side as i32 - 1) / 2;
        Ok(FieldGeometry::new(
            self.source.width() as i32,
            self.source.height() as i32,
            self.target.width() as i32,
            self.target.height() as i32,
            radius,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::NnField;
    use crate::image::ImageView;
    use crate::pixel::Gray8;
    use crate::search::FieldConfig;
    use crate::util::PatchFieldError;

    fn gray(noise: &[u8]) -> Vec<Gray8> {
        noise.iter().map(|&v| Gray8(v)).collect()
    }

    #[test]
    fn iteration_before_initialize_fails() {
        let data = gray(&[0; 64]);
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let mut field = NnField::new(view, view, FieldConfig::default());
        assert_eq!(
            field.iteration(false).err().unwrap(),
            PatchFieldError::NotInitialized
        );
    }

    #[test]
    fn even_patch_side_is_rejected() {
        let data = gray(&[0; 64]);
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let mut field = NnField::new(
            view,
            view,
            FieldConfig {
                patch_side: 4,
                ..FieldConfig::default()
            },
        );
        assert_eq!(
            field.initialize().err().unwrap(),
            PatchFieldError::InvalidPatchSide { side: 4 }
        );
    }

    #[test]
    fn undersized_image_is_rejected() {
        let data = gray(&[0; 30]);
        let view = ImageView::from_slice(&data, 6, 5).unwrap();
        let mut field = NnField::new(view, view, FieldConfig::default());
        assert_eq!(
            field.initialize().err().unwrap(),
            PatchFieldError::ImageSmallerThanPatch {
                width: 6,
                height: 5,
                side: 7,
            }
        );
    }

    #[test]
    fn mask_mode_requires_a_mask() {
        let data = gray(&[0; 100]);
        let view = ImageView::from_slice(&data, 10, 10).unwrap();
        let mut field = NnField::new(
            view,
            view,
            FieldConfig {
                use_source_mask: true,
                seed: Some(1),
                ..FieldConfig::default()
            },
        );
        assert_eq!(field.initialize().err().unwrap(), PatchFieldError::MaskMissing);
    }

    #[test]
    fn initialize_is_idempotent_and_counts_iterations() {
        let data: Vec<Gray8> = (0..256u32)
            .map(|i| Gray8(((i * 37) & 0xFF) as u8))
            .collect();
        let view = ImageView::from_slice(&data, 16, 16).unwrap();
        let mut field = NnField::new(
            view,
            view,
            FieldConfig {
                seed: Some(9),
                ..FieldConfig::default()
            },
        );
        field.initialize().unwrap();
        let first = field.offsets().unwrap().as_slice().to_vec();
        field.initialize().unwrap();
        assert_eq!(field.offsets().unwrap().as_slice(), first.as_slice());

        assert_eq!(field.iteration_count(), 0);
        field.iteration(false).unwrap();
        field.iteration(false).unwrap();
        assert_eq!(field.iteration_count(), 2);
    }
}
