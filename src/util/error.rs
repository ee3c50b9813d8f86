//! Error types for patchfield.

use thiserror::Error;

/// Result alias for patchfield operations.
pub type PatchFieldResult<T> = std::result::Result<T, PatchFieldError>;

/// Errors that can occur when building views or running the field solver.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchFieldError {
    /// An image dimension is zero.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the image width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The patch side is even or below the supported minimum.
    #[error("patch side {side} must be odd and at least 3")]
    InvalidPatchSide { side: usize },
    /// An input image is smaller than one patch.
    #[error("image {width}x{height} is smaller than a {side}x{side} patch")]
    ImageSmallerThanPatch {
        width: usize,
        height: usize,
        side: usize,
    },
    /// An image side exceeds the range representable by i16 offsets.
    #[error("image side {side} exceeds the supported limit of {limit}")]
    DimensionTooLarge { side: usize, limit: usize },
    /// Source-mask mode is enabled but no mask is bound.
    #[error("source-mask mode is enabled but no mask is bound")]
    MaskMissing,
    /// The bound mask does not match the source dimensions.
    #[error("mask {mask_width}x{mask_height} does not match source {width}x{height}")]
    MaskSizeMismatch {
        mask_width: usize,
        mask_height: usize,
        width: usize,
        height: usize,
    },
    /// The mask forbids every candidate source patch center.
    #[error("source mask forbids every candidate patch center")]
    MaskDegenerate,
    /// `iteration()` or `save()` was called before `initialize()`.
    #[error("field is not initialized")]
    NotInitialized,
    /// Reading or writing an image file failed.
    #[cfg(feature = "image-io")]
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}
