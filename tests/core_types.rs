use patchfield::lowlevel;
use patchfield::{
    FieldConfig, Gray8, ImageView, NnField, Offset, OwnedImage, PatchFieldError, Pixel, Rgb8,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [Gray8(0); 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        PatchFieldError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        PatchFieldError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        PatchFieldError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, PatchFieldError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn owned_image_matches_view_contents() {
    let data: Vec<Gray8> = (0u8..16).map(Gray8).collect();
    let img = OwnedImage::new(data.clone(), 4, 4).unwrap();
    assert_eq!(img.width(), 4);
    assert_eq!(img.height(), 4);
    assert_eq!(img.get(2, 3), Some(Gray8(14)));
    assert_eq!(img.view().row(1).unwrap(), &data[4..8]);
}

#[test]
fn pixel_distances_sum_squared_channels() {
    assert_eq!(Gray8::distance(Gray8(7), Gray8(11)), 16);
    assert_eq!(
        Rgb8::distance(Rgb8::new(1, 2, 3), Rgb8::new(4, 2, 1)),
        9 + 0 + 4
    );
}

#[test]
fn offsets_are_compact_and_default_to_zero() {
    assert_eq!(std::mem::size_of::<Offset>(), 4);
    assert_eq!(Offset::default(), Offset::ZERO);
    let off = Offset::new(-3, 12);
    assert_eq!((off.dx, off.dy), (-3, 12));
}

#[test]
fn lowlevel_distance_validates_geometry() {
    let data = vec![Gray8(0); 64];
    let view = ImageView::from_slice(&data, 8, 8).unwrap();

    let err = lowlevel::patch_distance(view, view, (4, 4), (4, 4), 4)
        .err()
        .unwrap();
    assert_eq!(err, PatchFieldError::InvalidPatchSide { side: 4 });

    let err = lowlevel::patch_distance(view, view, (4, 4), (4, 4), 9)
        .err()
        .unwrap();
    assert_eq!(
        err,
        PatchFieldError::ImageSmallerThanPatch {
            width: 8,
            height: 8,
            side: 9,
        }
    );

    let zero = lowlevel::patch_distance(view, view, (4, 4), (4, 4), 7).unwrap();
    assert_eq!(zero, 0);
}

#[test]
fn driver_exposes_center_rectangles() {
    let target_data = vec![Gray8(0); 12 * 10];
    let source_data = vec![Gray8(0); 16 * 16];
    let target = ImageView::from_slice(&target_data, 12, 10).unwrap();
    let source = ImageView::from_slice(&source_data, 16, 16).unwrap();

    let mut field = NnField::new(
        target,
        source,
        FieldConfig {
            seed: Some(4),
            ..FieldConfig::default()
        },
    );
    assert!(field.target_rect().is_none());
    field.initialize().unwrap();

    let trect = field.target_rect().unwrap();
    assert_eq!((trect.left, trect.top, trect.right, trect.bottom), (3, 3, 9, 7));
    let srect = field.source_rect().unwrap();
    assert_eq!((srect.left, srect.top, srect.right, srect.bottom), (3, 3, 13, 13));
}

#[test]
fn oversized_image_is_rejected() {
    let wide = vec![Gray8(0); 32768 * 7];
    let target = ImageView::from_slice(&wide, 32768, 7).unwrap();
    let mut field = NnField::new(target, target, FieldConfig::default());
    assert_eq!(
        field.initialize().err().unwrap(),
        PatchFieldError::DimensionTooLarge {
            side: 32768,
            limit: 32767,
        }
    );
}

#[test]
fn surrendered_parts_match_accessors() {
    let data: Vec<Gray8> = (0..100u32).map(|i| Gray8((i * 31 % 251) as u8)).collect();
    let view = ImageView::from_slice(&data, 10, 10).unwrap();
    let mut field = NnField::new(
        view,
        view,
        FieldConfig {
            patch_side: 3,
            seed: Some(11),
            ..FieldConfig::default()
        },
    );
    field.initialize().unwrap();
    field.iteration(false).unwrap();

    let offsets_copy: Vec<Offset> = field.offsets().unwrap().as_slice().to_vec();
    let (offsets, distances) = field.into_parts().unwrap();
    assert_eq!(offsets.as_slice(), offsets_copy.as_slice());
    assert_eq!(distances.width(), 10);
    assert_eq!(distances.height(), 10);
}
