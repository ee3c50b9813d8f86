#![cfg(feature = "rayon")]

use patchfield::lowlevel;
use patchfield::{FieldConfig, Gray8, ImageView, NnField};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_noise(width: usize, height: usize, seed: u64) -> Vec<Gray8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height)
        .map(|_| Gray8(rng.random_range(0..=255)))
        .collect()
}

fn mean_distance(field: &NnField<'_, Gray8>) -> f64 {
    let trect = field.target_rect().unwrap();
    let distances = field.distances().unwrap();
    let mut total = 0.0f64;
    let mut pixels = 0usize;
    for y in trect.top..trect.bottom {
        for x in trect.left..trect.right {
            total += distances.get(x as usize, y as usize).unwrap() as f64;
            pixels += 1;
        }
    }
    total / pixels as f64
}

#[test]
fn parallel_iterations_preserve_invariants() {
    let target_data = make_noise(64, 64, 41);
    let source_data = make_noise(64, 64, 42);
    let target = ImageView::from_slice(&target_data, 64, 64).unwrap();
    let source = ImageView::from_slice(&source_data, 64, 64).unwrap();

    let mut field = NnField::new(
        target,
        source,
        FieldConfig {
            // Small tiles force a multi-tile wavefront even at 64x64.
            tile_size: 16,
            seed: Some(43),
            ..FieldConfig::default()
        },
    );
    field.initialize().unwrap();

    let mut previous: Vec<u64> = field.distances().unwrap().as_slice().to_vec();
    for _ in 0..4 {
        field.iteration(true).unwrap();

        let trect = field.target_rect().unwrap();
        let srect = field.source_rect().unwrap();
        let offsets = field.offsets().unwrap();
        let distances = field.distances().unwrap();
        for y in trect.top..trect.bottom {
            for x in trect.left..trect.right {
                let off = offsets.get(x as usize, y as usize).unwrap();
                let sx = x + i32::from(off.dx);
                let sy = y + i32::from(off.dy);
                assert!(srect.contains(sx, sy));
                let expected =
                    lowlevel::patch_distance(target, source, (x, y), (sx, sy), 7).unwrap();
                assert_eq!(distances.get(x as usize, y as usize).unwrap(), expected);
            }
        }

        let current = field.distances().unwrap().as_slice().to_vec();
        for (new, old) in current.iter().zip(previous.iter()) {
            assert!(new <= old, "per-pixel distance increased under parallelism");
        }
        previous = current;
    }
}

#[test]
fn parallel_mean_tracks_serial_mean() {
    let target_data = make_noise(64, 64, 44);
    let source_data = make_noise(64, 64, 45);
    let target = ImageView::from_slice(&target_data, 64, 64).unwrap();
    let source = ImageView::from_slice(&source_data, 64, 64).unwrap();

    let config = FieldConfig {
        tile_size: 16,
        seed: Some(46),
        ..FieldConfig::default()
    };

    let mut serial = NnField::new(target, source, config.clone());
    serial.initialize().unwrap();
    for _ in 0..4 {
        serial.iteration(false).unwrap();
    }

    let mut parallel = NnField::new(target, source, config);
    parallel.initialize().unwrap();
    for _ in 0..4 {
        parallel.iteration(true).unwrap();
    }

    let serial_mean = mean_distance(&serial);
    let parallel_mean = mean_distance(&parallel);
    let relative = (serial_mean - parallel_mean).abs() / serial_mean.max(parallel_mean);
    assert!(
        relative < 0.02,
        "serial mean {serial_mean} vs parallel mean {parallel_mean}"
    );
}
