#![allow(dead_code)]

use digit_classifier::mnist::{HEIGHT, MnistItem, NUM_CLASSES, WIDTH};
use std::ops::Range;

pub type TestBackend = burn::backend::NdArray<f32>;
pub type TestAutodiffBackend = burn::backend::Autodiff<TestBackend>;

/// Digit-like items where class `k` lights a horizontal band of rows starting at `2k + 4`.
/// A pixel of faint texture varies per item so no two images are identical.
pub fn synthetic_items(n: usize) -> Vec<MnistItem> {
    synthetic_items_in(0..n)
}

/// Same as [`synthetic_items`], for item indices in `range`. Disjoint ranges give disjoint items.
pub fn synthetic_items_in(range: Range<usize>) -> Vec<MnistItem> {
    range
        .map(|i| {
            let label = (i % NUM_CLASSES) as u8;
            let mut image = vec![0.0f32; HEIGHT * WIDTH];
            let first_row = 2 * label as usize + 4;
            for row in first_row..first_row + 2 {
                for col in 4..WIDTH - 4 {
                    image[row * WIDTH + col] = 255.0;
                }
            }
            let speck = (i * 7) % (HEIGHT * WIDTH);
            if image[speck] == 0.0 {
                image[speck] = 30.0;
            }
            MnistItem { image, label }
        })
        .collect()
}

/// Big-endian idx3 image file.
pub fn idx_images(images: &[Vec<u8>], rows: u32, cols: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2051u32.to_be_bytes());
    bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&rows.to_be_bytes());
    bytes.extend_from_slice(&cols.to_be_bytes());
    for image in images {
        bytes.extend_from_slice(image);
    }
    bytes
}

/// Big-endian idx1 label file.
pub fn idx_labels(labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2049u32.to_be_bytes());
    bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    bytes.extend_from_slice(labels);
    bytes
}
