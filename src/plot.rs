//! Renders a handful of test images next to what the classifier predicted for them.

use crate::error::Result;
use crate::mnist::{HEIGHT, WIDTH};
use crate::model::Classifier;
use crate::training::Dataloader;
use burn::prelude::*;
use image::{GrayImage, Luma};
use std::fmt;
use std::path::Path;

pub const GRID_ROWS: usize = 3;
pub const GRID_COLS: usize = 5;
pub const NUM_SAMPLES: usize = GRID_ROWS * GRID_COLS;

/// Pixels of padding around the caption and the image, before scaling.
const PADDING: u32 = 2;

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
/// Characters in `LABEL: d - PREDICTION: d`.
const CAPTION_CHARS: u32 = 24;
const CAPTION_WIDTH: u32 = CAPTION_CHARS * GLYPH_ADVANCE - 1;

/// Cell size before scaling: a caption line above the image.
pub const CELL_WIDTH: u32 = max(CAPTION_WIDTH, WIDTH as u32) + 2 * PADDING;
pub const CELL_HEIGHT: u32 = GLYPH_HEIGHT + HEIGHT as u32 + 3 * PADDING;

const fn max(a: u32, b: u32) -> u32 {
    if a > b { a } else { b }
}

#[derive(Clone, Debug)]
pub struct SamplePrediction {
    /// Brightness in `[0, 1]`.
    ///
    /// # Shape
    /// [HEIGHT * WIDTH]
    pub image: Vec<f32>,
    pub label: u8,
    pub prediction: u8,
}

impl SamplePrediction {
    pub fn is_correct(&self) -> bool {
        self.label == self.prediction
    }
}

impl fmt::Display for SamplePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label: {} - Prediction: {}", self.label, self.prediction)
    }
}

/// Predicts the first image of each of the first `count` batches.
pub fn predict_samples<B: Backend>(
    dataloader: Dataloader<B>,
    model: &Classifier<B>,
    count: usize,
) -> Vec<SamplePrediction> {
    dataloader
        .iter()
        .take(count)
        .map(|batch| {
            let image = batch.images.narrow(0, 0, 1);
            let target = batch.targets.narrow(0, 0, 1);
            let prediction = model.predict(image.clone().reshape([1, HEIGHT * WIDTH]));

            SamplePrediction {
                image: image.into_data().iter::<f32>().collect(),
                label: target.into_scalar().elem::<i64>() as u8,
                prediction: prediction.into_scalar().elem::<i64>() as u8,
            }
        })
        .collect()
}

/// Lays the samples out row-major on a `GRID_ROWS x GRID_COLS` grid, each pixel
/// drawn as a `scale x scale` block. Every cell holds the caption above the image.
/// Cells without a sample stay blank.
pub fn render_grid(samples: &[SamplePrediction], scale: u32) -> GrayImage {
    let scale = scale.max(1);
    let mut grid = GrayImage::from_pixel(
        CELL_WIDTH * GRID_COLS as u32 * scale,
        CELL_HEIGHT * GRID_ROWS as u32 * scale,
        Luma([255u8]),
    );

    for (i, sample) in samples.iter().take(NUM_SAMPLES).enumerate() {
        let cell_x = (i % GRID_COLS) as u32 * CELL_WIDTH;
        let cell_y = (i / GRID_COLS) as u32 * CELL_HEIGHT;

        let caption = sample.to_string().to_uppercase();
        let caption_x = cell_x + (CELL_WIDTH - CAPTION_WIDTH) / 2;
        for (c, ch) in caption.chars().take(CAPTION_CHARS as usize).enumerate() {
            let x0 = caption_x + c as u32 * GLYPH_ADVANCE;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (0b100 >> col) != 0 {
                        let y = cell_y + PADDING + row as u32;
                        fill_block(&mut grid, x0 + col, y, scale, 0);
                    }
                }
            }
        }

        let image_x = cell_x + (CELL_WIDTH - WIDTH as u32) / 2;
        let image_y = cell_y + GLYPH_HEIGHT + 2 * PADDING;
        for (p, value) in sample.image.iter().enumerate().take(HEIGHT * WIDTH) {
            let luma = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            let x = image_x + (p % WIDTH) as u32;
            let y = image_y + (p / WIDTH) as u32;
            fill_block(&mut grid, x, y, scale, luma);
        }
    }

    grid
}

/// Paints the unscaled pixel `(x, y)` as a `scale x scale` block.
fn fill_block(grid: &mut GrayImage, x: u32, y: u32, scale: u32, luma: u8) {
    for dy in 0..scale {
        for dx in 0..scale {
            grid.put_pixel(x * scale + dx, y * scale + dy, Luma([luma]));
        }
    }
}

/// 3x5 bitmap rows, most significant bit on the left.
/// Covers the caption alphabet; anything else is blank.
fn glyph(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'N' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        _ => [0; 5],
    }
}

/// Renders the grid and writes it as a PNG, creating parent directories.
pub fn save_grid(samples: &[SamplePrediction], scale: u32, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| crate::Error::io(parent, e))?;
    }
    render_grid(samples, scale).save(path)?;
    log::info!("saved {} sample predictions to {path:?}", samples.len());
    Ok(())
}
