use crate::error::{Error, Result};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::{
    Dataset, InMemDataset,
    transform::{Mapper, MapperDataset},
};
use burn::prelude::*;
use burn_common::network::downloader::download_file_as_bytes;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

// CVDF mirror of http://yann.lecun.com/exdb/mnist/
const URL: &str = "https://storage.googleapis.com/cvdf-datasets/mnist/";
const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

pub const WIDTH: usize = 28;
pub const HEIGHT: usize = 28;
pub const NUM_CLASSES: usize = 10;

/// MNIST item.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MnistItem {
    /// Image as a flat array of floats.
    /// Each value is a brightness, in between 0.0 and 255.0.
    ///
    /// # Shape
    /// [HEIGHT * WIDTH]
    pub image: Vec<f32>,

    /// Label of the image.
    /// Each value is in between 0 and 9.
    pub label: u8,
}

#[derive(Deserialize, Debug, Clone)]
struct MnistItemRaw {
    pub image_bytes: Vec<u8>,
    pub label: u8,
}

struct BytesToImage;

impl Mapper<MnistItemRaw, MnistItem> for BytesToImage {
    /// Convert a raw MNIST item (image bytes) to a MNIST item (flat array image).
    fn map(&self, item: &MnistItemRaw) -> MnistItem {
        debug_assert_eq!(item.image_bytes.len(), WIDTH * HEIGHT);

        let image = item
            .image_bytes
            .iter()
            .map(|brightness| *brightness as f32)
            .collect();

        MnistItem {
            image,
            label: item.label,
        }
    }
}

type MappedDataset = MapperDataset<InMemDataset<MnistItemRaw>, BytesToImage, MnistItemRaw>;

/// Which half of MNIST to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }

    fn images_file(&self) -> &'static str {
        match self {
            Split::Train => TRAIN_IMAGES,
            Split::Test => TEST_IMAGES,
        }
    }

    fn labels_file(&self) -> &'static str {
        match self {
            Split::Train => TRAIN_LABELS,
            Split::Test => TEST_LABELS,
        }
    }
}

/// The MNIST dataset consists of 70,000 28x28 black-and-white images in 10 classes (one for each digits), with 7,000
/// images per class. There are 60,000 training images and 10,000 test images.
///
/// The data is downloaded from the [CVDF mirror](https://github.com/cvdfoundation/mnist)
/// and cached under `<root>/mnist/<split>/`.
pub struct MnistDataset {
    dataset: MappedDataset,
}

impl Dataset<MnistItem> for MnistDataset {
    fn get(&self, index: usize) -> Option<MnistItem> {
        self.dataset.get(index)
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl MnistDataset {
    /// Creates a new train dataset.
    pub fn train(root: impl AsRef<Path>) -> Result<Self> {
        Self::new(root, Split::Train)
    }

    /// Creates a new test dataset.
    pub fn test(root: impl AsRef<Path>) -> Result<Self> {
        Self::new(root, Split::Test)
    }

    pub fn new(root: impl AsRef<Path>, split: Split) -> Result<Self> {
        let split_dir = Self::download(root.as_ref(), split)?;
        Self::from_dir(&split_dir, split)
    }

    /// Loads a split from a directory that already holds the decompressed idx files.
    pub fn from_dir(split_dir: &Path, split: Split) -> Result<Self> {
        // MNIST is tiny so we can load it in-memory
        // Train images (u8): 28 * 28 * 60000 = 47.04Mb
        // Test images (u8): 28 * 28 * 10000 = 7.84Mb
        let images_path = split_dir.join(split.images_file());
        let labels_path = split_dir.join(split.labels_file());
        let images_bytes =
            std::fs::read(&images_path).map_err(|e| Error::io(&images_path, e))?;
        let labels_bytes =
            std::fs::read(&labels_path).map_err(|e| Error::io(&labels_path, e))?;

        let images = parse_images(&images_bytes, split.images_file())?;
        let labels = parse_labels(&labels_bytes, split.labels_file())?;
        if images.len() != labels.len() {
            return Err(Error::invalid_idx(
                split.labels_file(),
                format!("{} images but {} labels", images.len(), labels.len()),
            ));
        }
        log::info!("loaded {} {} images", images.len(), split.name());

        Ok(Self::from_raw(images, labels))
    }

    fn from_raw(images: Vec<Vec<u8>>, labels: Vec<u8>) -> Self {
        let items: Vec<_> = images
            .into_iter()
            .zip(labels)
            .map(|(image_bytes, label)| MnistItemRaw { image_bytes, label })
            .collect();

        let dataset = InMemDataset::new(items);
        let dataset = MapperDataset::new(dataset, BytesToImage);

        Self { dataset }
    }

    /// Download the split files into `<root>/mnist/<split>/`, skipping files already present.
    fn download(root: &Path, split: Split) -> Result<PathBuf> {
        let split_dir = root.join("mnist").join(split.name());
        std::fs::create_dir_all(&split_dir).map_err(|e| Error::io(&split_dir, e))?;

        MnistDataset::download_file(split.images_file(), &split_dir)?;
        MnistDataset::download_file(split.labels_file(), &split_dir)?;

        Ok(split_dir)
    }

    /// Download a file from the MNIST dataset URL to the destination directory.
    /// File download progress is reported by the downloader's progress bar.
    fn download_file(name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = dest_dir.join(name);

        if !file_name.exists() {
            log::info!("downloading {URL}{name}.gz");
            let bytes = download_file_as_bytes(&format!("{URL}{name}.gz"), name);

            let mut output_file =
                File::create(&file_name).map_err(|e| Error::io(&file_name, e))?;

            // Decode gzip file content and write to disk
            let mut gz_buffer = GzDecoder::new(&bytes[..]);
            if let Err(e) = std::io::copy(&mut gz_buffer, &mut output_file) {
                // don't leave a partial file behind, it would be picked up as cached
                std::fs::remove_file(&file_name).ok();
                return Err(Error::io(&file_name, e));
            }
        }

        Ok(file_name)
    }
}

fn read_u32(bytes: &[u8], offset: usize, file: &str) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| Error::invalid_idx(file, "truncated header"))
}

/// Parse an idx3 image file: magic, count, rows, cols, then `count * rows * cols` bytes.
/// Each image is returned as a vector of `HEIGHT * WIDTH` bytes.
pub fn parse_images(bytes: &[u8], file: &str) -> Result<Vec<Vec<u8>>> {
    let magic = read_u32(bytes, 0, file)?;
    if magic != IMAGES_MAGIC {
        return Err(Error::invalid_idx(
            file,
            format!("magic number {magic}, expected {IMAGES_MAGIC}"),
        ));
    }
    let size = read_u32(bytes, 4, file)? as usize;
    let rows = read_u32(bytes, 8, file)? as usize;
    let cols = read_u32(bytes, 12, file)? as usize;
    if rows != HEIGHT || cols != WIDTH {
        return Err(Error::invalid_idx(
            file,
            format!("image size {rows}x{cols}, expected {HEIGHT}x{WIDTH}"),
        ));
    }

    let body = &bytes[16..];
    if body.len() < size * HEIGHT * WIDTH {
        return Err(Error::invalid_idx(
            file,
            format!("expected {size} images, file is truncated"),
        ));
    }

    Ok(body[..size * HEIGHT * WIDTH]
        .chunks(HEIGHT * WIDTH)
        .map(|chunk| chunk.to_vec())
        .collect())
}

/// Parse an idx1 label file: magic, count, then `count` bytes.
pub fn parse_labels(bytes: &[u8], file: &str) -> Result<Vec<u8>> {
    let magic = read_u32(bytes, 0, file)?;
    if magic != LABELS_MAGIC {
        return Err(Error::invalid_idx(
            file,
            format!("magic number {magic}, expected {LABELS_MAGIC}"),
        ));
    }
    let size = read_u32(bytes, 4, file)? as usize;

    let body = &bytes[8..];
    if body.len() < size {
        return Err(Error::invalid_idx(
            file,
            format!("expected {size} labels, file is truncated"),
        ));
    }
    if let Some(label) = body[..size].iter().find(|l| **l as usize >= NUM_CLASSES) {
        return Err(Error::invalid_idx(file, format!("label {label} out of range")));
    }

    Ok(body[..size].to_vec())
}

#[derive(Clone, Default)]
pub struct MnistBatcher {}

#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    /// Brightness scaled into `[0, 1]`.
    ///
    /// # Shape
    /// [batch_size, HEIGHT, WIDTH]
    pub images: Tensor<B, 3>,
    /// # Shape
    /// [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> MnistBatch<B> {
    /// The images flattened into feature vectors.
    ///
    /// # Shape
    /// [batch_size, HEIGHT * WIDTH]
    pub fn flat_images(&self) -> Tensor<B, 2> {
        let [batch_size, height, width] = self.images.dims();
        self.images.clone().reshape([batch_size, height * width])
    }
}

impl<B: Backend> Batcher<B, MnistItem, MnistBatch<B>> for MnistBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> MnistBatch<B> {
        let (items_image, items_label): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.image, item.label))
            .unzip();
        let images = items_image
            .into_iter()
            .map(|image| TensorData::new(image, [1, HEIGHT, WIDTH]).convert::<B::FloatElem>())
            .map(|data| Tensor::<B, 3>::from_data(data, device))
            .map(|tensor| tensor / 255)
            .collect();

        let targets = items_label
            .into_iter()
            .map(|label: u8| {
                Tensor::<B, 1, Int>::from_data([(label as i64).elem::<B::IntElem>()], device)
            })
            .collect();

        let images = Tensor::cat(images, 0);
        let targets = Tensor::cat(targets, 0);

        MnistBatch { images, targets }
    }
}

