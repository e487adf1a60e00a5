pub mod dataset;

pub use dataset::{
    HEIGHT, MnistBatch, MnistBatcher, MnistDataset, MnistItem, NUM_CLASSES, Split, WIDTH,
};
