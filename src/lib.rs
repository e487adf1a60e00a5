pub mod backend;
pub mod cli;
pub mod error;
pub mod evaluation;
pub mod mnist;
pub mod model;
pub mod optim;
pub mod plot;
pub mod training;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::evaluation::{Accuracy, evaluate};
    pub use crate::mnist::{MnistBatch, MnistBatcher, MnistDataset, MnistItem};
    pub use crate::model::{Classifier, ClassifierConfig, ModelConfigExt};
    pub use crate::training::{TrainingConfig, train};
}
