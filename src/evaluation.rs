use crate::model::Classifier;
use crate::training::Dataloader;
use burn::prelude::*;
use std::fmt;

/// Top-1 accuracy counts over a held-out stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accuracy {
    pub num_correct: usize,
    pub num_samples: usize,
}

impl Accuracy {
    /// Fraction in `[0, 1]`. An empty stream has zero accuracy.
    pub fn ratio(&self) -> f64 {
        if self.num_samples == 0 {
            return 0.0;
        }
        self.num_correct as f64 / self.num_samples as f64
    }

    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }

    pub fn add(&mut self, num_correct: usize, num_samples: usize) {
        self.num_correct += num_correct;
        self.num_samples += num_samples;
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Got {} / {} with accuracy {:.2}",
            self.num_correct,
            self.num_samples,
            self.percent()
        )
    }
}

/// Number of rows whose highest score is at the target class.
///
/// # Shapes
///   - output [batch_size, num_classes]
///   - targets [batch_size]
pub fn count_correct<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let [batch_size, _num_classes] = output.dims();
    let predictions = output.argmax(1).reshape([batch_size]);
    predictions
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

/// Runs `model` over the whole stream without tracking gradients.
pub fn evaluate<B: Backend>(dataloader: Dataloader<B>, model: &Classifier<B>) -> Accuracy {
    let mut accuracy = Accuracy::default();

    for batch in dataloader.iter() {
        let [batch_size, _height, _width] = batch.images.dims();
        let scores = model.forward(batch.flat_images());
        accuracy.add(count_correct(scores, batch.targets), batch_size);
    }
    log::debug!("evaluated {} samples", accuracy.num_samples);

    accuracy
}
