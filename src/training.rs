use crate::evaluation::count_correct;
use crate::mnist::{MnistBatch, MnistBatcher, MnistItem};
use crate::model::Classifier;
use crate::optim::ClassifierOptimConfig;
use burn::data::dataloader::{DataLoader, DataLoaderBuilder};
use burn::data::dataset::Dataset;
use burn::prelude::*;
use burn::{
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

#[derive(Config)]
pub struct TrainingConfig {
    pub optimizer: AdamConfig,
    #[config(default = 1)]
    pub num_epochs: usize,
    #[config(default = 64)]
    pub batch_size: usize,
    #[config(default = 1)]
    pub num_workers: usize,
    #[config(default = 1e-3)]
    pub lr: f64,
    #[config(default = 42)]
    pub seed: u64,
    /// Log the running loss and accuracy every this many batches.
    #[config(default = 100)]
    pub log_interval: usize,
}

impl TrainingConfig {
    /// Rejects settings the data loader cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".into());
        }
        Ok(())
    }
}

pub type Dataloader<B> = Arc<dyn DataLoader<B, MnistBatch<B>> + 'static>;

/// Shuffled batch stream over `dataset`.
pub fn dataloader<B, D>(dataset: D, training_config: &TrainingConfig) -> Dataloader<B>
where
    B: Backend,
    D: Dataset<MnistItem> + 'static,
{
    DataLoaderBuilder::new(MnistBatcher::default())
        .batch_size(training_config.batch_size)
        .shuffle(training_config.seed)
        .num_workers(training_config.num_workers)
        .build(dataset)
}

/// Trains `model` over `dataset_train` for `num_epochs` with Adam and returns the updated model.
pub fn train<AutoB: AutodiffBackend>(
    training_config: &TrainingConfig,
    mut model: Classifier<AutoB>,
    dataset_train: impl Dataset<MnistItem> + 'static,
) -> Classifier<AutoB> {
    AutoB::seed(training_config.seed);

    let mut optim = ClassifierOptimConfig::<AutoB>::init_optimizer(&training_config.optimizer);
    let dataloader_train = dataloader::<AutoB, _>(dataset_train, training_config);

    log::info!("starting training");
    for epoch in 1..training_config.num_epochs + 1 {
        model = epoch_train(
            Arc::clone(&dataloader_train),
            model,
            &mut optim,
            training_config,
            epoch,
        );
    }
    log::info!("training finished");

    model
}

/// One pass over the training stream.
pub fn epoch_train<AutoB, O>(
    dataloader_train: Dataloader<AutoB>,
    mut model: Classifier<AutoB>,
    optim: &mut O,
    training_config: &TrainingConfig,
    epoch: usize,
) -> Classifier<AutoB>
where
    AutoB: AutodiffBackend,
    O: Optimizer<Classifier<AutoB>, AutoB>,
{
    let num_batches = dataloader_train
        .num_items()
        .div_ceil(training_config.batch_size);
    let log_interval = training_config.log_interval.max(1);

    let mut loss_sum = 0.0;
    let mut num_correct = 0;
    let mut num_samples = 0;
    let mut num_iterations = 0;

    for (b, batch) in dataloader_train.iter().enumerate() {
        let b = b + 1;
        let [batch_size, _height, _width] = batch.images.dims();
        let images = batch.flat_images();

        let output = model.forward_classification(images, batch.targets);
        loss_sum += output.loss.clone().into_scalar().elem::<f64>();
        num_correct += count_correct(output.output.clone(), output.targets.clone());
        num_samples += batch_size;
        num_iterations += 1;

        let grads = output.loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(training_config.lr, model, grads);

        if b % log_interval == 0 {
            log::info!(
                "Epoch {}/{}, Batch {b:0>4}/{num_batches}, Loss {:.4}, Acc {:.2}",
                epoch,
                training_config.num_epochs,
                loss_sum / num_iterations as f64,
                100.0 * num_correct as f64 / num_samples as f64,
            );
        }
    }

    if num_iterations > 0 {
        log::info!(
            "Epoch {}/{}, Avg Loss {:.4}, Avg Acc {:.2}",
            epoch,
            training_config.num_epochs,
            loss_sum / num_iterations as f64,
            100.0 * num_correct as f64 / num_samples as f64,
        );
    } else {
        log::warn!("epoch {epoch} had no training batches");
    }

    model
}
