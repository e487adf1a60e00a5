mod common;

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;
use common::{TestBackend, synthetic_items};
use digit_classifier::backend::MainAutoBackend;
use digit_classifier::mnist::{HEIGHT, MnistBatcher, NUM_CLASSES, WIDTH};
use digit_classifier::model::{Classifier, ClassifierConfig, ModelConfigExt};

#[test]
fn output_has_one_column_per_class() {
    let device = Default::default();
    let model: Classifier<TestBackend> = ClassifierConfig::new().init(&device);

    for batch_size in [1, 7, 64] {
        let input = Tensor::<TestBackend, 2>::zeros([batch_size, HEIGHT * WIDTH], &device);
        assert_eq!(model.forward(input).dims(), [batch_size, NUM_CLASSES]);
    }
    assert_eq!(model.num_classes(), NUM_CLASSES);
}

#[test]
fn output_follows_configured_class_count() {
    let device = Default::default();
    let model: Classifier<TestBackend> = ClassifierConfig::new()
        .with_num_classes(3)
        .with_hidden_size(8)
        .init(&device);

    let input = Tensor::<TestBackend, 2>::ones([5, HEIGHT * WIDTH], &device);
    assert_eq!(model.forward(input).dims(), [5, 3]);
    assert_eq!(model.fc1.weight.dims(), [HEIGHT * WIDTH, 8]);
}

#[test]
fn flattening_preserves_element_count() {
    let device = Default::default();
    let batch =
        Batcher::<TestBackend, _, _>::batch(&MnistBatcher::default(), synthetic_items(6), &device);

    let flat = batch.flat_images();
    assert_eq!(flat.dims(), [6, HEIGHT * WIDTH]);
    assert_eq!(
        batch.images.shape().num_elements(),
        flat.shape().num_elements()
    );
}

#[test]
fn classification_output_carries_a_finite_loss() {
    let device = Default::default();
    let model: Classifier<TestBackend> = ClassifierConfig::new().init(&device);
    let batch =
        Batcher::<TestBackend, _, _>::batch(&MnistBatcher::default(), synthetic_items(4), &device);

    let output = model.forward_classification(batch.flat_images(), batch.targets);
    assert_eq!(output.output.dims(), [4, NUM_CLASSES]);
    assert_eq!(output.loss.dims(), [1]);

    let loss: f32 = output.loss.into_scalar();
    assert!(loss.is_finite());
    assert!(loss > 0.0);
}

#[test]
fn predictions_are_class_indices() {
    let device = Default::default();
    let model: Classifier<TestBackend> = ClassifierConfig::new().init(&device);
    let batch =
        Batcher::<TestBackend, _, _>::batch(&MnistBatcher::default(), synthetic_items(9), &device);

    let predictions: Vec<i64> = model
        .predict(batch.flat_images())
        .into_data()
        .iter::<i64>()
        .collect();
    assert_eq!(predictions.len(), 9);
    assert!(predictions.iter().all(|p| (0..NUM_CLASSES as i64).contains(p)));
}

#[test]
fn main_backend_runs_on_its_default_device() {
    let device = <MainAutoBackend as Backend>::Device::default();
    let model: Classifier<MainAutoBackend> = ClassifierConfig::new().init(&device);

    let input = Tensor::<MainAutoBackend, 2>::zeros([2, HEIGHT * WIDTH], &device);
    assert_eq!(model.forward(input).dims(), [2, NUM_CLASSES]);
}
