mod common;

use burn::data::dataset::InMemDataset;
use burn::module::AutodiffModule;
use burn::prelude::*;
use common::{TestAutodiffBackend, TestBackend, synthetic_items, synthetic_items_in};
use digit_classifier::evaluation::{Accuracy, count_correct, evaluate};
use digit_classifier::model::{Classifier, ClassifierConfig, ModelConfigExt};
use digit_classifier::optim::optimizer_config;
use digit_classifier::training::{TrainingConfig, dataloader, train};

#[test]
fn held_out_accuracy_after_training_beats_chance() {
    let device = Default::default();
    let config = TrainingConfig::new(optimizer_config());
    let train_items = synthetic_items_in(0..800);
    let test_items = synthetic_items_in(800..1000);

    let model: Classifier<TestAutodiffBackend> = ClassifierConfig::new().init(&device);
    let model = train(&config, model, InMemDataset::new(train_items));

    let valid_model = model.valid();
    let loader = dataloader::<TestBackend, _>(InMemDataset::new(test_items), &config);
    let accuracy = evaluate(loader, &valid_model);

    assert_eq!(accuracy.num_samples, 200);
    assert!(
        accuracy.ratio() > 0.1,
        "accuracy at or below chance: {accuracy}"
    );
}

#[test]
fn evaluation_counts_every_sample_once() {
    let device = Default::default();
    let config = TrainingConfig::new(optimizer_config()).with_batch_size(16);
    let model: Classifier<TestBackend> = ClassifierConfig::new().init(&device);

    // 50 items do not divide into batches of 16
    let loader = dataloader::<TestBackend, _>(InMemDataset::new(synthetic_items(50)), &config);
    let accuracy = evaluate(loader, &model);

    assert_eq!(accuracy.num_samples, 50);
    assert!(accuracy.num_correct <= 50);
}

#[test]
fn counts_argmax_matches() {
    let device = Default::default();
    let scores = Tensor::<TestBackend, 2>::from_data(
        [[0.1, 0.9, 0.0], [2.0, -1.0, 0.5], [0.0, 0.2, 0.3]],
        &device,
    );
    let targets = Tensor::<TestBackend, 1, Int>::from_data([1, 2, 2], &device);

    assert_eq!(count_correct(scores, targets), 2);
}

#[test]
fn accuracy_display_matches_report_format() {
    let accuracy = Accuracy {
        num_correct: 9123,
        num_samples: 10000,
    };
    assert_eq!(accuracy.to_string(), "Got 9123 / 10000 with accuracy 91.23");
    assert!((accuracy.ratio() - 0.9123).abs() < 1e-12);
}

#[test]
fn empty_accuracy_is_zero() {
    let mut accuracy = Accuracy::default();
    assert_eq!(accuracy.ratio(), 0.0);

    accuracy.add(3, 4);
    accuracy.add(1, 4);
    assert_eq!(accuracy.num_correct, 4);
    assert_eq!(accuracy.num_samples, 8);
    assert_eq!(accuracy.percent(), 50.0);
}

#[test]
fn training_config_defaults() {
    let config = TrainingConfig::new(optimizer_config());
    assert_eq!(config.num_epochs, 1);
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.lr, 1e-3);
}
