use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;
use digit_classifier::{
    Result,
    backend::MainAutoBackend,
    cli::AppArgs,
    evaluation, mnist, optim, plot,
    model::{Classifier, ClassifierConfig, ModelConfigExt},
    training::{self, TrainingConfig},
};
use std::sync::Arc;

pub fn launch<AutoB: AutodiffBackend>(app_args: &AppArgs) -> Result<()> {
    app_args.create_artifact_dir()?;

    let device = AutoB::Device::default();
    println!("{device:?}");

    // setup training and model configs
    let training_config = app_args
        .load_training_config()?
        .unwrap_or_else(|| TrainingConfig::new(optim::optimizer_config()));
    let model_config = app_args
        .load_model_config()?
        .unwrap_or_else(ClassifierConfig::new);
    // save configs
    app_args.save_training_config(&training_config)?;
    app_args.save_model_config(&model_config)?;

    // load data
    let dataset_train = mnist::MnistDataset::train(&app_args.dataset_path)?;
    let dataset_test = Arc::new(mnist::MnistDataset::test(&app_args.dataset_path)?);

    // training
    let model: Classifier<AutoB> = model_config.init(&device);
    let model = training::train(&training_config, model, dataset_train);
    app_args.save_model::<AutoB>(&model)?;

    // testing
    let valid_model = model.valid();
    let dataloader_test = training::dataloader::<AutoB::InnerBackend, _>(
        Arc::clone(&dataset_test),
        &training_config,
    );
    let accuracy = evaluation::evaluate(dataloader_test, &valid_model);
    println!("{accuracy}");

    // sample predictions
    if app_args.plot {
        let dataloader_test = training::dataloader::<AutoB::InnerBackend, _>(
            Arc::clone(&dataset_test),
            &training_config,
        );
        let samples = plot::predict_samples(dataloader_test, &valid_model, plot::NUM_SAMPLES);
        for sample in &samples {
            println!("{sample}");
        }
        plot::save_grid(&samples, 4, &app_args.samples_path())?;
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = AppArgs::parse().and_then(|app_args| launch::<MainAutoBackend>(&app_args));
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
