use crate::error::{Error, Result};
use crate::training::TrainingConfig;
use burn::prelude::*;
use burn::record::{CompactRecorder, FileRecorder};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub type RecorderTy = CompactRecorder;

pub const HELP: &str = "\
Digit Classifier

Trains a two-layer fully-connected classifier on MNIST for one epoch, prints the
test accuracy and renders a few sample predictions.

USAGE:
    digit-classifier [OPTIONS]

BEHAVIOR OVERVIEW
- The dataset is downloaded on first use and cached under the dataset path.
- The training and model configs are loaded from --training-config / --model-config if given,
  else from the artifacts directory if present there, else defaults are used.
  The configs in use are then saved to the artifacts directory.
- The trained model is saved to the artifacts directory.
- Sample predictions are rendered to <artifacts>/samples.png.

FLAGS:
    -h, --help                  Show this help message and exit
        --no-plot               Skip rendering the sample predictions

OPTIONS:
    -d, --dataset-path <PATH>   Dataset cache directory [default: dataset]
    -a, --artifacts-path <PATH>
                                Directory where configurations and model weights are saved and loaded.
                                If the directory does not exist, it will be created.
                                Defaults to a newly created temporary directory (path will be printed).
    -c, --training-config <PATH>
                                Load training configuration from this file
    -m, --model-config <PATH>   Load model configuration from this file
";

pub const DEFAULT_DATASET_PATH: &str = "dataset";
pub const TRAINING_CONFIG_NAME: &str = "training_config";
pub const MODEL_CONFIG_NAME: &str = "model_config";
pub const MODEL_NAME: &str = "model";
pub const SAMPLES_NAME: &str = "samples";

#[derive(Debug)]
pub struct AppArgs {
    pub dataset_path: PathBuf,
    pub artifacts_path: PathBuf,
    pub training_config: Option<PathBuf>,
    pub model_config: Option<PathBuf>,
    pub plot: bool,
}

impl AppArgs {
    pub fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            println!("{}", HELP);
            std::process::exit(0);
        }

        Self::from_args(pargs)
    }

    pub fn from_args(mut pargs: pico_args::Arguments) -> Result<Self> {
        let artifacts_path =
            match pargs.opt_value_from_os_str(["-a", "--artifacts-path"], parse_path)? {
                Some(path) => path,
                None => {
                    // e.g. /tmp/digit-classifier-abcd-0
                    let name = format!("{}-", std::env!("CARGO_PKG_NAME"));
                    let tmp = temp_dir::TempDir::with_prefix(name)
                        .map_err(|e| Error::io(std::env::temp_dir(), e))?
                        .dont_delete_on_drop();
                    let path = tmp.path().to_path_buf();
                    println!("new artifacts directory: {path:?}");
                    path
                }
            };

        let args = AppArgs {
            dataset_path: pargs
                .opt_value_from_os_str(["-d", "--dataset-path"], parse_path)?
                .unwrap_or_else(|| DEFAULT_DATASET_PATH.into()),
            artifacts_path,
            training_config: pargs
                .opt_value_from_os_str(["-c", "--training-config"], parse_path)?,
            model_config: pargs.opt_value_from_os_str(["-m", "--model-config"], parse_path)?,
            // must parse flags after values
            plot: !pargs.contains("--no-plot"),
        };

        let remaining: Vec<OsString> = pargs.finish();
        if !remaining.is_empty() {
            return Err(Error::UnusedArgs(remaining));
        }

        Ok(args)
    }

    pub fn create_artifact_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.artifacts_path)
            .map_err(|e| Error::io(&self.artifacts_path, e))
    }

    pub fn samples_path(&self) -> PathBuf {
        self.artifacts_path.join(SAMPLES_NAME).with_extension("png")
    }

    pub fn save_training_config(&self, training_config: &impl Config) -> Result<()> {
        let path = self
            .artifacts_path
            .join(TRAINING_CONFIG_NAME)
            .with_extension("json");
        save_config(&path, training_config)
    }

    /// The explicit `--training-config` file must exist; the artifacts one is optional.
    pub fn load_training_config(&self) -> Result<Option<TrainingConfig>> {
        let artifact = self.artifacts_path.join(TRAINING_CONFIG_NAME).with_extension("json");
        let explicit = self.training_config.as_deref();
        let Some(config) = load_explicit_or_artifact::<TrainingConfig>(explicit, &artifact)? else {
            return Ok(None);
        };
        config.validate().map_err(|reason| Error::Config {
            path: explicit.unwrap_or(&artifact).to_path_buf(),
            reason,
        })?;
        Ok(Some(config))
    }

    pub fn save_model_config(&self, model_config: &impl Config) -> Result<()> {
        let path = self.artifacts_path.join(MODEL_CONFIG_NAME).with_extension("json");
        save_config(&path, model_config)
    }

    pub fn load_model_config<C: Config>(&self) -> Result<Option<C>> {
        load_explicit_or_artifact(
            self.model_config.as_deref(),
            &self.artifacts_path.join(MODEL_CONFIG_NAME).with_extension("json"),
        )
    }

    pub fn save_model<B: Backend>(&self, model: &impl Module<B>) -> Result<()> {
        save_model::<B>(&self.artifacts_path, model)
    }
}

fn parse_path(s: &std::ffi::OsStr) -> std::result::Result<PathBuf, &'static str> {
    Ok(s.into())
}

fn load_explicit_or_artifact<C: Config>(
    explicit: Option<&Path>,
    artifact: &Path,
) -> Result<Option<C>> {
    match explicit {
        Some(path) => load_config(path)?
            .map(Some)
            .ok_or_else(|| Error::Config {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            }),
        None => load_config(artifact),
    }
}

pub fn save_config(path: &Path, config: &impl Config) -> Result<()> {
    log::info!("saving config into {path:?}");
    config.save(path).map_err(|e| Error::io(path, e))
}

/// `Ok(None)` if the file doesn't exist.
pub fn load_config<C: Config>(path: &Path) -> Result<Option<C>> {
    if !path.exists() {
        return Ok(None);
    }
    log::info!("loading config from {path:?}");
    C::load(path).map(Some).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: format!("{e:?}"),
    })
}

pub fn save_model<B: Backend>(artifact_dir: &Path, model: &impl Module<B>) -> Result<()> {
    let path = artifact_dir.join(MODEL_NAME);
    let file_ext = <RecorderTy as FileRecorder<B>>::file_extension();
    log::info!("saving model to {:?}", path.with_extension(file_ext));
    model.clone().save_file(path, &RecorderTy::new())?; // ext added automatically
    Ok(())
}

pub fn load_model<B: Backend, M: Module<B>>(
    artifact_dir: &Path,
    model_init: M,
    device: &B::Device,
) -> Result<M> {
    let path = artifact_dir.join(MODEL_NAME);
    log::info!("loading model from {path:?}");
    Ok(model_init.load_file(path, &RecorderTy::new(), device)?)
}
