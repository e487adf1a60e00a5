use crate::model::Classifier;
use burn::prelude::*;
use burn::{
    optim::{Adam, AdamConfig, Optimizer, adaptor::OptimizerAdaptor},
    tensor::backend::AutodiffBackend,
};

/// Optimizer configs able to drive a [`Classifier`] on an autodiff backend.
pub trait ClassifierOptimConfig<AutoB: AutodiffBackend>: Config {
    type Optimizer: Optimizer<Classifier<AutoB>, AutoB>;
    fn init_optimizer(&self) -> Self::Optimizer;
}

impl<AutoB: AutodiffBackend> ClassifierOptimConfig<AutoB> for AdamConfig {
    type Optimizer = OptimizerAdaptor<Adam, Classifier<AutoB>, AutoB>;

    fn init_optimizer(&self) -> Self::Optimizer {
        self.init()
    }
}

/// Plain Adam: no weight decay, no gradient clipping.
pub fn optimizer_config() -> AdamConfig {
    AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-8)
}
