use burn::{
    nn::{Linear, LinearConfig, Relu, loss::CrossEntropyLossConfig},
    prelude::*,
    train::ClassificationOutput,
};

pub trait ModelConfigExt<B: Backend>: Config {
    type Model: Module<B>;
    fn init(&self, device: &B::Device) -> Self::Model;
}

/// Two fully-connected layers with a ReLU in between.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// Flattened image size.
    #[config(default = 784)]
    pub input_size: usize,
    #[config(default = 50)]
    pub hidden_size: usize,
    #[config(default = 10)]
    pub num_classes: usize,
}

#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub fc1: Linear<B>,
    pub activation: Relu,
    pub fc2: Linear<B>,
}

impl<B: Backend> ModelConfigExt<B> for ClassifierConfig {
    type Model = Classifier<B>;

    /// Returns the initialized model.
    fn init(&self, device: &B::Device) -> Self::Model {
        let fc1 = LinearConfig::new(self.input_size, self.hidden_size)
            .with_bias(true)
            .init(device);
        let fc2 = LinearConfig::new(self.hidden_size, self.num_classes)
            .with_bias(true)
            .init(device);
        Classifier {
            fc1,
            activation: Relu::new(),
            fc2,
        }
    }
}

impl<B: Backend> Classifier<B> {
    /// # Shapes
    ///   - Input [batch_size, input_size]
    ///   - Output [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);
        self.fc2.forward(x)
    }

    pub fn num_classes(&self) -> usize {
        let [_hidden_size, num_classes] = self.fc2.weight.dims();
        num_classes
    }

    /// Scores the flattened images and computes the cross-entropy loss against `targets`.
    pub fn forward_classification(
        &self,
        images: Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let [batch_size, _input_size] = images.dims();
        assert_eq!([batch_size], targets.dims());

        let output = self.forward(images);
        assert_eq!([batch_size, self.num_classes()], output.dims());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput::new(loss, output, targets)
    }

    /// Index of the highest score per row.
    ///
    /// # Shapes
    ///   - Input [batch_size, input_size]
    ///   - Output [batch_size]
    pub fn predict(&self, images: Tensor<B, 2>) -> Tensor<B, 1, Int> {
        let [batch_size, _input_size] = images.dims();
        self.forward(images).argmax(1).reshape([batch_size])
    }
}
