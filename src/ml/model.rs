use burn::{
    nn::{loss::CrossEntropyLossConfig, Linear, LinearConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::ml::gru::{GruEncoder, GruEncoderConfig};
use crate::ml::vat::{virtual_adversarial_loss, VatConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RnnClassifierConfig {
    pub input_dim:   usize,
    pub num_classes: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
    /// 1 - state keep probability
    #[config(default = 0.1)]
    pub state_dropout: f64,
}

impl RnnClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnClassifier<B> {
        let encoder = GruEncoderConfig::new(self.input_dim, self.hidden_size)
            .with_state_dropout(self.state_dropout)
            .init(device);
        let head = LinearConfig::new(self.hidden_size, self.num_classes).init(device);
        RnnClassifier { encoder, head }
    }
}

#[derive(Module, Debug)]
pub struct RnnClassifier<B: Backend> {
    pub encoder: GruEncoder<B>,
    pub head:    Linear<B>,
}

/// Everything one training step produces.
pub struct TrainStepOutput<B: Backend> {
    /// supervised + adversarial, the tensor to back-propagate
    pub loss:        Tensor<B, 1>,
    pub supervised:  Tensor<B, 1>,
    pub adversarial: Tensor<B, 1>,
    /// Logits of the labelled rows only — [labelled, num_classes]
    pub logits:      Tensor<B, 2>,
}

impl<B: Backend> RnnClassifier<B> {
    /// inputs: [batch, seq_len, input_dim] → logits: [batch, num_classes]
    pub fn forward(&self, inputs: Tensor<B, 3>) -> Tensor<B, 2> {
        self.head.forward(self.encoder.forward(inputs))
    }

    pub fn forward_training(
        &self,
        inputs:     Tensor<B, 3>,
        targets:    Tensor<B, 1, Int>,
        unlabelled: Option<Tensor<B, 3>>,
        vat:        &VatConfig,
    ) -> TrainStepOutput<B>
    where
        B: AutodiffBackend,
    {
        let [labelled, _, _] = inputs.dims();

        // One clean forward over labelled + unlabelled rows.
        let all_inputs = match unlabelled {
            Some(extra) => Tensor::cat(vec![inputs, extra], 0),
            None        => inputs,
        };
        let all_logits = self.forward(all_inputs.clone());
        let [total, num_classes] = all_logits.dims();

        let logits = all_logits.clone().slice([0..labelled, 0..num_classes]);
        let supervised = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);

        let adversarial = virtual_adversarial_loss(
            |x| self.forward(x),
            all_inputs,
            all_logits,
            vat,
        );

        tracing::trace!("step: {} labelled of {} rows", labelled, total);

        TrainStepOutput {
            loss: supervised.clone() + adversarial.clone(),
            supervised,
            adversarial,
            logits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{Autodiff, NdArray},
        optim::{AdamConfig, GradientsParams, Optimizer},
    };

    type TestBackend  = NdArray;
    type TestAutodiff = Autodiff<NdArray>;

    fn config() -> RnnClassifierConfig {
        RnnClassifierConfig::new(3, 4).with_hidden_size(8)
    }

    #[test]
    fn test_logits_shape() {
        let device = Default::default();
        let model: RnnClassifier<TestBackend> = config().init(&device);
        let x = Tensor::<TestBackend, 3>::ones([5, 7, 3], &device);
        assert_eq!(model.forward(x).dims(), [5, 4]);
    }

    #[test]
    fn test_training_step_losses() {
        let device = Default::default();
        let model: RnnClassifier<TestAutodiff> = config().init(&device);
        let x = Tensor::<TestAutodiff, 3>::random([4, 5, 3], burn::tensor::Distribution::Default, &device);
        let y = Tensor::<TestAutodiff, 1, Int>::from_ints([0, 1, 2, 3], &device);
        let u = Tensor::<TestAutodiff, 3>::random([6, 5, 3], burn::tensor::Distribution::Default, &device);

        let out = model.forward_training(x, y, Some(u), &VatConfig::new());

        // Cross-entropy only covers the labelled rows
        assert_eq!(out.logits.dims(), [4, 4]);

        let sup: f32 = out.supervised.clone().into_scalar().elem::<f32>();
        let adv: f32 = out.adversarial.clone().into_scalar().elem::<f32>();
        let total: f32 = out.loss.clone().into_scalar().elem::<f32>();
        assert!(sup > 0.0);
        assert!(adv >= 0.0);
        assert!((total - (sup + adv)).abs() < 1e-4);
    }

    /// With a zero-norm perturbation the adversarial term adds nothing,
    /// so the head gradient must equal the cross-entropy gradient alone.
    fn assert_head_grad_matches_cross_entropy(num_power_iterations: usize) {
        let device = Default::default();
        let model: RnnClassifier<TestAutodiff> = config().with_state_dropout(0.0).init(&device);

        let x = Tensor::<TestAutodiff, 3>::random([3, 4, 3], burn::tensor::Distribution::Default, &device);
        let y = Tensor::<TestAutodiff, 1, Int>::from_ints([0, 2, 3], &device);
        let u = Tensor::<TestAutodiff, 3>::random([2, 4, 3], burn::tensor::Distribution::Default, &device);

        let vat = VatConfig::new()
            .with_num_power_iterations(num_power_iterations)
            .with_epsilon(0.0);
        let out   = model.forward_training(x.clone(), y.clone(), Some(u), &vat);
        let grads = out.loss.backward();
        let combined: Vec<f32> = model.head.weight.val().grad(&grads)
            .expect("head weight gradient")
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        let ce = CrossEntropyLossConfig::new()
            .init(&device)
            .forward(model.forward(x), y);
        let grads = ce.backward();
        let supervised: Vec<f32> = model.head.weight.val().grad(&grads)
            .expect("head weight gradient")
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        assert_eq!(combined.len(), supervised.len());
        assert!(supervised.iter().any(|g| g.abs() > 1e-6));
        for (a, b) in combined.iter().zip(&supervised) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn test_supervised_gradient_without_power_iterations() {
        assert_head_grad_matches_cross_entropy(0);
    }

    #[test]
    fn test_supervised_gradient_survives_power_iterations() {
        assert_head_grad_matches_cross_entropy(3);
    }

    #[test]
    fn test_optimizer_step_changes_parameters() {
        let device = Default::default();
        let model: RnnClassifier<TestAutodiff> = config().init(&device);
        let mut optim = AdamConfig::new().init();

        let x = Tensor::<TestAutodiff, 3>::ones([2, 3, 3], &device);
        let y = Tensor::<TestAutodiff, 1, Int>::from_ints([1, 2], &device);

        let before: Vec<f32> = model.head.weight.val().inner().into_data().to_vec::<f32>().unwrap();

        let out   = model.forward_training(x, y, None, &VatConfig::new());
        let grads = GradientsParams::from_grads(out.loss.backward(), &model);
        let model = optim.step(1e-2, model, grads);

        let after: Vec<f32> = model.head.weight.val().inner().into_data().to_vec::<f32>().unwrap();
        assert_ne!(before, after);
    }
}
