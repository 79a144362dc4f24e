// ============================================================
// Layer 5 — Virtual Adversarial Training
// ============================================================
// VAT regularises a classifier f by making its prediction
// smooth in the direction the input is most sensitive to.
//
// 1. Clean logits f(x) are a fixed target (detached).
// 2. Power iteration estimates the worst-case direction d:
//      d ~ N(0, 1)
//      repeat k times:
//        d ← scale_l2(d, xi)
//        d ← ∂ KL(f(x) ‖ f(x + d)) / ∂d      (d detached afterwards)
// 3. The perturbation r = scale_l2(d, epsilon) is applied and the
//    consistency loss is KL(f(x) ‖ f(x + r)).
//
// Gradients reach the model parameters only through f(x + r).
//
// Reference: Miyato et al. (2018) Virtual Adversarial Training
//            Miyato et al. (2017) Adversarial Training Methods for
//            Semi-Supervised Text Classification

use burn::{
    prelude::*,
    tensor::{
        activation::{log_softmax, softmax},
        backend::AutodiffBackend,
        Distribution,
    },
};

#[derive(Config, Debug)]
pub struct VatConfig {
    /// Power-iteration rounds used to refine the direction
    #[config(default = 1)]
    pub num_power_iterations: usize,
    /// Finite-difference step size
    #[config(default = 0.1)]
    pub xi: f64,
    /// L2 norm of the final perturbation
    #[config(default = 5.0)]
    pub epsilon: f64,
}

/// Rescale each sample of `x` (every axis but the first) to L2 norm `norm`.
///
/// Dividing by the per-sample max first keeps the squared sum in range.
/// An all-zero sample stays all-zero.
pub fn scale_l2<B: Backend>(x: Tensor<B, 3>, norm: f64) -> Tensor<B, 3> {
    let dims = x.dims();
    let alpha = x
        .clone()
        .abs()
        .max_dim(2)
        .max_dim(1)
        .add_scalar(1e-12)
        .expand(dims);
    let scaled = x.div(alpha.clone());
    let l2 = scaled
        .clone()
        .powf_scalar(2.0)
        .sum_dim(2)
        .sum_dim(1)
        .add_scalar(1e-6)
        .sqrt()
        .expand(dims);
    // x / (alpha * l2) == (x / alpha) / l2
    scaled.div(l2).mul_scalar(norm)
}

/// Batch-mean KL(softmax(q_logits) ‖ softmax(p_logits)).
///
/// q_logits, p_logits: [batch, num_classes] → [1]
pub fn kl_divergence_with_logits<B: Backend>(
    q_logits: Tensor<B, 2>,
    p_logits: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let q = softmax(q_logits.clone(), 1);
    let per_sample = (q * (log_softmax(q_logits, 1) - log_softmax(p_logits, 1))).sum_dim(1);
    per_sample.mean()
}

/// Estimate the direction in input space that most increases
/// KL(clean_logits ‖ forward(inputs + d)).
///
/// The returned tensor carries no gradient history.
pub fn adversarial_direction<B, F>(
    forward:      F,
    inputs:       Tensor<B, 3>,
    clean_logits: Tensor<B, 2>,
    config:       &VatConfig,
) -> Tensor<B, 3>
where
    B: AutodiffBackend,
    F: Fn(Tensor<B, 3>) -> Tensor<B, 2>,
{
    let device = inputs.device();
    let inputs = inputs.detach();
    let target = clean_logits.detach();

    let mut d = Tensor::<B, 3>::random(inputs.dims(), Distribution::Normal(0.0, 1.0), &device);

    for _ in 0..config.num_power_iterations {
        let probe = scale_l2(d, config.xi).detach().require_grad();
        let perturbed = forward(inputs.clone() + probe.clone());
        let kl = kl_divergence_with_logits(target.clone(), perturbed);

        let grads = kl.backward();
        d = match probe.grad(&grads) {
            Some(g) => Tensor::from_inner(g),
            // The probe always feeds the forward pass; a missing
            // gradient means the model ignored its input entirely.
            None => probe.detach().zeros_like(),
        };
    }

    d.detach()
}

/// KL(clean_logits ‖ forward(inputs + epsilon · d̂)) where d̂ comes from
/// `adversarial_direction`. Differentiable w.r.t. the parameters used
/// inside `forward`, not w.r.t. `clean_logits`.
pub fn virtual_adversarial_loss<B, F>(
    forward:      F,
    inputs:       Tensor<B, 3>,
    clean_logits: Tensor<B, 2>,
    config:       &VatConfig,
) -> Tensor<B, 1>
where
    B: AutodiffBackend,
    F: Fn(Tensor<B, 3>) -> Tensor<B, 2>,
{
    let target = clean_logits.detach();
    let d = adversarial_direction(&forward, inputs.clone(), target.clone(), config);
    let perturb = scale_l2(d, config.epsilon);

    let adversarial_logits = forward(inputs.detach() + perturb);
    kl_divergence_with_logits(target, adversarial_logits)
}
