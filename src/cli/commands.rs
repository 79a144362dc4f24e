// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `eval` and `generate`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::{DeviceKind, TrainConfig};
use crate::data::synthetic::SyntheticConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the GRU classifier with virtual adversarial training
    Train(TrainArgs),

    /// Evaluate the latest checkpoint on the test split
    Eval(EvalArgs),

    /// Write a synthetic corpus to disk
    Generate(GenerateArgs),
}

/// Backend selection on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceArg {
    Wgpu,
    Cpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Wgpu => DeviceKind::Wgpu,
            DeviceArg::Cpu  => DeviceKind::Cpu,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Corpus JSON (see `generate`)
    #[arg(long, default_value = "data/semi_supervised.json")]
    pub data_path: String,

    /// Directory for checkpoints, configs and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 10)]
    pub num_classes: usize,

    /// GRU state size
    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    /// Probability of keeping each hidden unit after a GRU step
    #[arg(long, default_value_t = 0.9)]
    pub state_keep_prob: f64,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Power iterations used to estimate the adversarial direction
    #[arg(long, default_value_t = 1)]
    pub num_power_iterations: usize,

    /// Finite-difference step for the power iteration
    #[arg(long, default_value_t = 0.1)]
    pub xi: f64,

    /// Norm of the adversarial perturbation
    #[arg(long, default_value_t = 5.0)]
    pub epsilon: f64,

    /// Every gradient value is clipped to [-clip, clip]
    #[arg(long, default_value_t = 1.0)]
    pub grad_clip: f32,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1000)]
    pub eval_batch_size: usize,

    #[arg(long, default_value_t = 10000)]
    pub epochs: usize,

    /// Evaluate and checkpoint every N epochs (epoch 0 included)
    #[arg(long, default_value_t = 200)]
    pub eval_every: usize,

    /// Drop the first and last step of every sequence
    #[arg(long)]
    pub trim_edges: bool,

    /// Keep only this many labelled samples; the rest become unlabelled
    #[arg(long)]
    pub labelled_count: Option<usize>,

    /// Ignore the unlabelled pool (VAT on labelled inputs only)
    #[arg(long)]
    pub no_unlabelled: bool,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = DeviceArg::Wgpu)]
    pub device: DeviceArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:            a.data_path,
            checkpoint_dir:       a.checkpoint_dir,
            num_classes:          a.num_classes,
            hidden_size:          a.hidden_size,
            state_keep_prob:      a.state_keep_prob,
            learning_rate:        a.lr,
            num_power_iterations: a.num_power_iterations,
            xi:                   a.xi,
            epsilon:              a.epsilon,
            grad_clip:            a.grad_clip,
            batch_size:           a.batch_size,
            eval_batch_size:      a.eval_batch_size,
            epochs:               a.epochs,
            eval_every:           a.eval_every,
            trim_edges:           a.trim_edges,
            labelled_count:       a.labelled_count,
            use_unlabelled:       !a.no_unlabelled,
            seed:                 a.seed,
            device:               a.device.into(),
        }
    }
}

/// All arguments for the `eval` command
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Corpus to evaluate on; defaults to the one used for training
    #[arg(long)]
    pub data_path: Option<String>,

    /// Defaults to the device used for training
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,
}

/// All arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long, default_value = "data/semi_supervised.json")]
    pub output: String,

    #[arg(long, default_value_t = 10)]
    pub num_classes: usize,

    #[arg(long, default_value_t = 30)]
    pub seq_len: usize,

    #[arg(long, default_value_t = 30)]
    pub input_dim: usize,

    #[arg(long, default_value_t = 100)]
    pub labelled: usize,

    #[arg(long, default_value_t = 1000)]
    pub unlabelled: usize,

    #[arg(long, default_value_t = 1000)]
    pub test: usize,

    /// Std-dev of the Gaussian noise around each class prototype
    #[arg(long, default_value_t = 0.5)]
    pub noise: f32,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<&GenerateArgs> for SyntheticConfig {
    fn from(a: &GenerateArgs) -> Self {
        SyntheticConfig {
            num_classes:      a.num_classes,
            seq_len:          a.seq_len,
            input_dim:        a.input_dim,
            labelled_count:   a.labelled,
            unlabelled_count: a.unlabelled,
            test_count:       a.test,
            noise:            a.noise,
            seed:             a.seed,
        }
    }
}
