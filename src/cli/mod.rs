// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `generate` — writes a synthetic corpus JSON
//   2. `train`    — trains the classifier with VAT
//   3. `eval`     — re-scores the latest checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs, GenerateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "rnn-vat",
    version,
    about = "Semi-supervised GRU sequence classification with virtual adversarial training."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Eval(args)     => run_eval(args),
            Commands::Generate(args) => run_generate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus: {}", args.data_path);

    let summary = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete after {} epochs. train {:.4} test {:.4} (best {:.4})",
        summary.epochs_run,
        summary.final_train_acc,
        summary.final_test_acc,
        summary.best_test_acc
    );
    Ok(())
}

fn run_eval(args: EvalArgs) -> Result<()> {
    use crate::application::eval_use_case::EvalUseCase;

    let use_case = EvalUseCase::new(
        args.checkpoint_dir,
        args.data_path,
        args.device.map(Into::into),
    );
    let report = use_case.execute()?;

    println!("test {:.4} ({}/{})", report.accuracy(), report.correct, report.total);
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let corpus = GenerateUseCase::new((&args).into(), &args.output).execute()?;
    println!(
        "Wrote {} labelled, {} unlabelled, {} test sequences to {}",
        corpus.labelled.len(),
        corpus.unlabelled.len(),
        corpus.test.len(),
        args.output
    );
    Ok(())
}
