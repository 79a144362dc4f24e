// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:            the epoch number (0-based)
//   - loss:             mean total loss over training batches
//   - supervised_loss:  mean cross-entropy part
//   - adversarial_loss: mean VAT consistency part
//   - train_acc:        running accuracy over the epoch's labelled batches
//   - test_acc:         held-out accuracy, empty on epochs without evaluation
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,loss,supervised_loss,adversarial_loss,train_acc,test_acc
//   0,2.412000,2.301000,0.111000,0.125000,0.101000
//   1,2.290100,2.204300,0.085800,0.187500,
//   ...

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    pub epoch:            usize,
    pub loss:             f64,
    pub supervised_loss:  f64,
    pub adversarial_loss: f64,
    pub train_acc:        f64,
    pub test_acc:         Option<f64>,
}

impl EpochMetrics {
    fn csv_row(&self) -> String {
        let test = self.test_acc.map(|a| format!("{a:.6}")).unwrap_or_default();
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{}",
            self.epoch,
            self.loss,
            self.supervised_loss,
            self.adversarial_loss,
            self.train_acc,
            test,
        )
    }
}

/// Appends epoch metrics to `{dir}/metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet,
    /// so repeated runs append to one log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,loss,supervised_loss,adversarial_loss,train_acc,test_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{}", m.csv_row())?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
