// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. Model weights (model_epoch_{n}.mpk) — all learned parameters
//   2. latest_epoch.json                   — which epoch was last saved
//   3. train_config.json                   — run hyperparameters
//   4. model_config.json                   — architecture (Burn Config)
//
// The model must be rebuilt with the exact architecture before
// its record can be loaded, so both configs are written before
// the first epoch runs.
//
// File naming convention:
//   checkpoints/
//     model_epoch_0.mpk
//     model_epoch_200.mpk
//     ...
//     latest_epoch.json
//     train_config.json
//     model_config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{RnnClassifier, RnnClassifierConfig};

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, making the directory if needed (`mkdir -p`).
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights for `epoch` and point latest_epoch.json at it.
    pub fn save_model<B: Backend>(&self, model: &RnnClassifier<B>, epoch: usize) -> Result<()> {
        // Recorder adds the file extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load weights from the latest checkpoint into `model`.
    /// `model` must have been built from the saved model config.
    pub fn load_model<B: Backend>(
        &self,
        model:  RnnClassifier<B>,
        device: &B::Device,
    ) -> Result<RnnClassifier<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'eval'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_model_config(&self, cfg: &RnnClassifierConfig) -> Result<()> {
        let path = self.dir.join("model_config.json");
        cfg.save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;
        Ok(())
    }

    pub fn load_model_config(&self) -> Result<RnnClassifierConfig> {
        let path = self.dir.join("model_config.json");
        RnnClassifierConfig::load(&path).map_err(|e| {
            anyhow::anyhow!("Cannot read model config from '{}': {e:?}", path.display())
        })
    }

    /// Epoch number stored in latest_epoch.json.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_epoch.json'. Have you run 'train' first?")?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
