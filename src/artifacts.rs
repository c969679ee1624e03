//! Serialized model artifacts shared by the trainer and the service.
//!
//! A model directory holds both regressors, the fitted encoder and the
//! canonical post-encoding feature list. Everything is JSON.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::encoding::{EncodingError, OneHotEncoder};
use crate::ml::gbdt::{GbdtError, GbdtRegressor};

pub const TIME_MODEL_FILE_NAME: &str = "time_model.json";
pub const COST_MODEL_FILE_NAME: &str = "cost_model.json";
pub const ENCODER_FILE_NAME: &str = "encoder.json";
pub const MODEL_FEATURES_FILE_NAME: &str = "model_features.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize {name}: {source}")]
    Serialize {
        name: &'static str,
        source: serde_json::Error,
    },
    #[error("{name}: {source}")]
    Model {
        name: &'static str,
        source: GbdtError,
    },
    #[error("encoder: {0}")]
    Encoder(#[from] EncodingError),
    #[error("{name} expects features {found:?} but model_features lists {expected:?}")]
    FeatureMismatch {
        name: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Everything the prediction pipeline loads at startup.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub time_model: GbdtRegressor,
    pub cost_model: GbdtRegressor,
    pub encoder: OneHotEncoder,
    /// Canonical column order of every feature row.
    pub model_features: Vec<String>,
}

impl ModelArtifacts {
    /// Load and cross-check all artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let time_model = load_model(&dir.join(TIME_MODEL_FILE_NAME), "time model")?;
        let cost_model = load_model(&dir.join(COST_MODEL_FILE_NAME), "cost model")?;
        let encoder: OneHotEncoder = read_json(&dir.join(ENCODER_FILE_NAME))?;
        let model_features: Vec<String> = read_json(&dir.join(MODEL_FEATURES_FILE_NAME))?;
        let artifacts = Self {
            time_model,
            cost_model,
            encoder,
            model_features,
        };
        artifacts.validate()?;
        tracing::debug!(
            dir = %dir.display(),
            features = artifacts.model_features.len(),
            time_trees = artifacts.time_model.trees.len(),
            cost_trees = artifacts.cost_model.trees.len(),
            "Loaded model artifacts"
        );
        Ok(artifacts)
    }

    /// Write all artifacts into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<(), ArtifactError> {
        std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        self.time_model
            .save_json(&dir.join(TIME_MODEL_FILE_NAME))
            .map_err(|source| ArtifactError::Model {
                name: "time model",
                source,
            })?;
        self.cost_model
            .save_json(&dir.join(COST_MODEL_FILE_NAME))
            .map_err(|source| ArtifactError::Model {
                name: "cost model",
                source,
            })?;
        write_json(&dir.join(ENCODER_FILE_NAME), "encoder", &self.encoder)?;
        write_json(
            &dir.join(MODEL_FEATURES_FILE_NAME),
            "model features",
            &self.model_features,
        )
    }

    /// Both models must be structurally sound and index the same columns as
    /// `model_features`.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        self.encoder.validate()?;
        for (name, model) in [("time model", &self.time_model), ("cost model", &self.cost_model)] {
            model
                .validate()
                .map_err(|source| ArtifactError::Model { name, source })?;
            if model.feature_names != self.model_features {
                return Err(ArtifactError::FeatureMismatch {
                    name,
                    expected: self.model_features.clone(),
                    found: model.feature_names.clone(),
                });
            }
        }
        Ok(())
    }
}

fn load_model(path: &Path, name: &'static str) -> Result<GbdtRegressor, ArtifactError> {
    GbdtRegressor::load_json(path).map_err(|source| ArtifactError::Model { name, source })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(
    path: &Path,
    name: &'static str,
    value: &T,
) -> Result<(), ArtifactError> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|source| ArtifactError::Serialize { name, source })?;
    std::fs::write(path, bytes).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}
