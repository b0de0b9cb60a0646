use crate::web::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// The regression algorithm families a caller can train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    RandomForestRegressor,
    LinearRegression,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::RandomForestRegressor, ModelKind::LinearRegression];

    pub fn parse(name: &str) -> Option<ModelKind> {
        match name {
            "RandomForestRegressor" => Some(ModelKind::RandomForestRegressor),
            "LinearRegression" => Some(ModelKind::LinearRegression),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForestRegressor => "RandomForestRegressor",
            ModelKind::LinearRegression => "LinearRegression",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted regressor, serialized wholesale to one file per model ID and
/// loaded back on demand. Never cached across requests.
#[derive(Debug, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>),
    Linear(LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::RandomForest(_) => ModelKind::RandomForestRegressor,
            TrainedModel::Linear(_) => ModelKind::LinearRegression,
        }
    }

    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>, AppError> {
        let predictions = match self {
            TrainedModel::RandomForest(model) => model.predict(x)?,
            TrainedModel::Linear(model) => model.predict(x)?,
        };
        Ok(predictions)
    }
}

/// Validates the hyperparameter names against the chosen kind and fits an
/// estimator built from defaults plus the validated overrides. The first
/// unrecognized key aborts before anything is fitted; no subset of the
/// parameters is ever applied.
pub fn fit(
    x: &DenseMatrix<f64>,
    y: &Vec<f64>,
    kind: ModelKind,
    model_params: &Map<String, Value>,
) -> Result<TrainedModel, AppError> {
    match kind {
        ModelKind::RandomForestRegressor => {
            let params = build_forest_params(kind, model_params)?;
            let model = RandomForestRegressor::fit(x, y, params)?;
            Ok(TrainedModel::RandomForest(model))
        }
        ModelKind::LinearRegression => {
            let params = build_linear_params(kind, model_params)?;
            let model = LinearRegression::fit(x, y, params)?;
            Ok(TrainedModel::Linear(model))
        }
    }
}

fn build_forest_params(
    kind: ModelKind,
    model_params: &Map<String, Value>,
) -> Result<RandomForestRegressorParameters, AppError> {
    let mut params = RandomForestRegressorParameters::default();
    for (key, value) in model_params {
        match key.as_str() {
            "n_trees" => params.n_trees = uint_value(key, value)? as _,
            "max_depth" => params.max_depth = Some(uint_value(key, value)? as _),
            "min_samples_leaf" => params.min_samples_leaf = uint_value(key, value)? as _,
            "min_samples_split" => params.min_samples_split = uint_value(key, value)? as _,
            "m" => params.m = Some(uint_value(key, value)? as _),
            "seed" => params.seed = uint_value(key, value)? as _,
            "keep_samples" => params.keep_samples = bool_value(key, value)?,
            _ => {
                return Err(AppError::InvalidHyperparameter {
                    model: kind,
                    param: key.clone(),
                });
            }
        }
    }
    Ok(params)
}

fn build_linear_params(
    kind: ModelKind,
    model_params: &Map<String, Value>,
) -> Result<LinearRegressionParameters, AppError> {
    let mut params = LinearRegressionParameters::default();
    for (key, value) in model_params {
        match key.as_str() {
            "solver" => {
                params.solver = match str_value(key, value)? {
                    "QR" => LinearRegressionSolverName::QR,
                    "SVD" => LinearRegressionSolverName::SVD,
                    other => {
                        return Err(AppError::InvalidInput(format!(
                            "Parameter solver must be \"QR\" or \"SVD\", got \"{other}\""
                        )));
                    }
                };
            }
            _ => {
                return Err(AppError::InvalidHyperparameter {
                    model: kind,
                    param: key.clone(),
                });
            }
        }
    }
    Ok(params)
}

fn uint_value(key: &str, value: &Value) -> Result<u64, AppError> {
    value.as_u64().ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Parameter {key} expects a non-negative integer, got {value}"
        ))
    })
}

fn bool_value(key: &str, value: &Value) -> Result<bool, AppError> {
    value.as_bool().ok_or_else(|| {
        AppError::InvalidInput(format!("Parameter {key} expects a boolean, got {value}"))
    })
}

fn str_value<'a>(key: &str, value: &'a Value) -> Result<&'a str, AppError> {
    value.as_str().ok_or_else(|| {
        AppError::InvalidInput(format!("Parameter {key} expects a string, got {value}"))
    })
}

pub fn model_path(models_dir: &Path, id_model: &str) -> PathBuf {
    models_dir.join(format!("{id_model}.bin"))
}

/// The persisted model file is the source of truth for whether an ID is
/// taken; the registry is not consulted.
pub fn exists(models_dir: &Path, id_model: &str) -> bool {
    model_path(models_dir, id_model).exists()
}

pub fn save(models_dir: &Path, id_model: &str, model: &TrainedModel) -> Result<(), AppError> {
    std::fs::create_dir_all(models_dir)?;
    let bytes = bincode::serialize(model)
        .map_err(|e| AppError::Internal(format!("Failed to serialize model {id_model}: {e}")))?;
    std::fs::write(model_path(models_dir, id_model), bytes)?;
    Ok(())
}

pub fn load(models_dir: &Path, id_model: &str) -> Result<TrainedModel, AppError> {
    let path = model_path(models_dir, id_model);
    let bytes = std::fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::UnknownModelId(id_model.to_string())
        } else {
            AppError::Storage(format!("Failed to read model at {}: {e}", path.display()))
        }
    })?;
    bincode::deserialize(&bytes).map_err(|e| {
        AppError::Storage(format!("Model file at {} is corrupt: {e}", path.display()))
    })
}

pub fn delete(models_dir: &Path, id_model: &str) -> Result<(), AppError> {
    let path = model_path(models_dir, id_model);
    std::fs::remove_file(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::UnknownModelId(id_model.to_string())
        } else {
            AppError::Storage(format!("Failed to delete model at {}: {e}", path.display()))
        }
    })
}
