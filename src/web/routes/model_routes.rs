use crate::services::{dataset_service, model_service, registry_service};
use crate::services::model_service::ModelKind;
use crate::services::registry_service::RegistryEntry;
use crate::web::models::{FitModelRequest, ModelIdQuery};
use crate::web::{AppError, AppState};
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{delete, get, post},
};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// --- Route Handlers ---

async fn all_available_models_handler() -> Json<String> {
    let names: Vec<&str> = ModelKind::ALL.iter().map(|kind| kind.as_str()).collect();
    Json(format!(
        "Available regression models for training: {}",
        names.join(", ")
    ))
}

async fn all_trained_models_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let registry = registry_service::list(Path::new(&app_state.config.registry_path))?;
    if registry.is_empty() {
        Ok(Json(Value::String(
            "No trained models available".to_string(),
        )))
    } else {
        Ok(Json(serde_json::to_value(registry)?))
    }
}

async fn fit_model_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<FitModelRequest>,
) -> Result<Json<Value>, AppError> {
    let kind = ModelKind::parse(&payload.name_model)
        .ok_or_else(|| AppError::UnknownModelKind(payload.name_model.clone()))?;
    let model_params = parse_model_params(payload.model_params.as_deref())?;

    // Uniqueness is decided by the persisted model file, not the registry.
    if model_service::exists(Path::new(&app_state.config.models_dir), &payload.id_model) {
        return Err(AppError::DuplicateModelId(payload.id_model));
    }

    let config = app_state.config.clone();
    let params_for_fit = model_params.clone();
    let trained = tokio::task::spawn_blocking(move || {
        let (x, y) = dataset_service::load_dataset(Path::new(&config.dataset_path))?;
        model_service::fit(&x, &y, kind, &params_for_fit)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Fit task failed: {e}")))??;

    model_service::save(
        Path::new(&app_state.config.models_dir),
        &payload.id_model,
        &trained,
    )?;
    // No rollback of the model file if this write fails.
    registry_service::put(
        Path::new(&app_state.config.registry_path),
        &payload.id_model,
        RegistryEntry {
            name_model: kind,
            model_params,
        },
    )?;

    info!(
        id_model = %payload.id_model,
        name_model = %kind,
        "Model trained and persisted."
    );
    Ok(Json(Value::String("Model trained successfully".to_string())))
}

async fn predict_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ModelIdQuery>,
) -> Result<Json<Value>, AppError> {
    if !model_service::exists(Path::new(&app_state.config.models_dir), &query.id_model) {
        return Err(AppError::UnknownModelId(query.id_model));
    }

    let config = app_state.config.clone();
    let id_model = query.id_model.clone();
    let predictions = tokio::task::spawn_blocking(move || {
        let (x, _) = dataset_service::load_dataset(Path::new(&config.dataset_path))?;
        let model = model_service::load(Path::new(&config.models_dir), &id_model)?;
        model.predict(&x)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Predict task failed: {e}")))??;

    // Predictions are presented as integers.
    let rounded: Vec<i64> = predictions.iter().map(|p| *p as i64).collect();
    info!(
        id_model = %query.id_model,
        rows = rounded.len(),
        "Served predictions."
    );

    let mut body = Map::new();
    body.insert(
        format!("ID = {}", query.id_model),
        serde_json::to_value(rounded)?,
    );
    Ok(Json(Value::Object(body)))
}

async fn delete_model_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ModelIdQuery>,
) -> Result<Json<Value>, AppError> {
    let models_dir = Path::new(&app_state.config.models_dir);
    if !model_service::exists(models_dir, &query.id_model) {
        return Err(AppError::UnknownModelId(query.id_model));
    }

    registry_service::remove(
        Path::new(&app_state.config.registry_path),
        &query.id_model,
    )?;
    model_service::delete(models_dir, &query.id_model)?;

    info!(id_model = %query.id_model, "Model deleted.");
    Ok(Json(Value::String(format!(
        "Model with ID = {} deleted",
        query.id_model
    ))))
}

/// Accepts a JSON-ish object string where single quotes are tolerated,
/// e.g. `{'n_trees': 100}`.
fn parse_model_params(raw: Option<&str>) -> Result<Map<String, Value>, AppError> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    let normalized = trimmed.replace('\'', "\"");
    let value: Value = serde_json::from_str(&normalized)
        .map_err(|e| AppError::InvalidInput(format!("model_params is not valid JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InvalidInput(format!(
            "model_params must be a JSON object, got {other}"
        ))),
    }
}

// --- Router ---

pub fn model_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all_available_models", get(all_available_models_handler))
        .route("/all_trained_models", get(all_trained_models_handler))
        .route("/fit_model", post(fit_model_handler))
        .route("/predict", get(predict_handler))
        .route("/delete_model", delete(delete_model_handler))
}
