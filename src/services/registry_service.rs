use crate::services::model_service::ModelKind;
use crate::web::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One registry entry: what was trained under an ID and with which
/// hyperparameters. The fitted object itself lives in its own file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name_model: ModelKind,
    pub model_params: Map<String, Value>,
}

pub type Registry = BTreeMap<String, RegistryEntry>;

/// Reads the whole persisted registry. A missing file is an empty registry.
pub fn list(path: &Path) -> Result<Registry, AppError> {
    if !path.exists() {
        return Ok(Registry::new());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| AppError::Storage(format!("Failed to read registry at {}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| AppError::Storage(format!("Registry at {} is corrupt: {e}", path.display())))
}

/// Inserts or overwrites an entry. Whole-document read-modify-write, no
/// locking; concurrent writers can lose updates.
pub fn put(path: &Path, id_model: &str, entry: RegistryEntry) -> Result<(), AppError> {
    let mut registry = list(path)?;
    registry.insert(id_model.to_string(), entry);
    write(path, &registry)
}

/// Removes an entry if present. Callers gate on the model file, not on the
/// registry, so an absent ID is not an error here.
pub fn remove(path: &Path, id_model: &str) -> Result<(), AppError> {
    let mut registry = list(path)?;
    registry.remove(id_model);
    write(path, &registry)
}

fn write(path: &Path, registry: &Registry) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_json::to_string(registry)?;
    fs::write(path, contents)
        .map_err(|e| AppError::Storage(format!("Failed to write registry at {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(kind: ModelKind, pairs: &[(&str, Value)]) -> RegistryEntry {
        RegistryEntry {
            name_model: kind,
            model_params: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = list(&dir.path().join("trained_models.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_put_list_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trained_models.json");

        let forest = entry(
            ModelKind::RandomForestRegressor,
            &[("n_trees", json!(50))],
        );
        put(&path, "1", forest.clone()).unwrap();
        put(&path, "2", entry(ModelKind::LinearRegression, &[])).unwrap();

        let registry = list(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry["1"], forest);

        remove(&path, "1").unwrap();
        let registry = list(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains_key("1"));
    }

    #[test]
    fn test_put_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trained_models.json");

        put(&path, "1", entry(ModelKind::LinearRegression, &[])).unwrap();
        let updated = entry(ModelKind::LinearRegression, &[("solver", json!("SVD"))]);
        put(&path, "1", updated.clone()).unwrap();

        let registry = list(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry["1"], updated);
    }

    #[test]
    fn test_remove_absent_id_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trained_models.json");

        put(&path, "1", entry(ModelKind::LinearRegression, &[])).unwrap();
        remove(&path, "99").unwrap();
        assert_eq!(list(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_registry_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trained_models.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(list(&path).unwrap_err(), AppError::Storage(_)));
    }
}
