use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    #[serde(default = "default_registry_path")]
    pub registry_path: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    dataset_path: Option<String>,
    models_dir: Option<String>,
    registry_path: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_dataset_path() -> String {
    "data/car_price_prediction.csv".to_string()
}

fn default_models_dir() -> String {
    "data/fitted_models".to_string()
}

fn default_registry_path() -> String {
    "data/trained_models.json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            dataset_path: default_dataset_path(),
            models_dir: default_models_dir(),
            registry_path: default_registry_path(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                return Err(format!("Config file not found at {path:?}"));
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config = PartialServerConfig {
            listen_addr: env::var("LISTEN_ADDR").ok(),
            dataset_path: env::var("DATASET_PATH").ok(),
            models_dir: env::var("MODELS_DIR").ok(),
            registry_path: env::var("REGISTRY_PATH").ok(),
        };

        // 3. Merge: environment overrides file, file overrides defaults
        Ok(ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            dataset_path: env_config
                .dataset_path
                .or(file_config.dataset_path)
                .unwrap_or_else(default_dataset_path),
            models_dir: env_config
                .models_dir
                .or(file_config.models_dir)
                .unwrap_or_else(default_models_dir),
            registry_path: env_config
                .registry_path
                .or(file_config.registry_path)
                .unwrap_or_else(default_registry_path),
        })
    }
}
