use serde::Deserialize;

// --- Request Structs ---

#[derive(Deserialize, Debug)]
pub struct FitModelRequest {
    /// Caller-chosen unique ID for the trained model, e.g. "13".
    pub id_model: String,
    /// One of "RandomForestRegressor" or "LinearRegression".
    pub name_model: String,
    /// Optional JSON-ish object string, e.g. `{'n_trees': 100}`. Single
    /// quotes are tolerated.
    #[serde(default)]
    pub model_params: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ModelIdQuery {
    pub id_model: String,
}
