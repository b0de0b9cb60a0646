pub mod dataset_service;
pub mod model_service;
pub mod registry_service;
