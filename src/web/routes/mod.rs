pub mod model_routes;
