pub mod app;
pub mod db;
pub mod errors;
pub mod external;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
