pub mod auth;
pub mod configuration;
pub mod error;
pub mod logger;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod validators;
