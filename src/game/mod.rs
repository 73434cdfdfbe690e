pub mod cleanup;
pub mod db;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod results;
pub mod session;
