pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod recommendation;
pub mod repositories;
pub mod routes;
pub mod version;
