pub mod checkout;
pub mod core;
pub mod db;
pub mod jobs;
pub mod models;
pub mod paintos_web_server;
pub mod routes;
