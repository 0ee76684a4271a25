pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod nutrition;
pub mod plans;
pub mod state;
pub mod store;
pub mod users;
