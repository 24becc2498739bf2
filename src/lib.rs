pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod extensions;
pub mod repository;
pub mod routes;
pub mod service;
