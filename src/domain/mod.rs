pub mod auth;
pub mod diagnostics;
pub mod project;
pub mod request;
pub mod user;
