pub mod auth;
pub mod diagnostics;
pub mod email;
pub mod projects;
pub mod users;
