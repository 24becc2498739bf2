pub mod accounts;
pub mod projects;
pub mod sessions;
pub mod users;
