pub mod api;
pub mod cache;

pub use api::ApiClient;
pub use cache::{SessionCache, SessionSource, SessionStore, SESSION_CACHE_TTL};
