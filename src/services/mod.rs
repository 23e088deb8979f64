mod auth;
mod task_store;
mod user_store;

pub use auth::AuthService;
pub use task_store::TaskStore;
pub use user_store::UserStore;
