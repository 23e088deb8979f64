pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Config;
use crate::errors::AppResult;
use crate::services::{AuthService, TaskStore, UserStore};

// Application state shared between handlers. All members are cheap handles
// onto the same underlying data.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub tasks: TaskStore,
    pub auth: AuthService,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        Ok(Self {
            users: UserStore::new(),
            tasks: TaskStore::new(),
            auth: AuthService::new(&config.auth)?,
            config,
        })
    }
}

// Create the router with all routes, the session middleware, and the
// request body cap.
pub fn app(state: AppState) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        // Auth routes
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::current_user))
        // Task routes
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Add middleware
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        // Add state
        .with_state(state)
}
