use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};

use crate::errors::AppError;

mod auth;
mod task;

pub use auth::{current_user, login, logout, register};
pub use task::{create_task, delete_task, get_task, list_tasks, update_task};

// Json with the rejection folded into the error taxonomy: a malformed or
// mistyped body answers 400 {"error": ...} like every other validation
// failure instead of axum's default 422.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::Validation(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}

// Query gets the same fold: its default rejection is a plain-text 400,
// which would break the {"error": ...} body shape.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(AppError::Validation(format!(
                "Invalid query string: {}",
                rejection.body_text()
            ))),
        }
    }
}
