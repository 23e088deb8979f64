use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::errors::{AppError, AppResult};
use crate::models::{Task, UserSummary};
use crate::AppState;

// Name of the session cookie carrying the signed token.
pub const AUTH_COOKIE: &str = "auth-token";

// Paths reachable without a session.
fn is_public(path: &str) -> bool {
    matches!(
        path,
        "/api/auth/register" | "/api/auth/login" | "/api/auth/logout"
    )
}

// Resolves the caller for every protected route. A missing, malformed, or
// expired token gets the same 401; handlers behind this layer can rely on a
// UserSummary extension being present.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    let caller = jar
        .get(AUTH_COOKIE)
        .and_then(|cookie| state.auth.validate_token(cookie.value()));

    match caller {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => AppError::Authentication("Not authenticated".to_string()).into_response(),
    }
}

// Ownership check. Task-scoped handlers call this after the existence
// lookup and before touching the record, so a foreign task answers 403
// while an absent one stays a 404.
pub fn ensure_owner(task: &Task, caller: &UserSummary) -> AppResult<()> {
    if task.user_id == caller.id {
        Ok(())
    } else {
        Err(AppError::Authorization("Access denied".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn task_owned_by(user_id: &str) -> Task {
        Task {
            id: "t1".to_string(),
            title: "Write report".to_string(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            is_completed: false,
            estimated_hours: 4.0,
            actual_hours: 0.0,
            progress_percentage: 0,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: user_id.to_string(),
        }
    }

    #[test]
    fn owner_passes_stranger_is_denied() {
        let caller = UserSummary {
            id: "user_1".to_string(),
            username: "alice".to_string(),
        };

        assert!(ensure_owner(&task_owned_by("user_1"), &caller).is_ok());

        let err = ensure_owner(&task_owned_by("user_2"), &caller).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
        assert_eq!(err.to_string(), "Access denied");
    }

    #[test]
    fn only_the_auth_endpoints_skip_the_session_check() {
        assert!(is_public("/api/auth/register"));
        assert!(is_public("/api/auth/login"));
        assert!(is_public("/api/auth/logout"));
        assert!(!is_public("/api/auth/me"));
        assert!(!is_public("/api/tasks"));
        assert!(!is_public("/api/tasks/abc"));
    }
}
