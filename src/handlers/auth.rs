use axum::{extract::State, http::StatusCode, response::Json, Extension};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};

use crate::errors::{AppError, AppResult};
use crate::handlers::ApiJson;
use crate::middleware::AUTH_COOKIE;
use crate::models::{LoginRequest, RegisterRequest, UserSummary};
use crate::AppState;

// The cookie lives exactly as long as the token it carries.
const COOKIE_MAX_AGE_DAYS: i64 = 7;

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS))
        .same_site(SameSite::Strict)
        .build()
}

fn clearing_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::ZERO)
        .same_site(SameSite::Strict)
        .build()
}

// Shared by register and login; both refuse blank credentials with the
// same message.
fn required_credentials(
    username: Option<String>,
    password: Option<String>,
) -> AppResult<(String, String)> {
    match (username, password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Ok((username, password))
        }
        _ => Err(AppError::Validation(
            "Username and password are required".to_string(),
        )),
    }
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<Value>)> {
    let (username, password) = required_credentials(body.username, body.password)?;

    if username.chars().count() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters long".to_string(),
        ));
    }
    if password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let password_hash = state.auth.hash_password(&password)?;
    // The store re-checks uniqueness under its write lock; a concurrent
    // registration of the same name loses with the same 409.
    let user = state.users.create(&username, &password_hash)?;
    tracing::info!("Registered user {} ({})", user.username, user.id);

    let summary = user.summary();
    let token = state.auth.issue_token(&summary)?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(json!({ "message": "User created successfully", "user": summary })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<Value>)> {
    let (username, password) = required_credentials(body.username, body.password)?;
    tracing::debug!("Login attempt for user: {}", username);

    let user = match state.users.find_by_username(&username) {
        Some(user) => user,
        None => {
            // Burn a verification anyway so unknown usernames and wrong
            // passwords take the same time to refuse.
            state.auth.verify_dummy(&password);
            tracing::info!("Login failed for {}: unknown username", username);
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }
    };

    if !state.auth.verify_password(&password, &user.password_hash) {
        tracing::info!("Login failed for {}: wrong password", username);
        return Err(AppError::Authentication(
            "Invalid username or password".to_string(),
        ));
    }

    let summary = user.summary();
    let token = state.auth.issue_token(&summary)?;
    tracing::info!("Login successful for {}", summary.username);

    Ok((
        jar.add(session_cookie(token)),
        Json(json!({ "message": "Login successful", "user": summary })),
    ))
}

#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(clearing_cookie()),
        Json(json!({ "message": "Logged out" })),
    )
}

// Resolves the caller against the store rather than trusting the claims
// alone, so a token for a vanished user stops working.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(caller): Extension<UserSummary>,
) -> AppResult<Json<Value>> {
    let user = state
        .users
        .find_by_id(&caller.id)
        .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

    Ok(Json(json!({ "user": user.summary() })))
}
