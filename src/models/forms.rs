use serde::Deserialize;

// Request bodies deserialize every field as optional so that missing or
// empty values can be answered with the contract's own messages instead of
// a deserializer rejection.

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub is_completed: Option<bool>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub description: Option<String>,
}

// List query parameters arrive as raw strings; the handler validates and
// converts them so a bad value gets a 400 rather than a silent default.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub is_completed: Option<String>,
    pub search: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
}
