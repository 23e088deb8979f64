use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::errors::{AppError, AppResult};
use crate::handlers::{ApiJson, ApiQuery};
use crate::middleware::ensure_owner;
use crate::models::{
    CreateTaskRequest, ListTasksQuery, NewTask, PageSpec, SortDirection, SortField, SortSpec,
    Task, TaskFilters, TaskPage, TaskPriority, TaskStatus, TaskUpdate, UpdateTaskRequest,
    UserSummary,
};
use crate::AppState;

// List requests default to the first page of eight tasks.
const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 8;

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<UserSummary>,
    ApiQuery(params): ApiQuery<ListTasksQuery>,
) -> AppResult<Json<TaskPage>> {
    let (filters, sort, page) = parse_list_params(params)?;

    let result = state.tasks.query(&caller.id, &filters, sort, page);
    tracing::debug!(
        "Listed {} of {} tasks for user {}",
        result.tasks.len(),
        result.pagination.total,
        caller.id
    );

    Ok(Json(result))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(caller): Extension<UserSummary>,
    ApiJson(body): ApiJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    // Presence first, with one combined message; value checks follow.
    let title = body.title.filter(|v| !v.is_empty());
    let raw_status = body.status.filter(|v| !v.is_empty());
    let raw_priority = body.priority.filter(|v| !v.is_empty());

    let (Some(title), Some(raw_status), Some(raw_priority), Some(estimated_hours)) =
        (title, raw_status, raw_priority, body.estimated_hours)
    else {
        return Err(AppError::Validation(
            "Title, status, priority, and estimated hours are required".to_string(),
        ));
    };

    let status = parse_status(&raw_status)?;
    let priority = parse_priority(&raw_priority)?;
    if estimated_hours < 0.0 {
        return Err(AppError::Validation(
            "Estimated hours must be non-negative".to_string(),
        ));
    }

    let task = state.tasks.create(NewTask {
        title,
        status,
        priority,
        estimated_hours,
        description: body.description,
        user_id: caller.id.clone(),
    });
    tracing::info!("Created task {} for user {}", task.id, caller.id);

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(caller): Extension<UserSummary>,
    Path(id): Path<String>,
) -> AppResult<Json<Task>> {
    let task = state.tasks.find_by_id(&id).ok_or_else(|| {
        tracing::warn!("Task not found: {}", id);
        AppError::NotFound("Task not found".to_string())
    })?;
    ensure_owner(&task, &caller)?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(caller): Extension<UserSummary>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateTaskRequest>,
) -> AppResult<Json<Task>> {
    let task = state.tasks.find_by_id(&id).ok_or_else(|| {
        tracing::warn!("Task not found: {}", id);
        AppError::NotFound("Task not found".to_string())
    })?;
    ensure_owner(&task, &caller)?;

    let update = validate_update(body)?;
    let updated = state
        .tasks
        .update(&id, update)
        .ok_or_else(|| AppError::Internal(format!("Task {} vanished during update", id)))?;
    tracing::info!("Updated task {} for user {}", id, caller.id);

    Ok(Json(updated))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<UserSummary>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let task = state.tasks.find_by_id(&id).ok_or_else(|| {
        tracing::warn!("Task not found: {}", id);
        AppError::NotFound("Task not found".to_string())
    })?;
    ensure_owner(&task, &caller)?;

    if !state.tasks.delete(&id) {
        return Err(AppError::Internal(format!(
            "Task {} vanished during delete",
            id
        )));
    }
    tracing::info!("Deleted task {} for user {}", id, caller.id);

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

// Helper function to turn the raw query strings into typed query parts
// An empty parameter counts as absent; a present bad value is a 400
fn parse_list_params(params: ListTasksQuery) -> AppResult<(TaskFilters, SortSpec, PageSpec)> {
    let page = parse_positive(non_empty(params.page), DEFAULT_PAGE, "page")?;
    let limit = parse_positive(non_empty(params.limit), DEFAULT_LIMIT, "limit")?;

    let status = non_empty(params.status)
        .map(|v| parse_status(&v))
        .transpose()?;
    let priority = non_empty(params.priority)
        .map(|v| parse_priority(&v))
        .transpose()?;
    let is_completed = non_empty(params.is_completed)
        .map(|v| parse_bool_param(&v))
        .transpose()?;
    let search = non_empty(params.search);

    let field = match non_empty(params.sort_field) {
        None => SortField::CreatedAt,
        Some(raw) => SortField::parse(&raw)
            .ok_or_else(|| AppError::Validation("Invalid sort field".to_string()))?,
    };
    let direction = match non_empty(params.sort_direction) {
        None => SortDirection::Desc,
        Some(raw) => SortDirection::parse(&raw)
            .ok_or_else(|| AppError::Validation("Invalid sort direction".to_string()))?,
    };

    Ok((
        TaskFilters {
            status,
            priority,
            is_completed,
            search,
        },
        SortSpec { field, direction },
        PageSpec { page, limit },
    ))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_positive(raw: Option<String>, default: usize, name: &str) -> AppResult<usize> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(AppError::Validation(format!(
                "{} must be a positive integer",
                name
            ))),
        },
    }
}

fn parse_status(raw: &str) -> AppResult<TaskStatus> {
    TaskStatus::parse(raw).ok_or_else(|| AppError::Validation("Invalid status value".to_string()))
}

fn parse_priority(raw: &str) -> AppResult<TaskPriority> {
    TaskPriority::parse(raw)
        .ok_or_else(|| AppError::Validation("Invalid priority value".to_string()))
}

// Helper function to parse boolean query parameters
// Converts "true"/"false" strings to boolean values
fn parse_bool_param(raw: &str) -> AppResult<bool> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::Validation(
            "isCompleted must be 'true' or 'false'".to_string(),
        )),
    }
}

// Helper function to check an update body field by field
// Absent fields pass through as None; present ones must carry valid values
fn validate_update(body: UpdateTaskRequest) -> AppResult<TaskUpdate> {
    let status = body.status.as_deref().map(parse_status).transpose()?;
    let priority = body.priority.as_deref().map(parse_priority).transpose()?;

    if body.estimated_hours.is_some_and(|hours| hours < 0.0) {
        return Err(AppError::Validation(
            "Estimated hours must be non-negative".to_string(),
        ));
    }
    if body.actual_hours.is_some_and(|hours| hours < 0.0) {
        return Err(AppError::Validation(
            "Actual hours must be non-negative".to_string(),
        ));
    }

    Ok(TaskUpdate {
        title: body.title,
        status,
        priority,
        is_completed: body.is_completed,
        estimated_hours: body.estimated_hours,
        actual_hours: body.actual_hours,
        description: body.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListTasksQuery {
        let mut params = ListTasksQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "status" => params.status = value,
                "priority" => params.priority = value,
                "isCompleted" => params.is_completed = value,
                "search" => params.search = value,
                "sortField" => params.sort_field = value,
                "sortDirection" => params.sort_direction = value,
                other => panic!("unknown key {}", other),
            }
        }
        params
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let (filters, sort, page) = parse_list_params(ListTasksQuery::default()).unwrap();

        assert!(filters.status.is_none());
        assert!(filters.search.is_none());
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 8);
    }

    #[test]
    fn empty_parameters_count_as_absent() {
        let (filters, sort, page) = parse_list_params(query(&[
            ("page", ""),
            ("status", ""),
            ("search", ""),
            ("sortField", ""),
        ]))
        .unwrap();

        assert_eq!(page.page, 1);
        assert!(filters.status.is_none());
        assert!(filters.search.is_none());
        assert_eq!(sort.field, SortField::CreatedAt);
    }

    #[test]
    fn given_parameters_are_parsed() {
        let (filters, sort, page) = parse_list_params(query(&[
            ("page", "3"),
            ("limit", "25"),
            ("status", "in_progress"),
            ("priority", "urgent"),
            ("isCompleted", "false"),
            ("search", "report"),
            ("sortField", "estimatedHours"),
            ("sortDirection", "asc"),
        ]))
        .unwrap();

        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 25);
        assert_eq!(filters.status, Some(TaskStatus::InProgress));
        assert_eq!(filters.priority, Some(TaskPriority::Urgent));
        assert_eq!(filters.is_completed, Some(false));
        assert_eq!(filters.search.as_deref(), Some("report"));
        assert_eq!(sort.field, SortField::EstimatedHours);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn bad_parameters_are_refused() {
        assert!(parse_list_params(query(&[("page", "0")])).is_err());
        assert!(parse_list_params(query(&[("page", "-2")])).is_err());
        assert!(parse_list_params(query(&[("limit", "abc")])).is_err());
        assert!(parse_list_params(query(&[("status", "doing")])).is_err());
        assert!(parse_list_params(query(&[("isCompleted", "banana")])).is_err());
        assert!(parse_list_params(query(&[("sortField", "owner")])).is_err());
        assert!(parse_list_params(query(&[("sortDirection", "sideways")])).is_err());
    }

    #[test]
    fn update_validation_refuses_bad_values() {
        let err = validate_update(UpdateTaskRequest {
            status: Some("doing".to_string()),
            ..UpdateTaskRequest::default()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status value");

        let err = validate_update(UpdateTaskRequest {
            actual_hours: Some(-1.0),
            ..UpdateTaskRequest::default()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Actual hours must be non-negative");
    }

    #[test]
    fn update_validation_passes_fields_through() {
        let update = validate_update(UpdateTaskRequest {
            title: Some("New title".to_string()),
            status: Some("done".to_string()),
            is_completed: Some(true),
            estimated_hours: Some(0.0),
            ..UpdateTaskRequest::default()
        })
        .unwrap();

        assert_eq!(update.title.as_deref(), Some("New title"));
        assert_eq!(update.status, Some(TaskStatus::Done));
        assert_eq!(update.is_completed, Some(true));
        assert_eq!(update.estimated_hours, Some(0.0));
        assert!(update.actual_hours.is_none());
        assert!(update.priority.is_none());
    }
}
