use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Define task status enum
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

// A task as stored and as serialized on the wire. Field names follow the
// JSON contract (camelCase); an absent description is omitted entirely.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub is_completed: bool,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub progress_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

// Derived completion ratio: actual over estimated hours as a rounded
// percentage, capped at 100. A zero estimate pins the progress to zero.
pub fn progress_percentage(estimated_hours: f64, actual_hours: f64) -> u8 {
    if estimated_hours > 0.0 {
        (actual_hours / estimated_hours * 100.0).round().min(100.0) as u8
    } else {
        0
    }
}

// Fields a caller supplies when creating a task. The generated fields
// (id, timestamps, progress, completion flag) are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: f64,
    pub description: Option<String>,
    pub user_id: String,
}

// Partial update: absent fields keep their current value. The immutable
// fields (id, user_id, created_at) have no counterpart here at all.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub is_completed: Option<bool>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub is_completed: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Status,
    Priority,
    IsCompleted,
    EstimatedHours,
    ActualHours,
    ProgressPercentage,
    Description,
    CreatedAt,
    UpdatedAt,
    UserId,
}

impl SortField {
    // Accepts the wire-format (camelCase) field names.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "status" => Some(Self::Status),
            "priority" => Some(Self::Priority),
            "isCompleted" => Some(Self::IsCompleted),
            "estimatedHours" => Some(Self::EstimatedHours),
            "actualHours" => Some(Self::ActualHours),
            "progressPercentage" => Some(Self::ProgressPercentage),
            "description" => Some(Self::Description),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "userId" => Some(Self::UserId),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

// Newest first unless the caller says otherwise.
impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub page: usize,   // 1-indexed
    pub limit: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self { page: 1, limit: 8 }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: PageInfo,
}
