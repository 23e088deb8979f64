mod forms;
mod task;
mod user;

pub use forms::{
    CreateTaskRequest, ListTasksQuery, LoginRequest, RegisterRequest, UpdateTaskRequest,
};
pub use task::{
    progress_percentage, NewTask, PageInfo, PageSpec, SortDirection, SortField, SortSpec, Task,
    TaskFilters, TaskPage, TaskPriority, TaskStatus, TaskUpdate,
};
pub use user::{User, UserSummary};
