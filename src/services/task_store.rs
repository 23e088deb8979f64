use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    progress_percentage, NewTask, PageInfo, PageSpec, SortDirection, SortField, SortSpec, Task,
    TaskFilters, TaskPage, TaskUpdate,
};

// In-memory task repository and query engine. The backing vector preserves
// insertion order; the stable sort in `query` relies on that for ties.
pub struct TaskStore {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn create(&self, new_task: NewTask) -> Task {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: new_task.title,
            status: new_task.status,
            priority: new_task.priority,
            is_completed: false,
            estimated_hours: new_task.estimated_hours,
            actual_hours: 0.0,
            progress_percentage: progress_percentage(new_task.estimated_hours, 0.0),
            description: new_task.description,
            created_at: now,
            updated_at: now,
            user_id: new_task.user_id,
        };

        self.tasks
            .write()
            .expect("task store lock poisoned")
            .push(task.clone());
        task
    }

    pub fn find_by_id(&self, id: &str) -> Option<Task> {
        self.tasks
            .read()
            .expect("task store lock poisoned")
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn find_by_user(&self, user_id: &str) -> Vec<Task> {
        self.tasks
            .read()
            .expect("task store lock poisoned")
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    // Apply the supplied fields and refresh updated_at. The progress
    // percentage is recomputed exactly when an hour field was supplied,
    // combining supplied values with the stored ones.
    pub fn update(&self, id: &str, update: TaskUpdate) -> Option<Task> {
        let mut tasks = self.tasks.write().expect("task store lock poisoned");
        let task = tasks.iter_mut().find(|t| t.id == id)?;

        let hours_changed = update.estimated_hours.is_some() || update.actual_hours.is_some();

        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(is_completed) = update.is_completed {
            task.is_completed = is_completed;
        }
        if let Some(estimated_hours) = update.estimated_hours {
            task.estimated_hours = estimated_hours;
        }
        if let Some(actual_hours) = update.actual_hours {
            task.actual_hours = actual_hours;
        }
        if let Some(description) = update.description {
            task.description = Some(description);
        }

        if hours_changed {
            task.progress_percentage =
                progress_percentage(task.estimated_hours, task.actual_hours);
        }
        task.updated_at = Utc::now();

        Some(task.clone())
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut tasks = self.tasks.write().expect("task store lock poisoned");
        match tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                tasks.remove(index);
                true
            }
            None => false,
        }
    }

    // The filter-sort-paginate pipeline. Ownership scoping comes first and
    // is not optional; every later step only narrows or orders within one
    // user's tasks. Pagination counters describe the filtered set, not the
    // returned slice.
    pub fn query(
        &self,
        user_id: &str,
        filters: &TaskFilters,
        sort: SortSpec,
        page: PageSpec,
    ) -> TaskPage {
        let tasks = self.tasks.read().expect("task store lock poisoned");
        let mut matched: Vec<&Task> = tasks.iter().filter(|t| t.user_id == user_id).collect();

        if let Some(status) = filters.status {
            matched.retain(|t| t.status == status);
        }
        if let Some(priority) = filters.priority {
            matched.retain(|t| t.priority == priority);
        }
        if let Some(is_completed) = filters.is_completed {
            matched.retain(|t| t.is_completed == is_completed);
        }
        if let Some(search) = filters.search.as_deref() {
            let needle = search.to_lowercase();
            matched.retain(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            });
        }

        // sort_by is stable, so ties keep their insertion order.
        matched.sort_by(|a, b| {
            let ordering = field_ordering(a, b, sort.field);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matched.len();
        let total_pages = if page.limit == 0 { 0 } else { total.div_ceil(page.limit) };
        let start = page.page.saturating_sub(1).saturating_mul(page.limit);
        let tasks = matched
            .into_iter()
            .skip(start)
            .take(page.limit)
            .cloned()
            .collect();

        TaskPage {
            tasks,
            pagination: PageInfo {
                page: page.page,
                limit: page.limit,
                total,
                total_pages,
            },
        }
    }
}

fn field_ordering(a: &Task, b: &Task, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::Priority => a.priority.as_str().cmp(b.priority.as_str()),
        SortField::IsCompleted => a.is_completed.cmp(&b.is_completed),
        SortField::EstimatedHours => float_ordering(a.estimated_hours, b.estimated_hours),
        SortField::ActualHours => float_ordering(a.actual_hours, b.actual_hours),
        SortField::ProgressPercentage => a.progress_percentage.cmp(&b.progress_percentage),
        // A task without a description compares equal to anything, so such
        // pairs keep their input order.
        SortField::Description => match (a.description.as_ref(), b.description.as_ref()) {
            (Some(left), Some(right)) => left.cmp(right),
            _ => Ordering::Equal,
        },
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::UserId => a.user_id.cmp(&b.user_id),
    }
}

// Hour fields are validated finite and non-negative at the boundary, so the
// incomparable case does not arise in practice.
fn float_ordering(left: f64, right: f64) -> Ordering {
    left.partial_cmp(&right).unwrap_or(Ordering::Equal)
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TaskStore {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
        }
    }
}
