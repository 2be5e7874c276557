//! Server-side HTML rendering with Handlebars.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Handlebars escapes every `{{value}}`, so user input is safe to echo back.

use axum_helpers::errors::validation_details;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

use crate::entity;
use crate::error::{TaskError, TaskResult};
use crate::models::{SortDirection, SortField, Task, TaskFilter, TaskForm, TaskQuery};

const PARTIALS: [(&str, &str); 3] = [
    ("header", include_str!("../templates/partials/header.hbs")),
    ("footer", include_str!("../templates/partials/footer.hbs")),
    ("task_form", include_str!("../templates/partials/task_form.hbs")),
];

const TEMPLATES: [(&str, &str); 5] = [
    ("index", include_str!("../templates/index.hbs")),
    ("create", include_str!("../templates/create.hbs")),
    ("edit", include_str!("../templates/edit.hbs")),
    ("delete", include_str!("../templates/delete.hbs")),
    ("details", include_str!("../templates/details.hbs")),
];

const SORT_COLUMNS: [(SortField, &str); 3] = [
    (SortField::Title, "Title"),
    (SortField::Status, "Status"),
    (SortField::DueDate, "Due Date"),
];

/// Display shape of a task row
#[derive(Serialize)]
struct TaskRow<'a> {
    id: i32,
    title: &'a str,
    description: Option<&'a str>,
    complete: bool,
    status: String,
    due_date: Option<String>,
}

impl<'a> From<&'a Task> for TaskRow<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id,
            title: &task.title,
            description: task.description.as_deref(),
            complete: task.completion_status.is_complete(),
            status: task.completion_status.to_string(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

/// Pre-registered Handlebars views for the task pages
pub struct TaskViews {
    handlebars: Handlebars<'static>,
}

impl TaskViews {
    pub fn new() -> TaskResult<Self> {
        let mut handlebars = Handlebars::new();

        for (name, source) in PARTIALS {
            handlebars.register_partial(name, source).map_err(|e| {
                TaskError::Internal(format!("Failed to register partial {}: {}", name, e))
            })?;
        }

        for (name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| {
                    TaskError::Internal(format!("Failed to register template {}: {}", name, e))
                })?;
        }

        Ok(Self { handlebars })
    }

    fn render(&self, name: &str, data: &Value) -> TaskResult<String> {
        Ok(self.handlebars.render(name, data)?)
    }

    /// Task list with filter controls and sortable column headers
    pub fn index(&self, tasks: &[Task], query: &TaskQuery, csrf_token: &str) -> TaskResult<String> {
        let filter = query.to_filter();
        let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();

        let columns: Vec<Value> = SORT_COLUMNS
            .iter()
            .map(|(field, label)| {
                json!({
                    "label": label,
                    "href": sort_href(&filter, *field),
                    "active": filter.sort.is_some_and(|s| s.field == *field),
                })
            })
            .collect();

        self.render(
            "index",
            &json!({
                "page_title": "Tasks",
                "csrf_token": csrf_token,
                "tasks": rows,
                "columns": columns,
                "status_filter": filter.status.map(|s| s.to_string()),
            }),
        )
    }

    /// Empty or re-displayed create form
    pub fn create(
        &self,
        form: &TaskForm,
        errors: Option<&ValidationErrors>,
        csrf_token: &str,
    ) -> TaskResult<String> {
        self.render(
            "create",
            &form_context("Create Task", entity::Model::URL.to_string(), form, errors, csrf_token),
        )
    }

    /// Edit form for task `id`
    pub fn edit(
        &self,
        id: i32,
        form: &TaskForm,
        errors: Option<&ValidationErrors>,
        csrf_token: &str,
    ) -> TaskResult<String> {
        self.render(
            "edit",
            &form_context(
                "Edit Task",
                format!("{}/{}", entity::Model::URL, id),
                form,
                errors,
                csrf_token,
            ),
        )
    }

    /// Delete confirmation page
    pub fn delete(&self, task: &Task, csrf_token: &str) -> TaskResult<String> {
        self.render(
            "delete",
            &json!({
                "page_title": "Delete Task",
                "csrf_token": csrf_token,
                "task": TaskRow::from(task),
            }),
        )
    }

    /// Detail fragment, rendered without the page layout
    pub fn details(&self, task: &Task) -> TaskResult<String> {
        self.render("details", &json!({ "task": TaskRow::from(task) }))
    }
}

fn form_context(
    page_title: &str,
    action: String,
    form: &TaskForm,
    errors: Option<&ValidationErrors>,
    csrf_token: &str,
) -> Value {
    json!({
        "page_title": page_title,
        "csrf_token": csrf_token,
        "action": action,
        "form": form,
        "complete": matches!(form.completion_status.as_deref(), Some("true" | "on")),
        "errors": errors.map(validation_details).unwrap_or_else(|| json!({})),
    })
}

/// Link for a column header: ascending first, flipping to descending when
/// the column is already sorted ascending. The status filter is preserved.
fn sort_href(filter: &TaskFilter, field: SortField) -> String {
    let direction = match filter.sort {
        Some(s) if s.field == field && s.direction == SortDirection::Asc => SortDirection::Desc,
        _ => SortDirection::Asc,
    };

    let mut href = format!(
        "{}?sortProperty={}&sortDirection={}",
        entity::Model::URL,
        field,
        direction
    );
    if let Some(status) = filter.status {
        href.push_str(&format!("&statusFilter={}", status));
    }
    href
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionStatus, TaskSort};
    use chrono::NaiveDate;
    use validator::ValidationError;

    fn views() -> TaskViews {
        TaskViews::new().unwrap()
    }

    fn task(id: i32, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: Some("notes".into()),
            completion_status: CompletionStatus::Complete,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 14)
                .unwrap()
                .and_hms_opt(18, 30, 0),
        }
    }

    #[test]
    fn test_index_lists_tasks_and_escapes_titles() {
        let html = views()
            .index(
                &[task(1, "<script>alert(1)</script>"), task(2, "Laundry")],
                &TaskQuery::default(),
                "tok123",
            )
            .unwrap();

        assert!(html.contains("Laundry"));
        assert!(html.contains("2025-02-14 18:30"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("tok123"));
    }

    #[test]
    fn test_create_form_echoes_input_and_errors() {
        let form = TaskForm {
            title: String::new(),
            description: Some("keep me".into()),
            due_date: Some("garbage".into()),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        errors.add(
            "title",
            ValidationError::new("required").with_message("The Title field is required.".into()),
        );

        let html = views().create(&form, Some(&errors), "tok").unwrap();
        assert!(html.contains("keep me"));
        assert!(html.contains("garbage"));
        assert!(html.contains("The Title field is required."));
        assert!(html.contains(r#"action="/tasks""#));
    }

    #[test]
    fn test_edit_form_posts_to_task_url() {
        let t = task(4, "Edit me");
        let html = views().edit(4, &TaskForm::from(&t), None, "tok").unwrap();
        assert!(html.contains(r#"action="/tasks/4""#));
        assert!(html.contains(r#"value="2025-02-14T18:30""#));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_delete_and_details() {
        let t = task(9, "Old task");
        let html = views().delete(&t, "tok").unwrap();
        assert!(html.contains(r#"action="/tasks/9/delete""#));

        let fragment = views().details(&t).unwrap();
        assert!(fragment.contains("Old task"));
        assert!(!fragment.contains("<html"));
    }

    #[test]
    fn test_sort_href_flips_direction_and_keeps_filter() {
        let filter = TaskFilter {
            status: Some(CompletionStatus::Complete),
            sort: Some(TaskSort {
                field: SortField::Title,
                direction: SortDirection::Asc,
            }),
        };

        assert_eq!(
            sort_href(&filter, SortField::Title),
            "/tasks?sortProperty=Title&sortDirection=desc&statusFilter=Complete"
        );
        assert_eq!(
            sort_href(&filter, SortField::DueDate),
            "/tasks?sortProperty=DueDate&sortDirection=asc&statusFilter=Complete"
        );
    }
}
