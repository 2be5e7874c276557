use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// Accepted `datetime-local` layouts, with and without seconds
const DUE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Rejects empty and whitespace-only titles
fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(
            ValidationError::new("required").with_message("The Title field is required.".into())
        );
    }
    Ok(())
}

/// Two-state completion flag, persisted as a boolean
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
pub enum CompletionStatus {
    #[default]
    Incomplete,
    Complete,
}

impl CompletionStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Incomplete => Self::Complete,
            Self::Complete => Self::Incomplete,
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

impl From<bool> for CompletionStatus {
    fn from(complete: bool) -> Self {
        if complete {
            Self::Complete
        } else {
            Self::Incomplete
        }
    }
}

impl From<CompletionStatus> for bool {
    fn from(status: CompletionStatus) -> Self {
        status.is_complete()
    }
}

/// A task item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Store-assigned identifier
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completion_status: CompletionStatus,
    pub due_date: Option<NaiveDateTime>,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(length(
        max = 60,
        message = "The Description field must be at most 60 characters."
    ))]
    pub description: Option<String>,
    #[serde(default)]
    pub completion_status: CompletionStatus,
    pub due_date: Option<NaiveDateTime>,
}

/// Complete replacement state for an existing task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTask {
    /// Must equal the id of the task being replaced
    pub id: i32,
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(length(
        max = 60,
        message = "The Description field must be at most 60 characters."
    ))]
    pub description: Option<String>,
    #[serde(default)]
    pub completion_status: CompletionStatus,
    pub due_date: Option<NaiveDateTime>,
}

impl Task {
    /// Overwrite every mutable field with `update`
    pub fn replace_with(&mut self, update: UpdateTask) {
        self.title = update.title;
        self.description = update.description;
        self.completion_status = update.completion_status;
        self.due_date = update.due_date;
    }
}

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum SortField {
    Title,
    Status,
    DueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Parsed list criteria. `None` means no filter or the natural (id) order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<CompletionStatus>,
    pub sort: Option<TaskSort>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| s == task.completion_status)
    }
}

/// Raw list query string.
///
/// Values are matched exactly; anything unrecognized is ignored rather than
/// rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskQuery {
    /// `Complete` or `Incomplete`
    pub status_filter: Option<String>,
    /// `Title`, `Status` or `DueDate`
    pub sort_property: Option<String>,
    /// `asc` or `desc`
    pub sort_direction: Option<String>,
}

impl TaskQuery {
    pub fn to_filter(&self) -> TaskFilter {
        let status = self
            .status_filter
            .as_deref()
            .and_then(|s| s.parse::<CompletionStatus>().ok());

        let field = self
            .sort_property
            .as_deref()
            .and_then(|s| s.parse::<SortField>().ok());
        let direction = self
            .sort_direction
            .as_deref()
            .and_then(|s| s.parse::<SortDirection>().ok());

        let sort = match (field, direction) {
            (Some(field), Some(direction)) => Some(TaskSort { field, direction }),
            _ => None,
        };

        TaskFilter { status, sort }
    }
}

/// Urlencoded create/edit form, kept as raw strings so a rejected submission
/// can be rendered back exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskForm {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub completion_status: Option<String>,
    pub due_date: Option<String>,
}

impl TaskForm {
    fn status(&self) -> CompletionStatus {
        matches!(self.completion_status.as_deref(), Some("true" | "on")).into()
    }

    fn description(&self) -> Option<String> {
        self.description.clone().filter(|d| !d.is_empty())
    }

    fn parsed_due_date(&self) -> Result<Option<NaiveDateTime>, ValidationError> {
        let Some(raw) = self.due_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        DUE_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Some)
            .ok_or_else(|| {
                ValidationError::new("datetime")
                    .with_message(format!("The value '{}' is not a valid due date.", raw).into())
            })
    }

    /// The submitted `id`, if it is a valid integer
    pub fn id(&self) -> Option<i32> {
        self.id.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// Parse into [`CreateTask`]; a bad due date is reported alongside any
    /// field validation errors.
    pub fn to_create(&self) -> Result<CreateTask, ValidationErrors> {
        let due_date = self.parsed_due_date();
        let input = CreateTask {
            title: self.title.clone(),
            description: self.description(),
            completion_status: self.status(),
            due_date: due_date.clone().ok().flatten(),
        };

        match due_date {
            Ok(_) => Ok(input),
            Err(err) => {
                let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);
                errors.add("due_date", err);
                Err(errors)
            }
        }
    }

    /// Parse into [`UpdateTask`]. A missing or non-numeric `id` becomes 0,
    /// which never matches a stored task.
    pub fn to_update(&self) -> Result<UpdateTask, ValidationErrors> {
        let create = self.to_create()?;
        Ok(UpdateTask {
            id: self.id().unwrap_or_default(),
            title: create.title,
            description: create.description,
            completion_status: create.completion_status,
            due_date: create.due_date,
        })
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id.to_string()),
            title: task.title.clone(),
            description: task.description.clone(),
            completion_status: task.completion_status.is_complete().then(|| "true".to_string()),
            due_date: task.due_date.map(|d| {
                // Keep seconds when present so an untouched edit stores the same instant
                let fmt = if d.second() == 0 {
                    DUE_DATE_FORMATS[0]
                } else {
                    DUE_DATE_FORMATS[1]
                };
                d.format(fmt).to_string()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn form(title: &str) -> TaskForm {
        TaskForm {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_toggled_is_self_inverse() {
        for status in [CompletionStatus::Incomplete, CompletionStatus::Complete] {
            assert_ne!(status.toggled(), status);
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn test_status_bool_conversions() {
        assert_eq!(CompletionStatus::from(true), CompletionStatus::Complete);
        assert!(!bool::from(CompletionStatus::Incomplete));
        assert_eq!(CompletionStatus::default(), CompletionStatus::Incomplete);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        for title in ["", "   ", "\t\n"] {
            let input = CreateTask {
                title: title.to_string(),
                ..Default::default()
            };
            let errors = input.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("title"));
        }
    }

    #[test]
    fn test_description_limit_counts_characters() {
        let at_limit = CreateTask {
            title: "ok".into(),
            description: Some("é".repeat(60)),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let over = CreateTask {
            title: "ok".into(),
            description: Some("a".repeat(61)),
            ..Default::default()
        };
        let errors = over.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_query_requires_exact_values() {
        let query = TaskQuery {
            status_filter: Some("Complete".into()),
            sort_property: Some("DueDate".into()),
            sort_direction: Some("desc".into()),
        };
        assert_eq!(
            query.to_filter(),
            TaskFilter {
                status: Some(CompletionStatus::Complete),
                sort: Some(TaskSort {
                    field: SortField::DueDate,
                    direction: SortDirection::Desc,
                }),
            }
        );

        let sloppy = TaskQuery {
            status_filter: Some("complete".into()),
            sort_property: Some("title".into()),
            sort_direction: Some("ASC".into()),
        };
        assert_eq!(sloppy.to_filter(), TaskFilter::default());
    }

    #[test]
    fn test_query_sort_needs_both_parts() {
        let query = TaskQuery {
            sort_property: Some("Title".into()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().sort, None);
    }

    #[test]
    fn test_form_checkbox_and_empty_description() {
        let mut f = form("Groceries");
        f.completion_status = Some("on".into());
        f.description = Some(String::new());

        let input = f.to_create().unwrap();
        assert_eq!(input.completion_status, CompletionStatus::Complete);
        assert_eq!(input.description, None);

        f.completion_status = None;
        assert_eq!(
            f.to_create().unwrap().completion_status,
            CompletionStatus::Incomplete
        );
    }

    #[test]
    fn test_form_due_date_formats() {
        let mut f = form("Dentist");
        f.due_date = Some("2025-03-01T09:30".into());
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(f.to_create().unwrap().due_date, Some(expected));

        f.due_date = Some("2025-03-01T09:30:00".into());
        assert_eq!(f.to_create().unwrap().due_date, Some(expected));

        f.due_date = Some(String::new());
        assert_eq!(f.to_create().unwrap().due_date, None);
    }

    #[test]
    fn test_form_bad_due_date_reported_with_other_errors() {
        let mut f = form("");
        f.due_date = Some("next tuesday".into());

        let errors = f.to_create().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("due_date"));
        assert!(fields.contains_key("title"));
    }

    #[test]
    fn test_form_update_id() {
        let mut f = form("Edit me");
        f.id = Some("7".into());
        assert_eq!(f.to_update().unwrap().id, 7);

        f.id = Some("seven".into());
        assert_eq!(f.to_update().unwrap().id, 0);
    }

    #[test]
    fn test_form_from_task_round_trips_for_display() {
        let task = Task {
            id: 3,
            title: "Pay rent".into(),
            description: Some("before the 5th".into()),
            completion_status: CompletionStatus::Complete,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0),
        };
        let f = TaskForm::from(&task);
        assert_eq!(f.due_date.as_deref(), Some("2025-01-05T00:00"));
        assert_eq!(f.completion_status.as_deref(), Some("true"));

        let update = f.to_update().unwrap();
        assert_eq!(update.id, 3);
        assert_eq!(update.due_date, task.due_date);
    }

    #[test]
    fn test_form_from_task_keeps_seconds() {
        let task = Task {
            id: 4,
            title: "Standup".into(),
            description: None,
            completion_status: CompletionStatus::Incomplete,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 45),
        };
        let f = TaskForm::from(&task);
        assert_eq!(f.due_date.as_deref(), Some("2025-03-01T09:30:45"));
        assert_eq!(f.to_update().unwrap().due_date, task.due_date);
    }
}
