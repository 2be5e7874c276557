use crate::models::{CompletionStatus, CreateTask, Task};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the task_items table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completion_status: bool,
    pub due_date: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Mount point of the task routes
    pub const URL: &'static str = "/tasks";
}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            completion_status: CompletionStatus::from(model.completion_status),
            due_date: model.due_date,
        }
    }
}

// The id is left unset so the serial column assigns it.
impl From<CreateTask> for ActiveModel {
    fn from(input: CreateTask) -> Self {
        ActiveModel {
            id: NotSet,
            title: Set(input.title),
            description: Set(input.description),
            completion_status: Set(input.completion_status.into()),
            due_date: Set(input.due_date),
        }
    }
}
