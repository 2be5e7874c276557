use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, NullOrdering};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoSimpleExpr, Order,
    QueryFilter, QueryOrder, Select,
};

use crate::{
    entity,
    error::{TaskError, TaskResult},
    models::{CreateTask, SortDirection, SortField, Task, TaskFilter, TaskSort, UpdateTask},
    repository::TaskRepository,
};

pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply_sort(query: Select<entity::Entity>, sort: Option<TaskSort>) -> Select<entity::Entity> {
    let Some(sort) = sort else {
        return query.order_by_asc(entity::Column::Id);
    };

    // Titles compare bytewise regardless of the database's default collation
    let column = match sort.field {
        SortField::Title => {
            Expr::cust(r#""task_items"."title" COLLATE "C""#).into_simple_expr()
        }
        SortField::Status => entity::Column::CompletionStatus.into_simple_expr(),
        SortField::DueDate => entity::Column::DueDate.into_simple_expr(),
    };

    // Missing due dates rank lowest, matching the in-memory ordering.
    let (order, nulls) = match sort.direction {
        SortDirection::Asc => (Order::Asc, NullOrdering::First),
        SortDirection::Desc => (Order::Desc, NullOrdering::Last),
    };

    query
        .order_by_with_nulls(column, order, nulls)
        .order_by_asc(entity::Column::Id)
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        let mut query = entity::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(entity::Column::CompletionStatus.eq(bool::from(status)));
        }

        let models = apply_sort(query, filter.sort).all(&self.db).await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Task>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(task_id = model.id, "Created task");
        Ok(model.into())
    }

    async fn replace(&self, id: i32, input: UpdateTask) -> TaskResult<Task> {
        let existing = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        let mut active_model: entity::ActiveModel = existing.into();
        active_model.title = Set(input.title);
        active_model.description = Set(input.description);
        active_model.completion_status = Set(input.completion_status.into());
        active_model.due_date = Set(input.due_date);

        let model = active_model.update(&self.db).await?;

        tracing::info!(task_id = id, "Updated task");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> TaskResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn toggle_status(&self, id: i32) -> TaskResult<bool> {
        // Single statement so concurrent toggles cannot overwrite each other.
        let result = entity::Entity::update_many()
            .col_expr(
                entity::Column::CompletionStatus,
                Expr::cust("NOT completion_status"),
            )
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        let toggled = result.rows_affected > 0;
        if toggled {
            tracing::info!(task_id = id, "Toggled task status");
        }
        Ok(toggled)
    }

    async fn mark_complete(&self, id: i32) -> TaskResult<bool> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::CompletionStatus, Expr::value(true))
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        let updated = result.rows_affected > 0;
        if updated {
            tracing::info!(task_id = id, "Marked task complete");
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletionStatus;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn model(id: i32, title: &str, complete: bool) -> entity::Model {
        entity::Model {
            id,
            title: title.to_string(),
            description: None,
            completion_status: complete,
            due_date: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn log_of(repo: PgTaskRepository) -> String {
        format!("{:?}", repo.db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_list_maps_rows_in_natural_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "Test 1", false), model(2, "Test 2", true)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let tasks = repo.list(TaskFilter::default()).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].completion_status, CompletionStatus::Complete);

        let log = log_of(repo);
        assert!(log.contains(r#"ORDER BY \"task_items\".\"id\" ASC"#), "{log}");
    }

    #[tokio::test]
    async fn test_list_sort_places_nulls_lowest() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new(), Vec::new()])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            repo.list(TaskFilter {
                status: Some(CompletionStatus::Incomplete),
                sort: Some(TaskSort {
                    field: SortField::DueDate,
                    direction,
                }),
            })
            .await
            .unwrap();
        }

        let log = log_of(repo);
        assert!(log.contains("ASC NULLS FIRST"), "{log}");
        assert!(log.contains("DESC NULLS LAST"), "{log}");
        assert!(log.contains("completion_status"), "{log}");
    }

    #[tokio::test]
    async fn test_list_title_sort_is_bytewise() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        repo.list(TaskFilter {
            status: None,
            sort: Some(TaskSort {
                field: SortField::Title,
                direction: SortDirection::Asc,
            }),
        })
        .await
        .unwrap();

        let log = log_of(repo);
        assert!(
            log.contains(r#"ORDER BY \"task_items\".\"title\" COLLATE \"C\" ASC"#),
            "{log}"
        );
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(7, "Write report", false)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let task = repo
            .create(CreateTask {
                title: "Write report".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.title, "Write report");
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo
            .replace(
                3,
                UpdateTask {
                    id: 3,
                    title: "x".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(3)));
    }

    #[tokio::test]
    async fn test_replace_updates_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![model(3, "Old", false)],
                vec![model(3, "New", true)],
            ])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let task = repo
            .replace(
                3,
                UpdateTask {
                    id: 3,
                    title: "New".into(),
                    completion_status: CompletionStatus::Complete,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(task.title, "New");
        assert_eq!(task.completion_status, CompletionStatus::Complete);
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_is_single_update() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        assert!(repo.toggle_status(1).await.unwrap());
        assert!(!repo.toggle_status(2).await.unwrap());

        let log = log_of(repo);
        assert!(log.contains("NOT completion_status"), "{log}");
    }

    #[tokio::test]
    async fn test_mark_complete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        assert!(repo.mark_complete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_database_errors_are_mapped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let err = repo.get_by_id(1).await.unwrap_err();
        assert!(matches!(err, TaskError::Database(msg) if msg.contains("connection reset")));
    }
}
