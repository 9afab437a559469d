use crate::models::{Task, TaskPriority};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the tasks table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    pub created_date: DateTimeWithTimeZone,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub completed_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            tags: model.tags,
            created_date: model.created_date.into(),
            due_date: model.due_date.map(Into::into),
            completed_date: model.completed_date.map(Into::into),
        }
    }
}

impl From<Task> for ActiveModel {
    /// Every column set; an id of 0 is left for the database to assign.
    fn from(task: Task) -> Self {
        ActiveModel {
            id: if task.id > 0 { Set(task.id) } else { NotSet },
            title: Set(task.title),
            description: Set(task.description),
            status: Set(task.status),
            priority: Set(task.priority),
            tags: Set(task.tags),
            created_date: Set(task.created_date.into()),
            due_date: Set(task.due_date.map(Into::into)),
            completed_date: Set(task.completed_date.map(Into::into)),
        }
    }
}
