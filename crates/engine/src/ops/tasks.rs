use api_types::{
    Update,
    query::{Condition, FetchParams},
    task::{Task, TaskFields},
};
use chrono::NaiveDate;

use crate::{
    EntityKind, RecordStore, ResultEngine,
    util::{first_written, normalize_optional_text, normalize_required_text, store_date},
};

use super::Engine;

/// Task data accepted by create and update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Option<String>,
    pub farm_id: i64,
    pub crop_id: Option<i64>,
}

impl TaskInput {
    fn into_fields(self, completed: bool) -> ResultEngine<TaskFields> {
        Ok(TaskFields {
            title: normalize_required_text(&self.title, "task title")?,
            description: normalize_optional_text(self.description.as_deref()),
            due_date: store_date(self.due_date),
            priority: normalize_optional_text(self.priority.as_deref()),
            completed,
            farm_id: self.farm_id,
            crop_id: self.crop_id,
        })
    }
}

impl TryFrom<&Task> for TaskInput {
    type Error = crate::EngineError;

    fn try_from(task: &Task) -> ResultEngine<Self> {
        let missing = |field: &str| {
            crate::EngineError::InvalidField(format!("task {} has no {field}", task.id))
        };
        let due_date = task.due_date.as_deref().ok_or_else(|| missing("due_date"))?;

        Ok(Self {
            title: task.title.clone().ok_or_else(|| missing("title"))?,
            description: task.description.clone(),
            due_date: crate::expense::parse_date(due_date)?,
            priority: task.priority.clone(),
            farm_id: task.farm_id.as_ref().ok_or_else(|| missing("farm_id"))?.id(),
            crop_id: task.crop_id.as_ref().map(|crop| crop.id()),
        })
    }
}

impl<S: RecordStore> Engine<S> {
    pub async fn list_tasks(&self) -> ResultEngine<Vec<Task>> {
        self.list_all(EntityKind::Task).await
    }

    pub async fn task(&self, id: i64) -> ResultEngine<Task> {
        self.get(EntityKind::Task, id).await
    }

    pub async fn tasks_by_farm(&self, farm_id: i64) -> ResultEngine<Vec<Task>> {
        self.list_by_farm(EntityKind::Task, farm_id).await
    }

    /// Tasks due on `day` (matched by calendar day in the store).
    pub async fn tasks_due_on(&self, day: NaiveDate) -> ResultEngine<Vec<Task>> {
        let kind = EntityKind::Task;
        let params = FetchParams::fields(kind.fields())
            .filter(Condition::same_day("due_date", &store_date(day)));
        self.list(kind, params).await
    }

    /// New tasks always start incomplete.
    pub async fn create_task(&self, input: TaskInput) -> ResultEngine<Task> {
        let fields = input.into_fields(false)?;
        let results = self
            .store
            .create_records(EntityKind::Task, std::slice::from_ref(&fields))
            .await?;
        first_written(EntityKind::Task, "create", results)
    }

    pub async fn update_task(&self, id: i64, input: TaskInput, completed: bool) -> ResultEngine<Task> {
        let update = Update {
            id,
            fields: input.into_fields(completed)?,
        };
        let results = self
            .store
            .update_records(EntityKind::Task, std::slice::from_ref(&update))
            .await?;
        first_written(EntityKind::Task, "update", results)
    }

    /// Flip the completion flag of a task.
    pub async fn toggle_task_complete(&self, id: i64) -> ResultEngine<Task> {
        let current = self.task(id).await?;
        let completed = !current.completed.unwrap_or(false);
        let input = TaskInput::try_from(&current)?;
        self.update_task(id, input, completed).await
    }

    pub async fn delete_task(&self, id: i64) -> ResultEngine<bool> {
        self.delete(EntityKind::Task, id).await
    }
}
