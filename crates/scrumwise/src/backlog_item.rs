use serde_json::Value;

use crate::collection::EntityCollection;
use crate::entity::{Entity, EntityId, ObjectKind};
use crate::error::{Result, ScrumwiseError};
use crate::models::BacklogItemFragment;
use crate::requests::ApiCall;
use crate::task::Task;

#[derive(Debug, Default)]
pub struct BacklogItem {
    pub id: Option<EntityId>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// As delivered; the service sends either a URL string or a structured link.
    pub link: Option<Value>,
    pub status: Option<String>,
    pub project_id: Option<EntityId>,
    /// Sequence number shown to users, unique within a project.
    pub item_number: Option<i64>,
    pub tasks: EntityCollection<Task>,
}

impl Entity for BacklogItem {
    const KIND: ObjectKind = ObjectKind::BacklogItem;

    type Fragment = BacklogItemFragment;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn validate_nested(wire: &BacklogItemFragment) -> Result<()> {
        EntityCollection::<Task>::validate_snapshot(wire.tasks.as_ref())
    }

    fn apply_fragment(&mut self, id: EntityId, wire: BacklogItemFragment) -> Result<()> {
        debug_assert_eq!(wire.id, id);
        self.id = Some(id);
        self.external_id = wire.external_id;
        self.name = wire.name;
        self.description = wire.description;
        self.link = wire.link;
        self.status = wire.status;
        self.project_id = wire.project_id;
        self.item_number = wire.item_number;
        self.tasks.merge_snapshot(wire.tasks.as_ref())?;
        Ok(())
    }
}

impl BacklogItem {
    pub fn has_task_by_name(&self, name: &str) -> bool {
        self.tasks.by_name(name).is_some()
    }

    /// Builds the `AddTask` call for a task that does not exist yet.
    pub fn create_task_by_name(&self, name: &str, description: &str) -> Result<ApiCall> {
        if self.has_task_by_name(name) {
            return Err(ScrumwiseError::AlreadyExists {
                kind: ObjectKind::Task,
                name: name.to_string(),
            });
        }
        Ok(ApiCall::add_task(self.require_id()?.clone(), name, description))
    }

    /// Builds the `SetTaskDescription` call for an existing task.
    pub fn update_task_by_name(&self, name: &str, description: &str) -> Result<ApiCall> {
        let task_id = self
            .tasks
            .by_name(name)
            .and_then(|task| task.id.clone())
            .ok_or_else(|| ScrumwiseError::NotFound {
                kind: ObjectKind::Task,
                name: name.to_string(),
            })?;
        Ok(ApiCall::set_task_description(task_id, description))
    }

    fn require_id(&self) -> Result<&EntityId> {
        self.id
            .as_ref()
            .ok_or(ScrumwiseError::NotInitialised { kind: Self::KIND })
    }
}

impl EntityCollection<BacklogItem> {
    pub fn by_item_number(&self, item_number: i64) -> Option<&BacklogItem> {
        self.by_attr(|item: &BacklogItem| item.item_number.as_ref(), &item_number)
    }
}
