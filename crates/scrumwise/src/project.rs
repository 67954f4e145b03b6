use serde_json::Value;

use crate::backlog_item::BacklogItem;
use crate::collection::EntityCollection;
use crate::entity::{Entity, EntityId, ObjectKind};
use crate::error::{Result, ScrumwiseError};
use crate::models::ProjectFragment;
use crate::requests::ApiCall;
use crate::tag::Tag;
use crate::task::Task;

#[derive(Debug, Default)]
pub struct Project {
    pub id: Option<EntityId>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// As delivered; the service sends either a URL string or a structured link.
    pub link: Option<Value>,
    pub status: Option<String>,
    pub rough_estimate_unit: Option<String>,
    pub detailed_estimate_unit: Option<String>,
    pub time_tracking_unit: Option<String>,
    pub backlog_items: EntityCollection<BacklogItem>,
    pub tags: EntityCollection<Tag>,
}

impl Entity for Project {
    const KIND: ObjectKind = ObjectKind::Project;

    type Fragment = ProjectFragment;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn validate_nested(wire: &ProjectFragment) -> Result<()> {
        EntityCollection::<Tag>::validate_snapshot(wire.tags.as_ref())?;
        EntityCollection::<BacklogItem>::validate_snapshot(wire.backlog_items.as_ref())
    }

    fn apply_fragment(&mut self, id: EntityId, wire: ProjectFragment) -> Result<()> {
        debug_assert_eq!(wire.id, id);
        self.id = Some(id);
        self.external_id = wire.external_id;
        self.name = wire.name;
        self.description = wire.description;
        self.link = wire.link;
        self.status = wire.status;
        self.rough_estimate_unit = wire.rough_estimate_unit;
        self.detailed_estimate_unit = wire.detailed_estimate_unit;
        self.time_tracking_unit = wire.time_tracking_unit;
        self.tags.merge_snapshot(wire.tags.as_ref())?;
        self.backlog_items.merge_snapshot(wire.backlog_items.as_ref())?;
        Ok(())
    }
}

impl Project {
    /// Builds the `AddTag` call for a new tag appended to this project.
    pub fn add_tag(
        &self,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<ApiCall> {
        Ok(ApiCall::add_tag(
            self.require_id()?.clone(),
            name,
            color,
            description,
        ))
    }

    /// Builds the `DeleteTag` call for the tag with the given name.
    pub fn delete_tag(&self, name: &str) -> Result<ApiCall> {
        let tag = self.tags.by_name(name).ok_or_else(|| ScrumwiseError::NotFound {
            kind: ObjectKind::Tag,
            name: name.to_string(),
        })?;
        let tag_id = tag
            .id
            .clone()
            .ok_or(ScrumwiseError::NotInitialised { kind: ObjectKind::Tag })?;
        Ok(ApiCall::DeleteTag {
            tag_id,
            external_id: tag.external_id.clone(),
        })
    }

    /// Finds a task anywhere under this project's backlog items.
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.backlog_items
            .values()
            .find_map(|item| item.tasks.by_id(task_id))
    }

    fn require_id(&self) -> Result<&EntityId> {
        self.id
            .as_ref()
            .ok_or(ScrumwiseError::NotInitialised { kind: Self::KIND })
    }
}
