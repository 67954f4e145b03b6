use serde_json::Value;

use crate::collection::{EntityCollection, Selection};
use crate::entity::{Entity, EntityId, ObjectKind};
use crate::error::{Result, ScrumwiseError};
use crate::models::TaskFragment;
use crate::requests::ApiCall;
use crate::tag::Tag;

/// A task under a backlog item.
///
/// Tags are held as ids only; the tags themselves live in the owning
/// project's tag collection, which callers pass in for lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub id: Option<EntityId>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// As delivered; the service sends either a URL string or a structured link.
    pub link: Option<Value>,
    pub status: Option<String>,
    pub project_id: Option<EntityId>,
    pub backlog_item_id: Option<EntityId>,
    pub tag_ids: Vec<EntityId>,
}

impl Entity for Task {
    const KIND: ObjectKind = ObjectKind::Task;

    type Fragment = TaskFragment;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn apply_fragment(&mut self, id: EntityId, wire: TaskFragment) -> Result<()> {
        debug_assert_eq!(wire.id, id);
        self.id = Some(id);
        self.external_id = wire.external_id;
        self.name = wire.name;
        self.description = wire.description;
        self.link = wire.link;
        self.status = wire.status;
        self.project_id = wire.project_id;
        self.backlog_item_id = wire.backlog_item_id;
        self.tag_ids = wire.tag_ids.unwrap_or_default();
        Ok(())
    }
}

impl Task {
    /// The task's tags, looked up in the owning project's tags.
    pub fn tags<'a>(&'a self, project_tags: &'a EntityCollection<Tag>) -> Selection<'a, Tag> {
        project_tags.select_ids(self.tag_ids.iter())
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|id| id.as_str() == tag_id)
    }

    /// Ids of the named tags the task does not carry yet.
    ///
    /// Names with no matching tag are ignored.
    pub fn tag_ids_to_add<S: AsRef<str>>(
        &self,
        project_tags: &EntityCollection<Tag>,
        names: &[S],
    ) -> Vec<EntityId> {
        project_tags
            .by_names(names)
            .ids()
            .filter(|id| !self.has_tag(id.as_str()))
            .cloned()
            .collect()
    }

    /// Ids the task carries that do not belong to any of the named tags.
    pub fn tag_ids_to_remove<S: AsRef<str>>(
        &self,
        project_tags: &EntityCollection<Tag>,
        names: &[S],
    ) -> Vec<EntityId> {
        let keep = project_tags.by_names(names);
        self.tag_ids
            .iter()
            .filter(|id| !keep.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// One `AddTagOnObject` call per named tag missing from the task.
    pub fn set_tags_on_task<S: AsRef<str>>(
        &self,
        project_tags: &EntityCollection<Tag>,
        names: &[S],
    ) -> Result<Vec<ApiCall>> {
        let task_id = self.require_id()?;
        Ok(self
            .tag_ids_to_add(project_tags, names)
            .into_iter()
            .map(|tag_id| ApiCall::AddTagOnObject {
                tag_id,
                object_type: ObjectKind::Task,
                object_id: task_id.clone(),
            })
            .collect())
    }

    /// One `RemoveTagFromObject` call per carried tag not among `names`.
    pub fn clean_all_tags_except<S: AsRef<str>>(
        &self,
        project_tags: &EntityCollection<Tag>,
        names: &[S],
    ) -> Result<Vec<ApiCall>> {
        let task_id = self.require_id()?;
        Ok(self
            .tag_ids_to_remove(project_tags, names)
            .into_iter()
            .map(|tag_id| ApiCall::RemoveTagFromObject {
                tag_id,
                object_type: ObjectKind::Task,
                object_id: task_id.clone(),
            })
            .collect())
    }

    fn require_id(&self) -> Result<&EntityId> {
        self.id
            .as_ref()
            .ok_or(ScrumwiseError::NotInitialised { kind: Self::KIND })
    }
}
