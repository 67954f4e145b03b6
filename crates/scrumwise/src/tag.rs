use crate::entity::{Entity, EntityId, ObjectKind};
use crate::error::Result;
use crate::models::TagFragment;

/// A project-scoped label that can be attached to tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub id: Option<EntityId>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<EntityId>,
}

impl Entity for Tag {
    const KIND: ObjectKind = ObjectKind::Tag;

    type Fragment = TagFragment;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn apply_fragment(&mut self, id: EntityId, wire: TagFragment) -> Result<()> {
        debug_assert_eq!(wire.id, id);
        self.id = Some(id);
        self.external_id = wire.external_id;
        self.name = wire.name;
        self.description = wire.description;
        self.status = wire.status;
        self.project_id = wire.project_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overwrites_absent_fields() {
        let mut tag = Tag::default();
        tag.merge_fragment(&json!({
            "objectType": "Tag",
            "id": "t1",
            "name": "Bug",
            "description": "Something is broken",
            "projectID": "P1",
            "color": "red",
        }))
        .unwrap();
        assert_eq!(tag.description.as_deref(), Some("Something is broken"));
        assert_eq!(tag.project_id, Some(EntityId::from("P1")));

        tag.merge_fragment(&json!({"objectType": "Tag", "id": "t1", "name": "Bug"}))
            .unwrap();
        assert_eq!(tag.description, None);
        assert_eq!(tag.name.as_deref(), Some("Bug"));
    }
}
