//! API calls understood by the Scrumwise service
//!
//! Every call is a GET against `service/api/v1/{endpoint}` with its arguments
//! as query parameters. Optional arguments that are `None` are left out of the
//! query string entirely.

use std::fmt;

use crate::entity::{EntityId, ObjectKind};

/// Properties getData is asked to expand.
pub const SNAPSHOT_PROPERTIES: &str = "Project.backlogItems,BacklogItem.tasks,Project.tags";

/// Estimate sent for tasks created without one.
pub const UNESTIMATED: i64 = -1;

/// Position sent for tags appended at the end of the project's tag list.
pub const APPEND_INDEX: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetSnapshot,
    AddTask {
        backlog_item_id: EntityId,
        name: String,
        description: String,
        estimate: i64,
    },
    SetTaskDescription {
        task_id: EntityId,
        description: String,
    },
    AddTagOnObject {
        tag_id: EntityId,
        object_type: ObjectKind,
        object_id: EntityId,
    },
    RemoveTagFromObject {
        tag_id: EntityId,
        object_type: ObjectKind,
        object_id: EntityId,
    },
    AddTag {
        project_id: EntityId,
        external_id: Option<String>,
        name: String,
        description: Option<String>,
        color: Option<String>,
        index: i64,
    },
    /// Deletes a tag.
    ///
    /// Sent to `deleteTag`. An older client posted these parameters to `addTag`,
    /// which cannot delete anything.
    DeleteTag {
        tag_id: EntityId,
        external_id: Option<String>,
    },
}

impl ApiCall {
    pub fn add_task(backlog_item_id: EntityId, name: &str, description: &str) -> Self {
        ApiCall::AddTask {
            backlog_item_id,
            name: name.to_string(),
            description: description.to_string(),
            estimate: UNESTIMATED,
        }
    }

    pub fn set_task_description(task_id: EntityId, description: &str) -> Self {
        ApiCall::SetTaskDescription {
            task_id,
            description: description.to_string(),
        }
    }

    pub fn add_tag(
        project_id: EntityId,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        ApiCall::AddTag {
            project_id,
            external_id: None,
            name: name.to_string(),
            description: description.map(str::to_string),
            color: color.map(str::to_string),
            index: APPEND_INDEX,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiCall::GetSnapshot => "getData",
            ApiCall::AddTask { .. } => "addTask",
            ApiCall::SetTaskDescription { .. } => "setTaskDescription",
            ApiCall::AddTagOnObject { .. } => "addTagOnObject",
            ApiCall::RemoveTagFromObject { .. } => "removeTagFromObject",
            ApiCall::AddTag { .. } => "addTag",
            ApiCall::DeleteTag { .. } => "deleteTag",
        }
    }

    /// Query parameters in a stable order, `None` values omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let params: Vec<(&'static str, Option<String>)> = match self {
            ApiCall::GetSnapshot => {
                vec![("includeProperties", Some(SNAPSHOT_PROPERTIES.to_string()))]
            }
            ApiCall::AddTask {
                backlog_item_id,
                name,
                description,
                estimate,
            } => vec![
                ("name", Some(name.clone())),
                ("description", Some(description.clone())),
                ("backlogItemID", Some(backlog_item_id.to_string())),
                ("estimate", Some(estimate.to_string())),
            ],
            ApiCall::SetTaskDescription {
                task_id,
                description,
            } => vec![
                ("taskID", Some(task_id.to_string())),
                ("description", Some(description.clone())),
            ],
            ApiCall::AddTagOnObject {
                tag_id,
                object_type,
                object_id,
            }
            | ApiCall::RemoveTagFromObject {
                tag_id,
                object_type,
                object_id,
            } => vec![
                ("tagID", Some(tag_id.to_string())),
                ("objectType", Some(object_type.to_string())),
                ("objectID", Some(object_id.to_string())),
            ],
            ApiCall::AddTag {
                project_id,
                external_id,
                name,
                description,
                color,
                index,
            } => vec![
                ("projectID", Some(project_id.to_string())),
                ("externalID", external_id.clone()),
                ("name", Some(name.clone())),
                ("description", description.clone()),
                ("color", color.clone()),
                ("index", Some(index.to_string())),
            ],
            ApiCall::DeleteTag {
                tag_id,
                external_id,
            } => vec![
                ("tagID", Some(tag_id.to_string())),
                ("externalID", external_id.clone()),
            ],
        };

        params
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.endpoint())?;
        for (i, (key, value)) in self.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_task_params() {
        let call = ApiCall::add_task(EntityId::from("B1"), "T1", "desc");
        assert_eq!(call.endpoint(), "addTask");
        assert_eq!(
            call.params(),
            vec![
                ("name", "T1".to_string()),
                ("description", "desc".to_string()),
                ("backlogItemID", "B1".to_string()),
                ("estimate", "-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_add_tag_omits_missing_optionals() {
        let call = ApiCall::add_tag(EntityId::from("P1"), "Bug", Some("red"), None);
        let keys: Vec<_> = call.params().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["projectID", "name", "color", "index"]);
    }

    #[test]
    fn test_tag_on_object_params() {
        let call = ApiCall::RemoveTagFromObject {
            tag_id: EntityId::from("t2"),
            object_type: ObjectKind::Task,
            object_id: EntityId::from("T9"),
        };
        assert_eq!(call.endpoint(), "removeTagFromObject");
        assert_eq!(
            call.params(),
            vec![
                ("tagID", "t2".to_string()),
                ("objectType", "Task".to_string()),
                ("objectID", "T9".to_string()),
            ]
        );
    }

    #[test]
    fn test_delete_tag_uses_its_own_endpoint() {
        let call = ApiCall::DeleteTag {
            tag_id: EntityId::from("t1"),
            external_id: None,
        };
        assert_eq!(call.endpoint(), "deleteTag");
        assert_eq!(call.params(), vec![("tagID", "t1".to_string())]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiCall::GetSnapshot.to_string(),
            format!("getData(includeProperties={})", SNAPSHOT_PROPERTIES)
        );
        assert_eq!(
            ApiCall::set_task_description(EntityId::from("T1"), "x").to_string(),
            "setTaskDescription(taskID=T1, description=x)"
        );
    }
}
