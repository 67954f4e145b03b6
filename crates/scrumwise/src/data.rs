//! Root of the mirrored object graph

use serde_json::Value;
use tracing::warn;

use crate::collection::EntityCollection;
use crate::entity::{ObjectKind, parse_fragment};
use crate::error::Result;
use crate::models::SnapshotResult;
use crate::project::Project;
use crate::task::Task;

/// Everything a getData snapshot describes.
///
/// `persons` and `deleted_persons` are kept as delivered. Deleted persons are
/// not reconciled against anything, and no entity is ever removed by a merge.
#[derive(Debug, Default)]
pub struct ScrumwiseData {
    pub persons: Option<Value>,
    pub deleted_persons: Option<Value>,
    pub projects: EntityCollection<Project>,
}

impl ScrumwiseData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the `result` object of a getData response.
    pub fn merge_snapshot(&mut self, result: &Value) -> Result<bool> {
        let snapshot: SnapshotResult = parse_fragment(ObjectKind::Data, result)?;
        match snapshot.object_type.as_deref() {
            None | Some("Data") => {}
            Some(object_type) => warn!(
                "[ScrumwiseData] Snapshot root declares objectType={}, merging anyway",
                object_type
            ),
        }

        self.projects.merge_snapshot(snapshot.projects.as_ref())?;
        self.persons = snapshot.persons;
        self.deleted_persons = snapshot.deleted_persons;
        Ok(true)
    }

    /// Finds a task by id across all projects.
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.projects
            .values()
            .find_map(|project| project.find_task(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrumwiseError;
    use serde_json::json;

    #[test]
    fn test_merge_snapshot_root() {
        let mut data = ScrumwiseData::new();
        data.merge_snapshot(&json!({
            "objectType": "Data",
            "persons": [{"objectType": "Person", "id": "u1"}],
            "deletedPersons": [],
            "projects": [{"objectType": "Project", "id": "P1", "name": "Website"}],
        }))
        .unwrap();

        assert_eq!(data.projects.len(), 1);
        assert_eq!(data.persons, Some(json!([{"objectType": "Person", "id": "u1"}])));
        assert_eq!(data.deleted_persons, Some(json!([])));
    }

    #[test]
    fn test_missing_projects_is_not_an_error() {
        let mut data = ScrumwiseData::new();
        assert!(data.merge_snapshot(&json!({"persons": []})).unwrap());
        assert!(data.projects.is_empty());
    }

    #[test]
    fn test_projects_survive_later_snapshot_without_them() {
        let mut data = ScrumwiseData::new();
        data.merge_snapshot(&json!({"projects": [{"objectType": "Project", "id": "P1"}]}))
            .unwrap();
        data.merge_snapshot(&json!({"projects": []})).unwrap();
        assert!(data.projects.contains("P1"));
    }

    #[test]
    fn test_structured_link_does_not_drop_project() {
        let mut data = ScrumwiseData::new();
        data.merge_snapshot(&json!({
            "objectType": "Data",
            "projects": [
                {"objectType": "Project", "id": "P0", "name": "Ops"},
                {
                    "objectType": "Project",
                    "id": "P1",
                    "name": "Website",
                    "backlogItems": [{
                        "objectType": "BacklogItem",
                        "id": "B1",
                        "itemNumber": 1,
                        "link": {"url": "https://example.com/b1"},
                        "tasks": [{"objectType": "Task", "id": "T1", "externalID": 17, "link": "https://example.com/t1"}],
                    }],
                },
            ],
        }))
        .unwrap();

        assert_eq!(data.projects.len(), 2);
        let item = data.projects.by_id("P1").and_then(|p| p.backlog_items.by_id("B1")).unwrap();
        assert_eq!(item.link, Some(json!({"url": "https://example.com/b1"})));
        let task = data.find_task("T1").unwrap();
        assert_eq!(task.external_id.as_deref(), Some("17"));
        assert_eq!(task.link, Some(json!("https://example.com/t1")));
    }

    #[test]
    fn test_bad_reference_type_leaves_graph_untouched() {
        let mut data = ScrumwiseData::new();
        data.merge_snapshot(&json!({"projects": [{"objectType": "Project", "id": "P1", "name": "Old"}]}))
            .unwrap();

        let err = data
            .merge_snapshot(&json!({"persons": [{"id": "u2"}], "projects": [
                {"objectType": "Project", "id": "P1", "name": "New"},
                {"objectType": "Project", "id": "P2", "backlogItems": [
                    {"objectType": "BacklogItem", "id": "B1", "itemNumber": "three"},
                ]},
            ]}))
            .unwrap_err();

        assert!(matches!(err, ScrumwiseError::MalformedFragment { kind: ObjectKind::BacklogItem, .. }));
        assert_eq!(data.projects.len(), 1);
        assert_eq!(data.projects.by_id("P1").and_then(|p| p.name.as_deref()), Some("Old"));
        assert_eq!(data.persons, None);
    }

    #[test]
    fn test_non_object_result_is_malformed() {
        let err = ScrumwiseData::new().merge_snapshot(&json!("oops")).unwrap_err();
        assert!(matches!(err, ScrumwiseError::MalformedFragment { kind: ObjectKind::Data, .. }));
    }
}
