//! Session tests against a local HTTP server
//!
//! Exercise the real reqwest transport: URL layout, basic auth, query
//! parameters and the open / enqueue / flush cycle.

use scrumwise::{ApiCall, EntityId, ScrumwiseConfig, ScrumwiseError, Session};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// base64("alice:secret")
const AUTHORIZATION: &str = "Basic YWxpY2U6c2VjcmV0";

fn snapshot(tasks: Value) -> Value {
    json!({
        "objectType": "Data",
        "persons": [{"objectType": "Person", "id": "u1", "firstName": "Alice"}],
        "deletedPersons": [],
        "projects": [{
            "objectType": "Project",
            "id": "P1",
            "name": "Website",
            "tags": [],
            "backlogItems": [{
                "objectType": "BacklogItem",
                "id": "B1",
                "projectID": "P1",
                "itemNumber": 3,
                "name": "Checkout",
                "tasks": tasks,
            }],
        }],
    })
}

fn config_for(server: &MockServer) -> ScrumwiseConfig {
    let address = server.address();
    ScrumwiseConfig::new(address.ip().to_string(), address.port(), "alice", "secret")
        .with_scheme("http")
        .with_timeout_secs(5)
}

fn data_response(version: i64, result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "dataVersion": version, "result": result }))
}

#[tokio::test]
async fn test_open_enqueue_flush() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/getData"))
        .and(query_param(
            "includeProperties",
            "Project.backlogItems,BacklogItem.tasks,Project.tags",
        ))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(data_response(10, snapshot(json!([]))))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/addTask"))
        .and(query_param("name", "T1"))
        .and(query_param("description", "desc"))
        .and(query_param("backlogItemID", "B1"))
        .and(query_param("estimate", "-1"))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dataVersion": 11})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/getData"))
        .respond_with(data_response(
            12,
            snapshot(json!([{
                "objectType": "Task",
                "id": "T9",
                "name": "T1",
                "description": "desc",
                "projectID": "P1",
                "backlogItemID": "B1",
            }])),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut session = Session::new(config_for(&mock_server)).unwrap();
    session.open().await.unwrap();
    assert_eq!(session.last_data_version(), 10);
    assert!(session.persons().is_some());

    let call = session
        .projects()
        .by_id("P1")
        .and_then(|p| p.backlog_items.by_item_number(3))
        .unwrap()
        .create_task_by_name("T1", "desc")
        .unwrap();
    session.enqueue(call);
    assert_eq!(session.queue().len(), 1);

    session.flush().await.unwrap();

    assert!(session.queue().is_empty());
    assert_eq!(session.last_data_version(), 12);
    let item = session
        .projects()
        .by_id("P1")
        .and_then(|p| p.backlog_items.by_id("B1"))
        .unwrap();
    assert!(item.has_task_by_name("T1"));
    assert!(session.find_task("T9").is_some());
}

#[tokio::test]
async fn test_flush_aborts_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/setTaskDescription"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/addTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dataVersion": 2})))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/getData"))
        .respond_with(data_response(3, snapshot(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut session = Session::new(config_for(&mock_server)).unwrap();
    session.enqueue(vec![
        ApiCall::set_task_description(EntityId::from("T1"), "new text"),
        ApiCall::add_task(EntityId::from("B1"), "T2", ""),
    ]);

    let err = session.flush().await.unwrap_err();
    match err {
        ScrumwiseError::BatchAborted { index, source, .. } => {
            assert_eq!(index, 0);
            assert!(matches!(*source, ScrumwiseError::Http { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.queue().len(), 2);
}

#[tokio::test]
async fn test_required_data_version_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/getData"))
        .respond_with(data_response(20, snapshot(json!([]))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/api/v1/setTaskDescription"))
        .and(query_param("requiredDataVersion", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dataVersion": 21})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut session = Session::new(config_for(&mock_server)).unwrap();
    session.open().await.unwrap();
    session.enqueue(ApiCall::set_task_description(EntityId::from("T1"), "x"));

    session.flush_with(true).await.unwrap();
    assert_eq!(session.last_data_version(), 20);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ScrumwiseConfig::new("127.0.0.1", port, "alice", "secret")
        .with_scheme("http")
        .with_timeout_secs(5);
    let mut session = Session::new(config).unwrap();
    let err = session.open().await.unwrap_err();
    assert!(matches!(err, ScrumwiseError::Network { ref endpoint, .. } if endpoint == "getData"));
    assert!(session.projects().is_empty());
}
