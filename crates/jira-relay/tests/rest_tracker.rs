//! HTTP-level tests for `RestTracker`.
//!
//! Each test starts a stub Jira server on a random local port, points a
//! `RestTracker` at it, and checks the requests the tracker sends as well as
//! how it reads the responses.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use jira_relay::config::JiraConfig;
use jira_relay::domain::{FieldMap, IssueKey, IssueUpdate, NamedRef, NewIssue};
use jira_relay::error::Error;
use jira_relay::tracker::{IssueTracker, RestTracker};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

mod helpers {
    use super::*;

    /// A request as seen by the stub server.
    #[derive(Debug, Clone)]
    pub struct SeenRequest {
        pub method: Method,
        pub path: String,
        pub query: HashMap<String, String>,
        pub authorization: Option<String>,
        pub body: Option<Value>,
    }

    #[derive(Clone, Default)]
    pub struct Stub {
        routes: Arc<Mutex<HashMap<(Method, String), (StatusCode, Option<Value>)>>>,
        seen: Arc<Mutex<Vec<SeenRequest>>>,
    }

    impl Stub {
        pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Option<Value>) {
            self.routes
                .lock()
                .unwrap()
                .insert((method, path.to_string()), (status, body));
        }

        pub fn seen(&self) -> Vec<SeenRequest> {
            self.seen.lock().unwrap().clone()
        }

        pub fn last(&self) -> SeenRequest {
            self.seen().last().cloned().expect("no request was made")
        }
    }

    async fn handle(
        State(stub): State<Stub>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        let query = uri
            .query()
            .map(|q| {
                url_pairs(q)
                    .into_iter()
                    .collect::<HashMap<String, String>>()
            })
            .unwrap_or_default();

        stub.seen.lock().unwrap().push(SeenRequest {
            method: method.clone(),
            path: uri.path().to_string(),
            query,
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_str(&body).ok(),
        });

        let route = stub
            .routes
            .lock()
            .unwrap()
            .get(&(method, uri.path().to_string()))
            .cloned();

        match route {
            Some((status, Some(body))) => (status, Json(body)).into_response(),
            Some((status, None)) => status.into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"errorMessages": ["No stub route"], "errors": {}})),
            )
                .into_response(),
        }
    }

    fn url_pairs(query: &str) -> Vec<(String, String)> {
        let url = reqwest::Url::parse(&format!("http://stub/?{query}")).unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Start a stub server and return it with its base URL.
    pub async fn start_stub() -> (Stub, String) {
        let stub = Stub::default();
        let app = Router::new().fallback(handle).with_state(stub.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        (stub, format!("http://127.0.0.1:{port}"))
    }

    pub fn config(base_url: &str) -> JiraConfig {
        JiraConfig::new(base_url, "alice@example.com", "token123").unwrap()
    }

    /// Tracker for `base_url` that ignores any proxy set in the environment.
    pub fn local_tracker(base_url: &str) -> RestTracker {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        RestTracker::with_client(&config(base_url), client).unwrap()
    }

    pub async fn tracker() -> (Stub, RestTracker) {
        let (stub, base_url) = start_stub().await;
        let tracker = local_tracker(&base_url);
        (stub, tracker)
    }

    pub fn myself_body() -> Value {
        json!({
            "accountId": "acc-alice",
            "displayName": "Alice",
            "emailAddress": "alice@example.com",
            "active": true
        })
    }
}

use helpers::*;

const BASIC_AUTH: &str = "Basic YWxpY2VAZXhhbXBsZS5jb206dG9rZW4xMjM=";

// =============================================================================
// Connection
// =============================================================================

#[tokio::test]
async fn test_connect_verifies_identity() {
    let (stub, base_url) = start_stub().await;
    stub.respond(Method::GET, "/rest/api/2/myself", StatusCode::OK, Some(myself_body()));

    let tracker = local_tracker(&base_url).verify().await;
    assert!(tracker.is_ok());

    let request = stub.last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/rest/api/2/myself");
    assert_eq!(request.authorization.as_deref(), Some(BASIC_AUTH));
}

#[tokio::test]
async fn test_connect_rejected_credentials() {
    let (stub, base_url) = start_stub().await;
    stub.respond(Method::GET, "/rest/api/2/myself", StatusCode::UNAUTHORIZED, None);

    let result = local_tracker(&base_url).verify().await;
    assert!(matches!(result, Err(Error::Auth(_))));
}

#[tokio::test]
async fn test_connect_unreachable_server() {
    // Bind and immediately drop a listener to get a port nobody serves
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = local_tracker(&format!("http://127.0.0.1:{port}"))
        .verify()
        .await;
    assert!(matches!(result, Err(Error::Http(_))));
}

// =============================================================================
// Issues
// =============================================================================

#[tokio::test]
async fn test_get_issue_reads_embedded_comments() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/issue/PROJ-7",
        StatusCode::OK,
        Some(json!({
            "id": "10007",
            "key": "PROJ-7",
            "self": "http://stub/rest/api/2/issue/10007",
            "fields": {
                "summary": "Broken build",
                "description": null,
                "status": {"name": "In Progress"},
                "issuetype": {"name": "Bug"},
                "priority": {"name": "High"},
                "assignee": null,
                "reporter": {"accountId": "r1", "displayName": "Rita", "active": true},
                "created": "2024-03-01T09:00:00.000+0000",
                "updated": "2024-03-02T09:00:00.000+0000",
                "comment": {
                    "comments": [
                        {"id": "1", "body": "first", "author": {"displayName": "Bob"}, "created": "c1"},
                        {"id": "2", "body": "second", "author": {"displayName": "Cy"}, "created": "c2"}
                    ],
                    "total": 2
                }
            }
        })),
    );

    let issue = tracker.get_issue(&IssueKey::new("PROJ-7")).await.unwrap();
    assert_eq!(issue.key, "PROJ-7");
    assert_eq!(issue.fields.status, Some(NamedRef::new("In Progress")));
    assert_eq!(issue.fields.assignee, None);
    let comments = issue.fields.comment.unwrap().comments;
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[tokio::test]
async fn test_get_issue_not_found_carries_message() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/issue/PROJ-404",
        StatusCode::NOT_FOUND,
        Some(json!({"errorMessages": ["Issue does not exist or you do not have permission to see it."], "errors": {}})),
    );

    match tracker.get_issue(&IssueKey::new("PROJ-404")).await {
        Err(Error::NotFound(message)) => assert!(message.contains("Issue does not exist")),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_issue_sends_only_given_fields() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::POST,
        "/rest/api/2/issue",
        StatusCode::CREATED,
        Some(json!({"id": "10010", "key": "PROJ-10", "self": "http://stub/rest/api/2/issue/10010"})),
    );

    let fields = FieldMap::for_create(&NewIssue {
        project_key: "PROJ".to_string(),
        summary: "New thing".to_string(),
        description: "Details".to_string(),
        issue_type: "Story".to_string(),
        priority: None,
        assignee_id: None,
    });
    let created = tracker.create_issue(&fields).await.unwrap();
    assert_eq!(created.key, "PROJ-10");
    assert_eq!(created.self_link, "http://stub/rest/api/2/issue/10010");

    let request = stub.last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.body,
        Some(json!({
            "fields": {
                "project": {"key": "PROJ"},
                "summary": "New thing",
                "description": "Details",
                "issuetype": {"name": "Story"}
            }
        }))
    );
}

#[tokio::test]
async fn test_create_issue_field_error() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::POST,
        "/rest/api/2/issue",
        StatusCode::BAD_REQUEST,
        Some(json!({"errorMessages": [], "errors": {"priority": "Field 'priority' cannot be set."}})),
    );

    let fields = FieldMap::builder().text("summary", "x").build();
    match tracker.create_issue(&fields).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "priority: Field 'priority' cannot be set.");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_fields_puts_field_map() {
    let (stub, tracker) = tracker().await;
    stub.respond(Method::PUT, "/rest/api/2/issue/PROJ-1", StatusCode::NO_CONTENT, None);

    let update = IssueUpdate {
        issue_key: IssueKey::new("PROJ-1"),
        priority: Some("Low".to_string()),
        ..Default::default()
    };
    tracker
        .update_fields(&update.issue_key, &FieldMap::for_update(&update))
        .await
        .unwrap();

    let request = stub.last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(
        request.body,
        Some(json!({"fields": {"priority": {"name": "Low"}}}))
    );
}

#[tokio::test]
async fn test_transitions_round_trip() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/issue/PROJ-1/transitions",
        StatusCode::OK,
        Some(json!({
            "expand": "transitions",
            "transitions": [
                {"id": "11", "name": "In Progress", "to": {"name": "In Progress"}},
                {"id": "31", "name": "Done", "to": {"name": "Done"}}
            ]
        })),
    );
    stub.respond(
        Method::POST,
        "/rest/api/2/issue/PROJ-1/transitions",
        StatusCode::NO_CONTENT,
        None,
    );

    let key = IssueKey::new("PROJ-1");
    let transitions = tracker.transitions(&key).await.unwrap();
    let names: Vec<&str> = transitions.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["In Progress", "Done"]);

    tracker.transition_issue(&key, "31").await.unwrap();
    assert_eq!(stub.last().body, Some(json!({"transition": {"id": "31"}})));
}

#[tokio::test]
async fn test_delete_issue() {
    let (stub, tracker) = tracker().await;
    stub.respond(Method::DELETE, "/rest/api/2/issue/PROJ-3", StatusCode::NO_CONTENT, None);

    tracker.delete_issue(&IssueKey::new("PROJ-3")).await.unwrap();
    assert_eq!(stub.last().method, Method::DELETE);
}

#[tokio::test]
async fn test_add_comment() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::POST,
        "/rest/api/2/issue/PROJ-1/comment",
        StatusCode::CREATED,
        Some(json!({
            "id": "100",
            "body": "Looks good",
            "author": {"accountId": "acc-alice", "displayName": "Alice"},
            "created": "2024-03-03T10:00:00.000+0000"
        })),
    );

    let comment = tracker
        .add_comment(&IssueKey::new("PROJ-1"), "Looks good")
        .await
        .unwrap();
    assert_eq!(comment.id, "100");
    assert_eq!(comment.author.unwrap().display_name, "Alice");
    assert_eq!(stub.last().body, Some(json!({"body": "Looks good"})));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_sends_query_parameters() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/search/jql",
        StatusCode::OK,
        Some(json!({
            "isLast": true,
            "issues": [{
                "id": "1",
                "key": "PROJ-1",
                "fields": {
                    "summary": "s",
                    "status": {"name": "Open"},
                    "issuetype": {"name": "Task"},
                    "assignee": null,
                    "updated": "u"
                }
            }]
        })),
    );

    let issues = tracker
        .search("project = PROJ AND status = Open", 5)
        .await
        .unwrap();
    assert_eq!(issues.len(), 1);

    let request = stub.last();
    assert_eq!(request.path, "/rest/api/2/search/jql");
    assert_eq!(
        request.query.get("jql").map(String::as_str),
        Some("project = PROJ AND status = Open")
    );
    assert_eq!(request.query.get("maxResults").map(String::as_str), Some("5"));
    assert_eq!(
        request.query.get("fields").map(String::as_str),
        Some("summary,status,issuetype,assignee,updated")
    );
}

#[tokio::test]
async fn test_search_avoids_removed_endpoint() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/search",
        StatusCode::GONE,
        Some(json!({
            "errorMessages": [
                "The requested API has been removed. Please migrate to the /rest/api/3/search/jql API."
            ],
            "errors": {}
        })),
    );
    stub.respond(
        Method::GET,
        "/rest/api/2/search/jql",
        StatusCode::OK,
        Some(json!({"issues": [{"id": "2", "key": "PROJ-2", "fields": {"summary": "found"}}]})),
    );

    let issues = tracker.search("key = PROJ-2", 1).await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].fields.summary.as_deref(), Some("found"));
    assert!(stub.seen().iter().all(|r| r.path != "/rest/api/2/search"));
}

#[tokio::test]
async fn test_search_users() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/user/search",
        StatusCode::OK,
        Some(json!([myself_body()])),
    );

    let users = tracker.search_users("alice@example.com").await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].account_id, "acc-alice");
    assert_eq!(
        stub.last().query.get("query").map(String::as_str),
        Some("alice@example.com")
    );
}

#[tokio::test]
async fn test_every_request_is_authenticated() {
    let (stub, tracker) = tracker().await;
    stub.respond(Method::GET, "/rest/api/2/user/search", StatusCode::OK, Some(json!([])));
    stub.respond(Method::DELETE, "/rest/api/2/issue/PROJ-1", StatusCode::NO_CONTENT, None);

    tracker.search_users("x").await.unwrap();
    tracker.delete_issue(&IssueKey::new("PROJ-1")).await.unwrap();

    let seen = stub.seen();
    assert_eq!(seen.len(), 2);
    assert!(seen
        .iter()
        .all(|r| r.authorization.as_deref() == Some(BASIC_AUTH)));
}

#[tokio::test]
async fn test_malformed_json_is_json_error() {
    let (stub, tracker) = tracker().await;
    stub.respond(
        Method::GET,
        "/rest/api/2/issue/PROJ-1",
        StatusCode::OK,
        Some(json!({"unexpected": true})),
    );

    let result = tracker.get_issue(&IssueKey::new("PROJ-1")).await;
    assert!(matches!(result, Err(Error::Json(_))));
}
