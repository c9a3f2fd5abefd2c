//! MCP server tests

use super::*;
use rmcp::model::ErrorCode;
use serde_json::{json, Value};

fn setup_test_server() -> SanctuaryMcpServer {
    let db = Database::in_memory().expect("Failed to create test database");
    SanctuaryMcpServer::new(db)
}

/// Parse the JSON text payload of a successful tool call
fn payload(result: CallToolResult) -> Value {
    let raw = serde_json::to_value(&result).unwrap();
    let text = raw["content"][0]["text"]
        .as_str()
        .expect("tool result should carry text content");
    serde_json::from_str(text).unwrap()
}

fn params<T: serde::de::DeserializeOwned>(value: Value) -> Parameters<T> {
    Parameters(serde_json::from_value(value).unwrap())
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("cannot encode"))
    }
}

#[test]
fn test_serialization_failure_is_internal_error() {
    let err = into_tool_result("get_insights", Ok(Unserializable)).unwrap_err();
    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert!(err.message.contains("cannot encode"));
}

#[test]
fn test_server_info() {
    let server = setup_test_server();
    let info = server.get_info();
    assert_eq!(info.server_info.name, "sanctuary");
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.resources.is_none());
    assert!(info.instructions.is_some());
}

#[test]
fn test_all_tools_registered() {
    let server = setup_test_server();
    let mut names: Vec<String> = server
        .tool_router
        .list_all()
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "get_insights",
            "get_interactions",
            "get_rituals",
            "log_interaction",
            "log_ritual",
            "query_emotions_by_model",
            "query_ritual_insights",
        ]
    );
}

#[tokio::test]
async fn test_log_and_list_interactions() {
    let server = setup_test_server();

    let logged = server
        .log_interaction(params(json!({
            "familiar_id": "owl",
            "interaction_type": "vision",
            "emotions": [{"name": "awe", "intensity": 0.9}],
            "model_id": "claude",
            "timestamp": "2024-06-20T22:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(payload(logged)["id"], 1);

    let listed = server
        .get_interactions(params(json!({"model_id": "claude"})))
        .await
        .unwrap();
    let entries = payload(listed);
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["familiar_id"], "owl");
    assert_eq!(entries[0]["emotions"][0]["name"], "awe");
}

#[tokio::test]
async fn test_validation_maps_to_invalid_params() {
    let server = setup_test_server();

    let err = server
        .log_ritual(params(json!({
            "ritual_name": "Moon Rite",
            "success": true,
            "emotions": [{"name": "joy", "intensity": 1.5}]
        })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = server
        .get_rituals(params(json!({"start": {"not": "a timestamp"}})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_insight_tools() {
    let server = setup_test_server();

    server
        .log_ritual(params(json!({
            "ritual_name": "Moon Rite",
            "success": true,
            "emotions": [{"name": "joy", "intensity": 0.8}],
            "timestamp": 1718942400
        })))
        .await
        .unwrap();

    let insights = payload(server.get_insights().await.unwrap());
    let insights = insights.as_array().unwrap();
    assert_eq!(insights.len(), 3);
    assert_eq!(insights[1]["metrics"]["success_rate"], 1.0);
    assert_eq!(insights[1]["related_entities"]["rituals"][0], "Moon Rite");

    let by_model = payload(server.query_emotions_by_model().await.unwrap());
    assert_eq!(by_model["unknown"]["joy"], 1);

    let none = payload(
        server
            .query_ritual_insights(params(json!({"ritual_name": "Sun Rite"})))
            .await
            .unwrap(),
    );
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_sessions_share_database() {
    let shared = Arc::new(Mutex::new(
        Database::in_memory().expect("Failed to create test database"),
    ));
    let writer = SanctuaryMcpServer::with_shared(shared.clone());
    let reader = SanctuaryMcpServer::with_shared(shared);

    writer
        .log_interaction(params(json!({
            "familiar_id": "gardener",
            "interaction_type": "conversation"
        })))
        .await
        .unwrap();

    let entries = payload(
        reader
            .get_interactions(params(json!({})))
            .await
            .unwrap(),
    );
    assert_eq!(entries.as_array().unwrap().len(), 1);
}
