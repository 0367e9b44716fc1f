mod common;

use std::sync::Arc;

use common::{dam_square, TestSetup};
use http::StatusCode;
use persona_storage::FileSystemPersonaStore;
use serde_json::json;
use tempfile::TempDir;
use travelbot_backend::generator::mock::MockChatApi;

fn setup() -> TestSetup {
    TestSetup::new(dam_square(), MockChatApi::replying("Hallo"))
}

#[tokio::test]
async fn test_list_builtin_personas() {
    let context = setup();

    let response = context
        .send_get_request_with_key("/personas", None)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");

    let styles: Vec<&str> = body
        .as_array()
        .expect("Expected an array")
        .iter()
        .map(|persona| persona["style"].as_str().unwrap())
        .collect();
    assert_eq!(styles, vec!["Jordanees", "Belg", "Brabander"]);
    assert_eq!(body[1]["voice"], json!({"pitch": 1.1, "speechRate": 0.95}));
}

#[tokio::test]
async fn test_upload_then_fetch_persona() {
    let context = setup();

    let response = context
        .send_post_request(
            "/personas",
            json!({"name": "Haagse Harry", "description": "Zegt het zoals het is"}),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["id"], "haagse-harry");

    let response = context
        .send_get_request("/personas/haagse-harry")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["name"], "Haagse Harry");
    assert_eq!(body["description"], "Zegt het zoals het is");
}

#[tokio::test]
async fn test_upload_requires_name_and_description() {
    let context = setup();

    for payload in [
        json!({"name": "test_persona"}),
        json!({"description": "Alleen een beschrijving"}),
        json!({"name": " ", "description": " "}),
    ] {
        let response = context
            .send_post_request("/personas", payload)
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = context
            .parse_response_body(response)
            .await
            .expect("Failed to parse response");
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "Name and description are required");
    }

    assert!(context.store.list_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_requires_api_key() {
    let context = setup();

    let response = context
        .send_post_request_with_key(
            "/personas",
            json!({"name": "Zeeuw", "description": "Zuinig"}),
            None,
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(context.store.list_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_unknown_persona() {
    let context = setup();

    let response = context
        .send_get_request("/personas/nonexistent")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "persona_not_found");
    assert_eq!(body["error"]["message"], "Persona not found");
}

#[tokio::test]
async fn test_get_persona_requires_api_key() {
    let context = setup();

    let response = context
        .send_get_request_with_key("/personas/nonexistent", None)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_marketplace_lists_uploaded_personas_sorted() {
    let context = setup();

    for (name, description) in [
        ("Zeeuw", "Zuinig"),
        ("Amsterdammer", "Direct"),
        ("Limburger", "Zachtaardig"),
    ] {
        let response = context
            .send_post_request("/personas", json!({"name": name, "description": description}))
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = context
        .send_get_request_with_key("/personas/marketplace", None)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(
        body,
        json!([
            {"name": "Amsterdammer", "description": "Direct"},
            {"name": "Limburger", "description": "Zachtaardig"},
            {"name": "Zeeuw", "description": "Zuinig"}
        ])
    );
}

#[tokio::test]
async fn test_marketplace_skips_malformed_files() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("broken.json"),
        "{ this is not json",
    )
    .expect("Failed to write record");
    std::fs::write(
        dir.path().join("henk.json"),
        r#"{"name": "Henk", "description": "Uit de Jordaan"}"#,
    )
    .expect("Failed to write record");

    let store = Arc::new(FileSystemPersonaStore::new(dir.path()));
    let context = TestSetup::with_store(dam_square(), MockChatApi::replying("Hallo"), store);

    let response = context
        .send_get_request("/personas/marketplace")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body, json!([{"name": "Henk", "description": "Uit de Jordaan"}]));
}

#[tokio::test]
async fn test_custom_persona_drives_comment() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(FileSystemPersonaStore::new(dir.path()));
    let context = TestSetup::with_store(dam_square(), MockChatApi::replying("Hoi"), store);

    let response = context
        .send_post_request(
            "/personas",
            json!({
                "name": "Rotterdammer",
                "description": "Niet lullen maar poetsen",
                "systemPrompt": "Je bent Sjaak uit Rotterdam-Zuid. Je werkt in de haven.",
                "languageOverrides": {"en": {"Je werkt in de haven.": "You work in the port."}}
            }),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(dir.path().join("rotterdammer.json").exists());

    let response = context
        .send_post_request(
            "/comment",
            json!({"lat": 52.3676, "lon": 4.9041, "persona": "rotterdammer", "language": "en"}),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let sent = &context.chat.requests()[0];
    assert_eq!(sent.system_message, "You are Sjaak uit Rotterdam-Zuid.");
    assert!(sent.user_message.starts_with(
        "You are Sjaak uit Rotterdam-Zuid. You work in the port.\n"
    ));
}
