mod common;

use common::{dam_square, TestSetup};
use http::StatusCode;
use serde_json::json;
use travelbot_backend::generator::{mock::MockChatApi, FALLBACK_LINE};
use travelbot_backend::place::mock::{MockFailure, MockPlaceApi};
use travelbot_backend::place::LOOKUP_UNREACHABLE;

#[tokio::test]
async fn test_comment_returns_generated_text() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("Allez, wat een plein!"));

    let response = context
        .send_post_request("/comment", json!({"lat": 52.3676, "lon": 4.9041, "style": "Belg"}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body, json!({"text": "Allez, wat een plein!"}));

    let requests = context.chat.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_message.contains("Antwerpen"));
    assert!(requests[0].user_message.contains("A historic square in Amsterdam."));
}

#[tokio::test]
async fn test_comment_generator_failure_is_not_a_server_error() {
    let context = TestSetup::new(dam_square(), MockChatApi::failing());

    let response = context
        .send_post_request("/comment", json!({"lat": 52.3676, "lon": 4.9041, "style": "Belg"}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["text"], FALLBACK_LINE);
}

#[tokio::test]
async fn test_comment_place_service_down() {
    let context = TestSetup::new(
        dam_square().failing_search(MockFailure::Network),
        MockChatApi::replying("Geen idee waar we zijn."),
    );

    let response = context
        .send_post_request("/comment", json!({"lat": 52.3676, "lon": 4.9041}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(context.chat.requests()[0]
        .user_message
        .contains(LOOKUP_UNREACHABLE));
}

#[tokio::test]
async fn test_comment_missing_coordinates() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("Hallo"));

    for payload in [json!({"lon": 4.9}), json!({"lat": 52.3}), json!({})] {
        let response = context
            .send_post_request("/comment", payload)
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = context
            .parse_response_body(response)
            .await
            .expect("Failed to parse response");
        assert_eq!(body["error"]["code"], "missing_coordinates");
        assert_eq!(body["error"]["message"], "Coordinates are required");
        assert_eq!(body["allowRetry"], false);
    }

    assert_eq!(context.places.search_calls(), 0);
}

#[tokio::test]
async fn test_comment_out_of_range_coordinates() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("Hallo"));

    let response = context
        .send_post_request("/comment", json!({"lat": 152.3, "lon": 4.9}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "invalid_coordinates");
}

#[tokio::test]
async fn test_comment_requires_api_key() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("Hallo"));
    let payload = json!({"lat": 52.3676, "lon": 4.9041});

    let response = context
        .send_post_request_with_key("/comment", payload.clone(), None)
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["error"]["message"], "API key is required");

    let response = context
        .send_post_request_with_key("/comment", payload, Some("not-the-key"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "invalid_api_key");

    assert!(context.chat.requests().is_empty());
}

#[tokio::test]
async fn test_comment_english_with_question() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("It's the Dam, mate."));

    let response = context
        .send_post_request(
            "/comment",
            json!({
                "lat": 52.3676,
                "lon": 4.9041,
                "question": "What is this place?",
                "language": "en"
            }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let prompt = &context.chat.requests()[0].user_message;
    assert!(prompt.contains("Someone asks you: 'What is this place?'. What do you say?"));
    assert!(prompt.contains("Jordaan"));
}

#[tokio::test]
async fn test_comment_unknown_language_is_rejected() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("Hallo"));

    let response = context
        .send_post_request("/comment", json!({"lat": 52.3676, "lon": 4.9041, "language": "fr"}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = context
        .parse_response_body(response)
        .await
        .expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "invalid_json");
}

#[tokio::test]
async fn test_comment_is_cached_per_location() {
    let context = TestSetup::new(dam_square(), MockChatApi::replying("Druk hier!"));
    let payload = json!({"lat": 52.3676, "lon": 4.9041, "style": "Brabander"});

    for _ in 0..3 {
        let response = context
            .send_post_request("/comment", payload.clone())
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(context.places.search_calls(), 1);
    assert_eq!(context.chat.requests().len(), 1);
}

#[tokio::test]
async fn test_comment_nothing_nearby() {
    let context = TestSetup::new(MockPlaceApi::new(&[], None), MockChatApi::replying("Leeg hier."));

    let response = context
        .send_post_request("/comment", json!({"lat": 0.0, "lon": -30.0}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(context.chat.requests()[0]
        .user_message
        .contains("Er is hier niet veel bijzonders."));
}
