use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use persona_storage::{InMemoryPersonaStore, PersonaStore};
use tower::ServiceExt;
use travelbot_backend::{
    commentary::CommentaryPipeline,
    generator::{mock::MockChatApi, CommentaryGenerator},
    persona::PersonaCatalog,
    place::{mock::MockPlaceApi, PlaceResolver},
    server,
    types::{AppConfig, Environment},
};

/// Client key accepted by every [`TestSetup`] router
pub const TEST_API_KEY: &str = "test-client-key";

/// Setup test environment variables and logging
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to mocked upstream services
pub struct TestSetup {
    pub router: Router,
    pub places: Arc<MockPlaceApi>,
    pub chat: Arc<MockChatApi>,
    pub store: Arc<dyn PersonaStore>,
}

impl TestSetup {
    /// Development router over an in-memory persona store
    pub fn new(places: MockPlaceApi, chat: MockChatApi) -> Self {
        Self::with_store(places, chat, Arc::new(InMemoryPersonaStore::new()))
    }

    /// Development router over `store`
    pub fn with_store(places: MockPlaceApi, chat: MockChatApi, store: Arc<dyn PersonaStore>) -> Self {
        Self::build(Environment::Development, places, chat, store)
    }

    /// Router for `environment` with Dam Square as the only nearby place
    pub fn for_environment(environment: Environment) -> Self {
        Self::build(
            environment,
            dam_square(),
            MockChatApi::replying("Hallo"),
            Arc::new(InMemoryPersonaStore::new()),
        )
    }

    fn build(
        environment: Environment,
        places: MockPlaceApi,
        chat: MockChatApi,
        store: Arc<dyn PersonaStore>,
    ) -> Self {
        setup_test_env();

        let places = Arc::new(places);
        let chat = Arc::new(chat);
        let config = Arc::new(AppConfig {
            client_api_keys: vec![TEST_API_KEY.to_string()],
            ..AppConfig::default()
        });

        let catalog = Arc::new(PersonaCatalog::new(store.clone(), config.builtin_cache_ttl));
        let pipeline = Arc::new(CommentaryPipeline::new(
            PlaceResolver::new(places.clone(), places.clone()),
            catalog.clone(),
            CommentaryGenerator::new(chat.clone()),
            &config,
        ));

        let router = server::router(environment, config, pipeline, catalog);

        Self {
            router,
            places,
            chat,
            store,
        }
    }

    /// POSTs `payload` with the test API key
    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_post_request_with_key(route, payload, Some(TEST_API_KEY))
            .await
    }

    /// POSTs `payload` with the given API key, or none
    pub async fn send_post_request_with_key(
        &self,
        route: &str,
        payload: serde_json::Value,
        api_key: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("X-API-KEY", key);
        }
        let request = builder.body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// GETs `route` with the test API key
    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_get_request_with_key(route, Some(TEST_API_KEY))
            .await
    }

    /// GETs `route` with the given API key, or none
    pub async fn send_get_request_with_key(
        &self,
        route: &str,
        api_key: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method("GET");
        if let Some(key) = api_key {
            builder = builder.header("X-API-KEY", key);
        }
        let request = builder.body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }
}

/// Places service knowing only Dam Square
pub fn dam_square() -> MockPlaceApi {
    MockPlaceApi::new(&["Dam Square"], Some("A historic square in Amsterdam."))
}
