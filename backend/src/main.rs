use std::sync::Arc;

use persona_storage::{FileSystemPersonaStore, InMemoryPersonaStore, PersonaStore};
use tracing_subscriber::{fmt, EnvFilter};
use travelbot_backend::{
    commentary::CommentaryPipeline,
    generator::{CommentaryGenerator, OpenAiClient},
    persona::PersonaCatalog,
    place::{PlaceResolver, WikipediaClient},
    server,
    types::{AppConfig, Environment},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Use JSON format for staging/production, regular format for development
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().as_str()));
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env(&environment)?);
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, every remark will be the fallback line");
    }
    if config.client_api_keys.is_empty() {
        tracing::warn!("CLIENT_API_KEYS not set, API key gate is open");
    }

    let store: Arc<dyn PersonaStore> = match &config.persona_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Using file-system persona store");
            Arc::new(FileSystemPersonaStore::new(dir.clone()))
        }
        None => {
            tracing::info!("PERSONA_DIR not set, custom personas are kept in memory");
            Arc::new(InMemoryPersonaStore::new())
        }
    };
    let catalog = Arc::new(PersonaCatalog::new(store, config.builtin_cache_ttl));

    let wikipedia = Arc::new(WikipediaClient::new(&config)?);
    let resolver = PlaceResolver::new(wikipedia.clone(), wikipedia);
    let generator = CommentaryGenerator::new(Arc::new(OpenAiClient::new(&config)?));

    let pipeline = Arc::new(CommentaryPipeline::new(
        resolver,
        catalog.clone(),
        generator,
        &config,
    ));

    server::start(environment, config, pipeline, catalog).await
}
