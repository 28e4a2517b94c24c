use std::{error::Error, sync::Arc};

use ai_llm_service::{config::default_config::config_from_env, llm_service::LlmService};
use api::core::{app_config::AppConfig, app_state::AppState};
use aws_config::{BehaviorVersion, Region};
use contextor::AskDefaults;
use knowledge_base::{BedrockKnowledgeBase, KbConfig, S3DocumentStore};
use tracing::info;

mod telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: every setting can come from the real environment.
    let dotenv = dotenvy::dotenv().ok();

    let app_config = AppConfig::from_env()?;
    telemetry::init(app_config.debug);

    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    let kb_config = KbConfig::from_env()?;
    let llm_config = config_from_env()?;
    let ask_defaults = AskDefaults::from_env()?;

    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(kb_config.region.clone()))
        .load()
        .await;

    info!(
        knowledge_base_id = kb_config.knowledge_base_id.as_deref().unwrap_or("<unset>"),
        data_source_id = kb_config.data_source_id.as_deref().unwrap_or("<unset>"),
        s3_bucket = kb_config.bucket.as_deref().unwrap_or("<unset>"),
        llm = %llm_config.provider.as_str(),
        model = %llm_config.model,
        "starting RAG application"
    );

    let knowledge_base = BedrockKnowledgeBase::new(kb_config.clone(), &aws)?;
    let documents = S3DocumentStore::new(&kb_config, &aws);
    let llm = LlmService::from_config(llm_config, &aws)?;

    let state = Arc::new(AppState::new(
        knowledge_base,
        documents,
        llm,
        ask_defaults,
        app_config,
    ));

    api::start(state).await?;

    Ok(())
}
