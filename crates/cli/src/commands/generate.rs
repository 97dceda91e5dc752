//! `plansmith generate` — Run the generation pipeline for one request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use plansmith_config::AppConfig;
use plansmith_core::memory::DocumentIndex;
use plansmith_core::provider::Provider;
use plansmith_memory::{InMemoryIndex, NoopIndex, load_documents};
use plansmith_scheduler::{GenerationOutcome, RetryController, ScheduleWorkflow, normalize};
use tracing::{info, warn};

pub async fn run(
    user_id: i64,
    docs: Vec<PathBuf>,
    dry_run: bool,
    prompt: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    if !config.has_api_key() {
        warn!("No API key configured; set OPENAI_API_KEY or run `plansmith onboard`");
    }

    let provider = plansmith_providers::build_from_config(&config);
    let index = build_index(&config, provider.clone(), &docs).await;

    let controller = RetryController::from_config(
        &config.generation,
        provider,
        config.model.clone(),
        index,
        Duration::from_secs(config.request_timeout_secs),
    );

    if dry_run {
        return match controller.run(&prompt).await {
            GenerationOutcome::Succeeded { schedule, attempts } => {
                info!(attempts = attempts.len(), "Dry run: schedule not saved");
                println!("{}", serde_json::to_string_pretty(&normalize(&schedule))?);
                Ok(())
            }
            failed @ GenerationOutcome::Failed { .. } => {
                Err(failed.failure_message().unwrap_or_default().into())
            }
        };
    }

    let store = Arc::new(super::open_store(&config).await?);
    let workflow = ScheduleWorkflow::new(controller, store);
    let report = workflow.generate_and_save(&prompt, user_id).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.is_success() {
        Ok(())
    } else {
        Err(report.message.into())
    }
}

/// Replace the index with the given documents. Ingestion problems are
/// logged and generation proceeds without grounding.
async fn build_index(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    docs: &[PathBuf],
) -> Arc<dyn DocumentIndex> {
    if docs.is_empty() {
        return Arc::new(NoopIndex);
    }

    let documents = load_documents(docs).await;
    let index = InMemoryIndex::new(provider, config.embedding_model.clone())
        .with_chunking(config.ingestion.chunk_size, config.ingestion.chunk_overlap);

    if let Err(e) = index.replace_documents(&documents).await {
        warn!(error = %e, "Error inserting document embeddings, continuing without context");
    }

    Arc::new(index)
}
