//! Service wiring.
//!
//! With the `remote` feature the pipeline talks to Gemini and Vertex AI;
//! without it, to the in-process mocks.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{BannerConfig, BannerRequest, ImageEditor, ImageGenerator, TextGenerator};
use tracing::info;
use workflow::{ArtifactStore, BannerPipeline, WorkflowSettings};

use super::stats::RunReport;

/// Which service implementations this binary was built with
pub fn service_mode() -> &'static str {
    if cfg!(feature = "remote") {
        "remote"
    } else {
        "mock"
    }
}

/// Build the pipeline for `config` and run one banner
pub async fn run_banner(config: &BannerConfig, request: &BannerRequest) -> Result<RunReport> {
    let store = ArtifactStore::from_config(&config.paths)
        .context("Failed to prepare image directories")?;
    let settings = WorkflowSettings::from_config(config);

    #[cfg(feature = "remote")]
    return run_remote(config, store, settings, request).await;

    #[cfg(not(feature = "remote"))]
    return run_mock(store, settings, request).await;
}

#[cfg(feature = "remote")]
async fn run_remote(
    config: &BannerConfig,
    store: ArtifactStore,
    settings: WorkflowSettings,
    request: &BannerRequest,
) -> Result<RunReport> {
    use model_clients::{GeminiTextClient, VertexImageClient};

    let text = GeminiTextClient::from_config(config).context("Failed to build Gemini client")?;
    let images = VertexImageClient::from_config(config).context("Failed to build Vertex client")?;
    info!(
        text_model = %config.models.text,
        image_model = %config.models.image,
        edit_model = %config.models.edit,
        location = %config.vertex.location,
        "Hosted model clients ready"
    );

    let pipeline = BannerPipeline::new(text, images.clone(), images, store, settings);
    run_with(pipeline, request).await
}

#[cfg(not(feature = "remote"))]
async fn run_mock(
    store: ArtifactStore,
    settings: WorkflowSettings,
    request: &BannerRequest,
) -> Result<RunReport> {
    use model_clients::{MockImageClient, MockTextClient};

    info!("Built without `remote`; using mock model clients");
    let images = MockImageClient::new();
    let text = MockTextClient::new();
    let pipeline = BannerPipeline::new(text, images.clone(), images, store, settings);
    run_with(pipeline, request).await
}

async fn run_with<T, I, E>(
    pipeline: BannerPipeline<T, I, E>,
    request: &BannerRequest,
) -> Result<RunReport>
where
    T: TextGenerator + Sync,
    I: ImageGenerator + Sync,
    E: ImageEditor + Sync,
{
    let started = Instant::now();
    let (outcome, timings) = pipeline
        .execute_timed(request)
        .await
        .context("Banner generation failed")?;

    Ok(RunReport {
        outcome,
        timings,
        duration: started.elapsed(),
        services: service_mode(),
    })
}
