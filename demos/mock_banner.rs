//! Mock Banner Example
//!
//! Runs the whole banner pipeline against mock text and image services.
//! Nothing leaves the machine; artifacts land under `./demo-out` unless a
//! config file is given.
//!
//! Run with: cargo run -p demos --bin mock_banner -- [config.toml] [topic]

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::{AspectRatio, BannerRequest, PathConfig};
use model_clients::{MockImageClient, MockTextClient};
use observability::{LogFormat, ObservabilityConfig};
use workflow::{ArtifactStore, BannerPipeline, WorkflowSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        ..Default::default()
    })?;

    tracing::info!("Starting Mock Banner Demo");

    // ==== Stage 1: Use default paths or load from file ====
    let mut args = std::env::args().skip(1);
    let (store, settings) = match args.next() {
        Some(path) => {
            tracing::info!(path = %path, "Loading banner config");
            let config = ConfigLoader::load_from_path(Path::new(&path))?;
            (
                ArtifactStore::from_config(&config.paths)?,
                WorkflowSettings::from_config(&config),
            )
        }
        None => (
            ArtifactStore::from_config_under(Path::new("demo-out"), &PathConfig::default())?,
            WorkflowSettings::default(),
        ),
    };
    let topic = args
        .next()
        .unwrap_or_else(|| "Diwali Sale on Premium Ghee 1kg Jar".to_string());

    // ==== Stage 2: Wire mock services ====
    let text = MockTextClient::new();
    let images = MockImageClient::new();
    let pipeline = BannerPipeline::new(
        text.clone(),
        images.clone(),
        images.clone(),
        store,
        settings,
    );

    // ==== Stage 3: Run ====
    let request = BannerRequest::new(topic)
        .with_aspect_ratio(AspectRatio::Landscape16x9)
        .with_quality_check(true);
    let (outcome, timings) = pipeline.execute_timed(&request).await?;

    // ==== Stage 4: Report ====
    tracing::info!(
        output = %outcome.output_path.display(),
        edit_passes = outcome.edit_passes,
        text_calls = text.call_count(),
        image_generations = images.generate_count(),
        image_edits = images.edit_count(),
        "Banner finished"
    );
    for critique in &outcome.critiques {
        for score in critique.failing_categories() {
            tracing::info!(category = %score.category, score = score.score, "Below threshold");
        }
    }
    println!("{timings}");

    Ok(())
}
