//! `generate` command implementation.

use anyhow::{Context, Result};
use contracts::{BannerConfig, BannerRequest};
use tracing::{info, warn};
use workflow::output_file_name;

use crate::cli::GenerateArgs;
use crate::error::CliError;
use crate::pipeline::{run_banner, service_mode};

/// Execute the `generate` command
pub async fn run_generate(args: &GenerateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let request = build_request(args)?;

    info!(
        topic = %request.topic,
        images = request.images.len(),
        aspect_ratio = ?request.aspect_ratio,
        quality_check = request.quality_check,
        services = service_mode(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration and request are valid, exiting");
        print_plan(&config, &request);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    info!("Starting banner run...");

    tokio::select! {
        result = run_banner(&config, &request) => {
            let report = result?;
            if args.json {
                println!("{}", report.to_json().context("Failed to serialize run report")?);
            } else {
                report.print_summary();
            }
        }
        signal = shutdown_signal() => {
            warn!(signal, "Received shutdown signal, aborting banner run");
            return Err(CliError::Aborted { signal }.into());
        }
    }

    info!("Banner Gen finished");
    Ok(())
}

fn build_request(args: &GenerateArgs) -> Result<BannerRequest, CliError> {
    let mut request = BannerRequest::new(args.topic.clone())
        .with_images(args.images.iter().cloned())
        .with_quality_check(args.quality_check);
    if let Some(ratio) = args.aspect_ratio {
        request = request.with_aspect_ratio(ratio);
    }

    request
        .validate()
        .map_err(|e| CliError::invalid_request(e.to_string()))?;
    if let Some(missing) = request.images.iter().find(|p| !p.is_file()) {
        return Err(CliError::invalid_request(format!(
            "reference image not found: {}",
            missing.display()
        )));
    }
    Ok(request)
}

/// Resolves on Ctrl+C or SIGTERM with the signal's name
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    }
}

/// Print the planned run for dry-run mode
fn print_plan(config: &BannerConfig, request: &BannerRequest) {
    let output_name = output_file_name(&request.topic, config.quality.max_filename_len);

    println!("\n=== Banner Plan ===\n");
    println!("Request:");
    println!("  Topic: {}", request.topic);
    match request.aspect_ratio {
        Some(ratio) => println!("  Aspect ratio: {}", ratio),
        None => println!("  Aspect ratio: (service default)"),
    }
    println!("  Quality check: {}", request.quality_check);
    if !request.images.is_empty() {
        println!("  Reference images ({}):", request.images.len());
        for image in &request.images {
            println!("    - {}", image.display());
        }
    }

    println!("\nModels ({}):", service_mode());
    println!("  Text: {}", config.models.text);
    println!("  Image: {}", config.models.image);
    println!("  Edit: {}", config.models.edit);
    println!("  Vertex location: {}", config.vertex.location);

    println!("\nFiles:");
    println!("  Working image: {}", config.paths.temp_path().display());
    println!(
        "  Output: {}",
        config.paths.output_dir.join(output_name).display()
    );

    let edits = if request.quality_check { 2 } else { 1 };
    let text_calls = if request.images.is_empty() { 4 } else { 5 } + edits;
    println!("\nPlanned calls: {text_calls} text, 1 image generation, {edits} edit");
    println!();
}
