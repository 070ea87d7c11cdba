//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::BannerConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    location: String,
    text_model: String,
    image_model: String,
    edit_model: String,
    output_dir: String,
    vertex_auth: &'static str,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    location: config.vertex.location.clone(),
                    text_model: config.models.text.clone(),
                    image_model: config.models.image.clone(),
                    edit_model: config.models.edit.clone(),
                    output_dir: config.paths.output_dir.display().to_string(),
                    vertex_auth: vertex_auth(&config),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

pub(crate) fn vertex_auth(config: &BannerConfig) -> &'static str {
    if config.credentials.access_token.is_some() {
        "static token"
    } else {
        "gcloud CLI"
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &BannerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.credentials.access_token.is_none() {
        warnings.push(
            "No Vertex access token configured - `gcloud auth print-access-token` will be used"
                .to_string(),
        );
    }

    if config.paths.temp_dir == config.paths.output_dir {
        warnings.push(format!(
            "Working image shares the output directory ({}) and will be listed with the banners",
            config.paths.output_dir.display()
        ));
    }

    if config.quality.score_threshold == 10 {
        warnings.push(
            "quality.score_threshold is 10 - every critique category short of perfect gets fixes"
                .to_string(),
        );
    }

    if config.vertex.endpoint.is_some() || config.models.gemini_endpoint.is_some() {
        warnings.push("Custom service endpoints configured".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Vertex location: {}", summary.location);
            println!("  Vertex auth: {}", summary.vertex_auth);
            println!("  Text model: {}", summary.text_model);
            println!("  Image model: {}", summary.image_model);
            println!("  Edit model: {}", summary.edit_model);
            println!("  Output directory: {}", summary.output_dir);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
