//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::BannerConfig;
use serde::Serialize;
use tracing::info;

use super::validate::vertex_auth;
use crate::cli::InfoArgs;
use crate::pipeline::service_mode;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    services: &'static str,
    credentials: CredentialInfo,
    vertex: VertexInfo,
    models: ModelInfo,
    paths: PathInfo,
    quality: QualityInfo,
    http_timeout_secs: u64,
}

#[derive(Serialize)]
struct CredentialInfo {
    gemini_api_key: String,
    gcp_project_id: String,
    vertex_auth: &'static str,
}

#[derive(Serialize)]
struct VertexInfo {
    location: String,
    base_url: String,
}

#[derive(Serialize)]
struct ModelInfo {
    text: String,
    image: String,
    edit: String,
}

#[derive(Serialize)]
struct PathInfo {
    temp_path: String,
    output_dir: String,
}

#[derive(Serialize)]
struct QualityInfo {
    score_threshold: u8,
    max_filename_len: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &BannerConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        services: service_mode(),
        credentials: CredentialInfo {
            gemini_api_key: mask_secret(&config.credentials.gemini_api_key),
            gcp_project_id: config.credentials.gcp_project_id.clone(),
            vertex_auth: vertex_auth(config),
        },
        vertex: VertexInfo {
            location: config.vertex.location.clone(),
            base_url: config.vertex.base_url(),
        },
        models: ModelInfo {
            text: config.models.text.clone(),
            image: config.models.image.clone(),
            edit: config.models.edit.clone(),
        },
        paths: PathInfo {
            temp_path: config.paths.temp_path().display().to_string(),
            output_dir: config.paths.output_dir.display().to_string(),
        },
        quality: QualityInfo {
            score_threshold: config.quality.score_threshold,
            max_filename_len: config.quality.max_filename_len,
        },
        http_timeout_secs: config.http.timeout_secs,
    }
}

/// Keep the first four characters of a secret
fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

fn print_config_info(config: &BannerConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Banner Gen Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔑 Credentials");
    println!("   ├─ Version: {:?}", config.version);
    println!(
        "   ├─ Gemini API key: {}",
        mask_secret(&config.credentials.gemini_api_key)
    );
    println!("   ├─ GCP project: {}", config.credentials.gcp_project_id);
    println!("   └─ Vertex auth: {}", vertex_auth(config));

    println!("\n🤖 Models ({})", service_mode());
    println!("   ├─ Text: {}", config.models.text);
    println!("   ├─ Image: {}", config.models.image);
    println!("   ├─ Edit: {}", config.models.edit);
    println!("   └─ Vertex: {}", config.vertex.base_url());

    println!("\n📁 Paths");
    println!("   ├─ Working image: {}", config.paths.temp_path().display());
    println!("   └─ Output: {}", config.paths.output_dir.display());

    println!("\n⚙️  Quality");
    println!("   ├─ Score threshold: {}/10", config.quality.score_threshold);
    println!("   ├─ Max file name: {} chars", config.quality.max_filename_len);
    println!("   └─ HTTP timeout: {}s", config.http.timeout_secs);

    println!();
}
