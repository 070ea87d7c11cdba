//! Configuration validation
//!
//! Rules:
//! - credentials and project id are non-empty
//! - location and model names are non-empty
//! - the working image is a `.jpg` file name, not a path
//! - score_threshold within 1..=10
//! - max_filename_len > 0, timeout_secs > 0

use contracts::{BannerConfig, ContractError};

/// Validate a BannerConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &BannerConfig) -> Result<(), ContractError> {
    validate_credentials(config)?;
    validate_models(config)?;
    validate_paths(config)?;
    validate_quality(config)?;
    validate_http(config)?;
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::config_validation(field, "cannot be empty"));
    }
    Ok(())
}

fn validate_credentials(config: &BannerConfig) -> Result<(), ContractError> {
    require_non_empty(
        "credentials.gemini_api_key",
        &config.credentials.gemini_api_key,
    )?;
    require_non_empty(
        "credentials.gcp_project_id",
        &config.credentials.gcp_project_id,
    )?;
    if let Some(token) = &config.credentials.access_token {
        require_non_empty("credentials.access_token", token)?;
    }
    require_non_empty("vertex.location", &config.vertex.location)?;
    Ok(())
}

fn validate_models(config: &BannerConfig) -> Result<(), ContractError> {
    require_non_empty("models.text", &config.models.text)?;
    require_non_empty("models.image", &config.models.image)?;
    require_non_empty("models.edit", &config.models.edit)?;
    Ok(())
}

fn validate_paths(config: &BannerConfig) -> Result<(), ContractError> {
    let temp_file = &config.paths.temp_file;
    require_non_empty("paths.temp_file", temp_file)?;

    if temp_file.contains('/') || temp_file.contains('\\') {
        return Err(ContractError::config_validation(
            "paths.temp_file",
            format!("temp_file must be a file name, got '{temp_file}'"),
        ));
    }

    if !temp_file.to_lowercase().ends_with(".jpg") {
        return Err(ContractError::config_validation(
            "paths.temp_file",
            format!("temp_file must end with .jpg, got '{temp_file}'"),
        ));
    }

    if config.paths.output_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "paths.output_dir",
            "cannot be empty",
        ));
    }
    Ok(())
}

fn validate_quality(config: &BannerConfig) -> Result<(), ContractError> {
    let threshold = config.quality.score_threshold;
    if !(1..=10).contains(&threshold) {
        return Err(ContractError::config_validation(
            "quality.score_threshold",
            format!("score_threshold must be within 1..=10, got {threshold}"),
        ));
    }

    if config.quality.max_filename_len == 0 {
        return Err(ContractError::config_validation(
            "quality.max_filename_len",
            "max_filename_len must be > 0",
        ));
    }
    Ok(())
}

fn validate_http(config: &BannerConfig) -> Result<(), ContractError> {
    if config.http.timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "http.timeout_secs",
            "timeout_secs must be > 0",
        ));
    }
    Ok(())
}
