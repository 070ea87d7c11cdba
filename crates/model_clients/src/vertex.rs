//! Vertex AI image client
//!
//! Imagen generation and edit both go through the publisher model
//! `:predict` endpoint; only the instance/parameter shapes differ.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use contracts::{
    BannerConfig, ContractError, ImageData, ImageEditRequest, ImageEditor,
    ImageGenerationRequest, ImageGenerator, MIME_PNG,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::auth::AccessTokenSource;
use crate::error::{ClientError, Result};
use crate::http::{self, RequestAuth};

const SERVICE: &str = "vertex";

/// Imagen generate/edit over the Vertex AI REST API
///
/// Clones share the HTTP connection pool and the cached access token.
#[derive(Clone)]
pub struct VertexImageClient {
    client: Client,
    base_url: String,
    project: String,
    location: String,
    image_model: String,
    edit_model: String,
    tokens: Arc<AccessTokenSource>,
}

impl VertexImageClient {
    /// Create a client from the loaded configuration
    pub fn from_config(config: &BannerConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(SERVICE, Duration::from_secs(config.http.timeout_secs))?,
            base_url: config.vertex.base_url().trim_end_matches('/').to_string(),
            project: config.credentials.gcp_project_id.clone(),
            location: config.vertex.location.clone(),
            image_model: config.models.image.clone(),
            edit_model: config.models.edit.clone(),
            tokens: Arc::new(AccessTokenSource::from_credentials(&config.credentials)),
        })
    }

    fn predict_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.base_url, self.project, self.location, model
        )
    }

    async fn predict<I, P>(
        &self,
        model: &str,
        body: &PredictRequest<I, P>,
    ) -> Result<Vec<ImageData>>
    where
        I: Serialize,
        P: Serialize,
    {
        let token = self.tokens.token().await?;
        let response: PredictResponse = http::post_json(
            &self.client,
            SERVICE,
            &self.predict_url(model),
            RequestAuth::Bearer(&token),
            body,
        )
        .await?;
        let images = extract_predictions(response)?;
        debug!(model, images = images.len(), "vertex predictions decoded");
        Ok(images)
    }
}

impl ImageGenerator for VertexImageClient {
    fn name(&self) -> &str {
        SERVICE
    }

    #[instrument(
        name = "vertex_generate_images",
        skip(self, request),
        fields(model = %self.image_model, aspect_ratio = ?request.aspect_ratio)
    )]
    async fn generate_images(
        &self,
        request: ImageGenerationRequest,
    ) -> std::result::Result<Vec<ImageData>, ContractError> {
        let body = generation_body(&request);
        Ok(self.predict(&self.image_model, &body).await?)
    }
}

impl ImageEditor for VertexImageClient {
    fn name(&self) -> &str {
        SERVICE
    }

    #[instrument(
        name = "vertex_edit_image",
        skip(self, request),
        fields(
            model = %self.edit_model,
            edit_mode = request.edit_mode.as_str(),
            mask_mode = request.mask_mode.as_str()
        )
    )]
    async fn edit_image(
        &self,
        request: ImageEditRequest,
    ) -> std::result::Result<Vec<ImageData>, ContractError> {
        let body = edit_body(&request);
        Ok(self.predict(&self.edit_model, &body).await?)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest<I, P> {
    instances: Vec<I>,
    parameters: P,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationParameters {
    sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditInstance {
    prompt: String,
    image: EncodedImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodedImage {
    bytes_base64_encoded: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditParameters {
    sample_count: u32,
    edit_config: EditConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditConfig {
    edit_mode: String,
    mask_mode: MaskConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaskConfig {
    mask_type: String,
}

/// Generation body; `aspectRatio` only when the caller supplied one
pub(crate) fn generation_body(
    request: &ImageGenerationRequest,
) -> PredictRequest<GenerationInstance, GenerationParameters> {
    PredictRequest {
        instances: vec![GenerationInstance {
            prompt: request.prompt.clone(),
        }],
        parameters: GenerationParameters {
            sample_count: request.sample_count.max(1),
            aspect_ratio: request.aspect_ratio.map(|r| r.as_str().to_string()),
        },
    }
}

/// Edit body: base image inline, edit and mask mode in `editConfig`
pub(crate) fn edit_body(
    request: &ImageEditRequest,
) -> PredictRequest<EditInstance, EditParameters> {
    PredictRequest {
        instances: vec![EditInstance {
            prompt: request.prompt.clone(),
            image: EncodedImage {
                bytes_base64_encoded: BASE64_STANDARD.encode(&request.base_image.bytes),
            },
        }],
        parameters: EditParameters {
            sample_count: request.sample_count.max(1),
            edit_config: EditConfig {
                edit_mode: request.edit_mode.as_str().to_string(),
                mask_mode: MaskConfig {
                    mask_type: request.mask_mode.as_str().to_string(),
                },
            },
        },
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

/// Decode every prediction carrying image bytes; none at all is an error
pub(crate) fn extract_predictions(response: PredictResponse) -> Result<Vec<ImageData>> {
    let mut images = Vec::new();
    for prediction in response.predictions {
        // Filtered predictions come back without bytes
        let Some(encoded) = prediction.bytes_base64_encoded else {
            continue;
        };
        let bytes = BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ClientError::decode(SERVICE, format!("image base64: {e}")))?;
        let mime_type = prediction.mime_type.unwrap_or_else(|| MIME_PNG.to_string());
        images.push(ImageData::new(bytes, mime_type));
    }

    if images.is_empty() {
        return Err(ClientError::empty(SERVICE));
    }
    Ok(images)
}
