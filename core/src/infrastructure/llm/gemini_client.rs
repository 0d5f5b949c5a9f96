use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{
    common::entities::app_errors::CoreError,
    image_nutrition::{
        ports::VisionModelClient,
        value_objects::{ImageHandle, SamplingConfig},
    },
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiVisionClient {
    api_key: String,
    model_name: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

#[derive(Debug, Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

impl GenerationConfig {
    fn text(sampling: SamplingConfig) -> Self {
        Self {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
            response_mime_type: None,
            response_schema: None,
        }
    }

    fn json(sampling: SamplingConfig, response_schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(response_schema),
            ..Self::text(sampling)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    uri: String,
}

impl GeminiVisionClient {
    pub fn new(api_key: String, model_name: String) -> Self {
        Self::with_base_url(api_key, model_name, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model_name: String, base_url: String) -> Self {
        Self {
            api_key,
            model_name,
            base_url,
            client: Client::new(),
        }
    }

    async fn call_gemini_api(&self, request: GeminiRequest) -> Result<String, CoreError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model_name, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini API request failed: {}", e);
                CoreError::ExternalServiceError(format!("LLM API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, error_text);
            return Err(CoreError::ExternalServiceError(format!(
                "LLM API returned error: {} - {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            CoreError::ExternalServiceError(format!("Failed to parse LLM response: {}", e))
        })?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| CoreError::ExternalServiceError("No response from LLM".to_string()))
    }

    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<ImageHandle, CoreError> {
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CoreError::Io(format!("Failed to read upload: {e}")))?;

        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let metadata = serde_json::json!({ "file": { "display_name": display_name.clone() } });

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| CoreError::ExternalServiceError(format!("LLM API error: {e}")))?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(display_name)
                    .mime_str(mime_type)
                    .map_err(|e| CoreError::ExternalServiceError(format!("LLM API error: {e}")))?,
            );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini file upload failed: {}", e);
                CoreError::ExternalServiceError(format!("LLM file upload error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini file upload error: {} - {}", status, error_text);
            return Err(CoreError::ExternalServiceError(format!(
                "LLM file upload returned error: {} - {}",
                status, error_text
            )));
        }

        let uploaded: FileUploadResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse file upload response: {}", e);
            CoreError::ExternalServiceError(format!("Failed to parse LLM response: {}", e))
        })?;

        Ok(ImageHandle {
            uri: uploaded.file.uri,
            mime_type: mime_type.to_string(),
        })
    }
}

impl VisionModelClient for GeminiVisionClient {
    async fn upload_image(
        &self,
        path: std::path::PathBuf,
        mime_type: String,
    ) -> Result<ImageHandle, CoreError> {
        self.upload_file(&path, &mime_type).await
    }

    async fn generate_with_image(
        &self,
        prompt: String,
        image: ImageHandle,
        sampling: SamplingConfig,
    ) -> Result<String, CoreError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::FileData {
                        file_data: FileData {
                            mime_type: image.mime_type,
                            file_uri: image.uri,
                        },
                    },
                    Part::Text { text: prompt },
                ],
            }],
            generation_config: Some(GenerationConfig::text(sampling)),
        };

        self.call_gemini_api(request).await
    }

    async fn generate_json_with_text(
        &self,
        prompt: String,
        sampling: SamplingConfig,
        response_schema: serde_json::Value,
    ) -> Result<String, CoreError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: Some(GenerationConfig::json(sampling, response_schema)),
        };

        self.call_gemini_api(request).await
    }
}
