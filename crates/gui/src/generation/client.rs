//! HTTP client for the generation backend

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use shared::{GenerateRequest, GenerateResponse, GenerationResult, ImageGenerateResponse};

use super::{GenerationError, GenerationQuality};

/// Connection setup timeout; inference itself may take minutes
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Image file ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            mime: mime_for(&file_name),
            file_name,
            bytes,
        }
    }

    /// Read an image from disk
    pub async fn read(path: &Path) -> Result<Self, GenerationError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }

    fn into_part(self) -> Result<Part, GenerationError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.mime)?)
    }
}

/// MIME type guessed from the file extension
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Client for `POST /generate` and `POST /generate-image`
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GenerationClient {
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        let mut base_url = Url::parse(base_url.trim())?;
        // endpoints are joined relative to the base path
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a backend-returned model path against the backend origin.
    /// Absolute URLs pass through unchanged.
    pub fn resolve(&self, model_url: &str) -> Result<String, GenerationError> {
        Ok(self.base_url.join(model_url)?.to_string())
    }

    /// Text-to-3D request
    pub async fn generate_text(
        &self,
        prompt: &str,
        quality: GenerationQuality,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let body = GenerateRequest {
            prompt: prompt.to_string(),
            steps: Some(quality.steps),
            guidance: Some(quality.guidance),
        };
        let url = self.base_url.join("generate")?;
        tracing::info!("POST {url} ({} steps)", quality.steps);

        let response = self.http.post(url).json(&body).send().await?;
        let response: GenerateResponse = decode(response).await?;
        let outcome = response.result;

        if !outcome.is_success() {
            let message = outcome
                .message
                .unwrap_or_else(|| format!("generation {}", outcome.status));
            return Ok(GenerationResult::failure(message));
        }

        let Some(model_url) = outcome.model_url else {
            return Err(GenerationError::Decode("success without model_url".into()));
        };
        let reference = self.resolve(&model_url)?;
        tracing::info!("model ready at {reference}");
        Ok(GenerationResult::success(Some(reference)))
    }

    /// Image-to-3D request. `front` is required, `back` optional.
    pub async fn generate_image(
        &self,
        front: Option<ImageUpload>,
        back: Option<ImageUpload>,
    ) -> Result<GenerationResult, GenerationError> {
        let front = front.ok_or(GenerationError::MissingFrontImage)?;

        let mut form = Form::new().part("front_image", front.into_part()?);
        if let Some(back) = back {
            form = form.part("back_image", back.into_part()?);
        }
        let url = self.base_url.join("generate-image")?;
        tracing::info!("POST {url}");

        let response = self.http.post(url).multipart(form).send().await?;
        let response: ImageGenerateResponse = decode(response).await?;

        if response.status != "success" {
            let message = response
                .message
                .unwrap_or_else(|| format!("generation {}", response.status));
            return Ok(GenerationResult::failure(message));
        }

        let reference = response
            .model_url
            .as_deref()
            .map(|u| self.resolve(u))
            .transpose()?;
        let mut result = GenerationResult::success(reference);
        result.message = response.message;
        Ok(result)
    }
}

/// Check the HTTP status, then parse the JSON body
async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, GenerationError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        // error bodies look like {"detail": "..."}
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body);
        return Err(GenerationError::Status {
            code: status.as_u16(),
            detail,
        });
    }

    serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = GenerationClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
    }

    #[test]
    fn resolves_model_path_against_origin() {
        let client = GenerationClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.resolve("/static/abc.ply").unwrap(),
            "http://localhost:8000/static/abc.ply"
        );
        assert_eq!(
            client.resolve("https://example.com/model.glb").unwrap(),
            "https://example.com/model.glb"
        );
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(
            GenerationClient::new("not a url"),
            Err(GenerationError::Url(_))
        ));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for("front.PNG"), "image/png");
        assert_eq!(mime_for("back.jpeg"), "image/jpeg");
        assert_eq!(mime_for("scan"), "application/octet-stream");
    }

    #[tokio::test]
    async fn empty_prompt_fails_before_any_request() {
        // nothing listens on this port; validation must short-circuit
        let client = GenerationClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .generate_text("   ", GenerationQuality::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyPrompt));

        let err = client.generate_image(None, None).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingFrontImage));
    }
}
