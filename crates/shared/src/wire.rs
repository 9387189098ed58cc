//! Контракт HTTP-бэкенда генерации

use serde::{Deserialize, Serialize};

/// Тело `POST /generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f64>,
}

/// Ответ `POST /generate`: `{ "result": { "status": ..., "model_url": ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub result: GenerateOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOutcome {
    pub status: String,
    /// Путь относительно адреса бэкенда (или абсолютный URL)
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GenerateOutcome {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Ответ `POST /generate-image`. Клиент читает только часть полей.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerateResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub front_image: Option<String>,
    #[serde(default)]
    pub back_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Success,
    Failure,
}

/// Итог запроса к бэкенду, в виде удобном для UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: GenerationStatus,
    pub model_reference: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GenerationResult {
    pub fn success(model_reference: Option<String>) -> Self {
        Self {
            status: GenerationStatus::Success,
            model_reference,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: GenerationStatus::Failure,
            model_reference: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_quality() {
        let req = GenerateRequest {
            prompt: "vase".into(),
            steps: None,
            guidance: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"prompt":"vase"}"#);
    }

    #[test]
    fn response_without_model_url_parses() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"result":{"status":"mocked","prompt":"x"}}"#).unwrap();
        assert!(!resp.result.is_success());
        assert_eq!(resp.result.model_url, None);
    }

    #[test]
    fn image_response_parses_mock_backend_shape() {
        let resp: ImageGenerateResponse = serde_json::from_str(
            r#"{"status":"success","front_image":"f.png","back_image":null,"message":"Images received."}"#,
        )
        .unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(resp.front_image.as_deref(), Some("f.png"));
        assert_eq!(resp.model_url, None);
    }
}
