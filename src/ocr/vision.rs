//! Google Cloud Vision 텍스트 인식 클라이언트 (1차 엔진)
//!
//! `images:annotate` 엔드포인트에 base64로 인코딩한 이미지를 보내고
//! `responses[0].textAnnotations[0].description`을 추출 텍스트로 사용합니다.
//! 경로가 없으면 빈 문자열로 취급하여 오케스트레이터가 다음 엔진으로 넘어가게 합니다.

use super::{EngineError, OcrEngine};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct VisionEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl VisionEngine {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl OcrEngine for VisionEngine {
    fn name(&self) -> &'static str {
        "cloud-vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, EngineError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            EngineError::NotConfigured("GOOGLE_VISION_API_KEY is not set".to_string())
        })?;

        let request = AnnotateRequest::text_detection(image);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status { status, body });
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Malformed(e.to_string()))?;

        parsed.into_text()
    }
}

// ── 요청/응답 본문 ──

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

impl AnnotateRequest {
    fn text_detection(image: &[u8]) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: BASE64.encode(image),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                    max_results: 1,
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    /// 이미지 단위 에러 (HTTP 200이어도 들어올 수 있음)
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

impl AnnotateResponse {
    fn into_text(self) -> Result<String, EngineError> {
        let Some(first) = self.responses.into_iter().next() else {
            return Ok(String::new());
        };
        if let Some(error) = first.error {
            return Err(EngineError::Rejected(error.message));
        }
        Ok(first
            .text_annotations
            .into_iter()
            .next()
            .and_then(|a| a.description)
            .unwrap_or_default())
    }
}
