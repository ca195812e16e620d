//! # OCR 오케스트레이터
//!
//! 이미지 바이트에서 텍스트를 추출합니다. 엔진을 순서대로 시도하는 폴백 체인입니다.
//!
//! ```text
//! [1차] Cloud Vision (정확, 외부 의존) ──실패/빈 결과──→ [2차] tesseract (로컬, 느림) ──실패──→ Extraction 에러
//! ```
//!
//! - 엔진 하나의 시도 결과는 `Attempt`(텍스트 / 빈 결과 / 실패) 중 하나입니다.
//! - 1차 엔진의 네트워크 오류는 호출자에게 올라가지 않고 다음 엔진으로 넘어갑니다.
//! - 성공한 텍스트는 앞뒤 공백을 제거해서 반환합니다. 저장은 호출자 몫입니다.
//! - PDF는 추출하지 않고 고정 안내 문구(`PDF_PLACEHOLDER`)를 반환합니다.
//!
//! 하위 모듈:
//! - `vision`: Google Cloud Vision `images:annotate` 클라이언트
//! - `tesseract`: 로컬 tesseract 실행 파일 래퍼
//! - `lazy`: 한 번만 초기화되는 워커 핸들

pub mod lazy;
pub mod tesseract;
pub mod vision;

use crate::config::Config;
use crate::error::AppError;
use crate::models::MediaKind;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use tesseract::TesseractEngine;
pub use vision::VisionEngine;

/// PDF 업로드에 대한 명시적 안내 문구. 에러 대체값이 아닙니다.
pub const PDF_PLACEHOLDER: &str =
    "PDF text extraction is not fully implemented yet. Please use image files for OCR.";

/// 개별 엔진의 실패 원인. 오케스트레이터 밖으로는 나가지 않고 로그와 진단 메시지에만 쓰입니다.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine rejected the image: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("engine is not configured: {0}")]
    NotConfigured(String),

    #[error("recognizer failed: {0}")]
    Recognizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 텍스트 인식 엔진
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// 로그에 남길 엔진 이름
    fn name(&self) -> &'static str;

    /// 원본 이미지 바이트에서 텍스트를 인식합니다. 공백 정리는 호출자가 합니다.
    async fn recognize(&self, image: &[u8]) -> Result<String, EngineError>;

    /// 엔진이 들고 있는 장기 자원을 해제합니다. 다음 호출 때 다시 만들어집니다.
    async fn shutdown(&self) {}
}

/// 엔진 한 번의 시도 결과
#[derive(Debug)]
pub enum Attempt {
    /// 공백을 제거한, 비어 있지 않은 텍스트
    Text(String),
    Empty,
    Failed(EngineError),
}

impl From<Result<String, EngineError>> for Attempt {
    fn from(result: Result<String, EngineError>) -> Self {
        match result {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Attempt::Empty
                } else {
                    Attempt::Text(trimmed.to_string())
                }
            }
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// 엔진 목록을 순서대로 시도하는 오케스트레이터
///
/// 호출마다 상태가 없습니다. 엔진 내부의 지연 초기화 자원만 호출 간에 공유됩니다.
pub struct OcrOrchestrator {
    engines: Vec<Arc<dyn OcrEngine>>,
}

impl OcrOrchestrator {
    pub fn new(engines: Vec<Arc<dyn OcrEngine>>) -> Self {
        Self { engines }
    }

    /// 설정으로 기본 체인(Cloud Vision → tesseract)을 구성합니다.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let vision = VisionEngine::new(
            config.vision_endpoint.clone(),
            config.vision_api_key.clone(),
            Duration::from_secs(config.vision_timeout_secs),
        )?;
        if config.vision_api_key.is_none() {
            tracing::warn!("GOOGLE_VISION_API_KEY is not set; every extraction will use tesseract");
        }
        let tesseract = TesseractEngine::new(&config.tesseract_cmd, &config.ocr_languages);

        let engines: Vec<Arc<dyn OcrEngine>> = vec![Arc::new(vision), Arc::new(tesseract)];
        Ok(Self::new(engines))
    }

    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// 추출 시도(extraction attempt) 한 번을 실행합니다.
    ///
    /// # 반환값
    /// - `Ok(text)`: 앞뒤 공백을 제거한 텍스트 (PDF면 안내 문구)
    /// - `Err(AppError::Extraction)`: 모든 엔진이 실패했거나 텍스트를 찾지 못함
    pub async fn extract(&self, payload: &[u8], kind: MediaKind) -> Result<String, AppError> {
        if !kind.is_image() {
            tracing::info!("PDF upload; returning placeholder text");
            return Ok(PDF_PLACEHOLDER.to_string());
        }

        let mut failures = Vec::with_capacity(self.engines.len());
        for engine in &self.engines {
            match Attempt::from(engine.recognize(payload).await) {
                Attempt::Text(text) => {
                    tracing::info!(
                        engine = engine.name(),
                        chars = text.chars().count(),
                        "text extracted"
                    );
                    return Ok(text);
                }
                Attempt::Empty => {
                    tracing::warn!(engine = engine.name(), "engine returned no text");
                    failures.push(format!("{}: no text", engine.name()));
                }
                Attempt::Failed(e) => {
                    tracing::warn!(engine = engine.name(), error = %e, "engine failed");
                    failures.push(format!("{}: {}", engine.name(), e));
                }
            }
        }

        Err(AppError::Extraction(if failures.is_empty() {
            "no OCR engines configured".to_string()
        } else {
            failures.join("; ")
        }))
    }

    /// 모든 엔진의 장기 자원을 해제합니다. (서버 종료 시 호출)
    pub async fn shutdown(&self) {
        for engine in &self.engines {
            engine.shutdown().await;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 미리 정해둔 결과를 차례로 돌려주는 가짜 엔진
    pub struct ScriptedEngine {
        name: &'static str,
        script: Mutex<VecDeque<Result<String, EngineError>>>,
        pub calls: AtomicUsize,
        pub shutdowns: AtomicUsize,
    }

    impl ScriptedEngine {
        pub fn new(name: &'static str, script: Vec<Result<String, EngineError>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                shutdowns: AtomicUsize::new(0),
            })
        }

        pub fn text(name: &'static str, text: &str) -> Arc<Self> {
            Self::new(name, vec![Ok(text.to_string())])
        }

        pub fn failing(name: &'static str) -> Arc<Self> {
            Self::new(name, vec![Err(EngineError::Recognizer("boom".to_string()))])
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn recognize(&self, _image: &[u8]) -> Result<String, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(EngineError::Recognizer("script exhausted".to_string())))
        }

        async fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn orchestrator(
        primary: Arc<ScriptedEngine>,
        secondary: Arc<ScriptedEngine>,
    ) -> OcrOrchestrator {
        let engines: Vec<Arc<dyn OcrEngine>> = vec![primary, secondary];
        OcrOrchestrator::new(engines)
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let primary = ScriptedEngine::text("vision", "  Invoice 42\n");
        let secondary = ScriptedEngine::text("tesseract", "unused");
        let ocr = orchestrator(primary.clone(), secondary.clone());

        let text = ocr.extract(b"img", MediaKind::Png).await.unwrap();
        assert_eq!(text, "Invoice 42");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_falls_back() {
        let primary = ScriptedEngine::new(
            "vision",
            vec![Err(EngineError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })],
        );
        let secondary = ScriptedEngine::text("tesseract", "Hello World\n\n");
        let ocr = orchestrator(primary.clone(), secondary.clone());

        assert_eq!(ocr.extract(b"img", MediaKind::Png).await.unwrap(), "Hello World");
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn whitespace_result_falls_back_exactly_once() {
        let primary = ScriptedEngine::text("vision", " \n\t ");
        let secondary = ScriptedEngine::text("tesseract", "fallback");
        let ocr = orchestrator(primary.clone(), secondary.clone());

        assert_eq!(ocr.extract(b"img", MediaKind::Jpeg).await.unwrap(), "fallback");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn both_failing_is_extraction_error() {
        let primary = ScriptedEngine::failing("vision");
        let secondary = ScriptedEngine::failing("tesseract");
        let ocr = orchestrator(primary, secondary);

        let err = ocr.extract(b"img", MediaKind::Png).await.unwrap_err();
        match err {
            AppError::Extraction(detail) => {
                assert!(detail.contains("vision"));
                assert!(detail.contains("tesseract"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_from_every_engine_is_extraction_error() {
        let ocr = orchestrator(
            ScriptedEngine::text("vision", ""),
            ScriptedEngine::text("tesseract", "   "),
        );
        assert!(matches!(
            ocr.extract(b"img", MediaKind::Png).await,
            Err(AppError::Extraction(_))
        ));
    }

    #[tokio::test]
    async fn pdf_returns_placeholder_without_engines() {
        let primary = ScriptedEngine::text("vision", "x");
        let secondary = ScriptedEngine::text("tesseract", "y");
        let ocr = orchestrator(primary.clone(), secondary.clone());

        assert_eq!(
            ocr.extract(b"%PDF-1.7", MediaKind::Pdf).await.unwrap(),
            PDF_PLACEHOLDER
        );
        assert_eq!(primary.calls(), 0);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn shutdown_reaches_every_engine() {
        let primary = ScriptedEngine::text("vision", "x");
        let secondary = ScriptedEngine::text("tesseract", "y");
        let ocr = orchestrator(primary.clone(), secondary.clone());

        ocr.shutdown().await;
        assert_eq!(primary.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(ocr.engine_names(), vec!["vision", "tesseract"]);
    }

    #[test]
    fn attempt_classifies_results() {
        assert!(matches!(Attempt::from(Ok("  a ".to_string())), Attempt::Text(t) if t == "a"));
        assert!(matches!(Attempt::from(Ok("\n".to_string())), Attempt::Empty));
        assert!(matches!(
            Attempt::from(Err(EngineError::NotConfigured("key".to_string()))),
            Attempt::Failed(_)
        ));
    }
}
