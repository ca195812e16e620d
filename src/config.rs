//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (없으면 메모리 저장소 사용)
//! - `UPLOADS_PATH`: 업로드 원본 파일 스테이징 디렉토리
//! - `HOST` / `PORT`: 서버 바인딩 주소
//! - `GOOGLE_VISION_API_KEY`: 1차 OCR 엔진(Cloud Vision) API 키
//! - `VISION_ENDPOINT`: Cloud Vision 요청 URL
//! - `VISION_TIMEOUT_SECS`: Cloud Vision 요청 타임아웃(초)
//! - `TESSERACT_CMD`: 2차 OCR 엔진(tesseract) 실행 파일
//! - `OCR_LANGUAGES`: tesseract 인식 언어 (`eng+nep`처럼 `+`로 연결)

use std::env;

/// Cloud Vision 기본 엔드포인트
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/scanpad.db?mode=rwc")
    /// None이면 프로세스 메모리에만 저장합니다.
    pub database_url: Option<String>,
    /// 업로드 파일이 저장되는 디렉토리 경로
    pub uploads_path: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// Cloud Vision API 키. 비어 있으면 1차 엔진은 항상 실패로 처리되어 2차 엔진으로 넘어갑니다.
    pub vision_api_key: Option<String>,
    pub vision_endpoint: String,
    pub vision_timeout_secs: u64,
    pub tesseract_cmd: String,
    pub ocr_languages: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// 필수 항목이 없으므로 항상 성공하지만, 시그니처는 다른 설정 로더와 맞춰
    /// `Result`를 반환합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            // .ok(): 환경변수가 없으면 None
            // .filter(): 빈 문자열도 "설정 안 됨"으로 취급합니다.
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            uploads_path: env::var("UPLOADS_PATH")
                .unwrap_or_else(|_| "data/uploads".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            vision_api_key: env::var("GOOGLE_VISION_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            vision_endpoint: env::var("VISION_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_VISION_ENDPOINT.to_string()),
            vision_timeout_secs: env::var("VISION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or_else(|_| "tesseract".to_string()),
            ocr_languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng+nep".to_string()),
        })
    }
}
