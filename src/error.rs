//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): HTTP 경계까지 올라오는 모든 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 사용자에게 보여줄 메시지와 서버 로그에 남길 진단 정보는 분리합니다.
//! 내부 에러(Database, IO, Internal)는 로그에만 상세 내용을 기록합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::models::InvalidTransition;
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 허용되지 않은 파일 형식이나 크기 초과 (HTTP 400)
    /// 상태 변경 전에 거부되며, 사용자가 직접 고칠 수 있는 에러입니다.
    #[error("{0}")]
    Validation(String),

    /// 요청한 문서를 찾을 수 없음 (HTTP 404)
    #[error("Document not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400) — 필수 필드 누락 등
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 같은 문서에 대한 작업이 이미 진행 중이거나, 한 번만 쓸 수 있는 값을 다시 쓰려는 경우 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 업로드 전송 중 네트워크/스트림 오류 (HTTP 400). 재시도하면 해결될 수 있습니다.
    #[error("Transport error: {0}")]
    Transport(String),

    /// 1차/2차 OCR 엔진이 모두 실패 (HTTP 422)
    /// 필드는 로그용 진단 정보이며 응답 본문에는 포함하지 않습니다.
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수의 에러에 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 마이그레이션 실행 오류 (HTTP 500)
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// 파일 입출력 오류 (HTTP 500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 처리 상태 기계의 잘못된 전이 (HTTP 500)
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

impl AppError {
    /// 응답 본문에 들어갈 (상태 코드, 에러 코드, 사용자 메시지)
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Transport(msg) => {
                tracing::warn!("Transport error: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "transport_error",
                    "The upload could not be completed. Please try again.".to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "extraction_failed",
                    "We could not read any text from this file. Please try again or use a different file."
                        .to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Migrate(e) => {
                tracing::error!("Migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "An IO error occurred".to_string(),
                )
            }
            AppError::Transition(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 결과: `{ "error": { "code": "not_found", "message": "Document not found" } }`
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_message_is_user_facing() {
        let err = AppError::Extraction("tesseract exited with status 1".to_string());
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "extraction_failed");
        assert!(!message.contains("tesseract"));
        assert!(message.contains("try again"));
    }

    #[test]
    fn validation_keeps_its_message() {
        let err = AppError::Validation("File is too large".to_string());
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "validation_error");
        assert_eq!(message, "File is too large");
    }
}
