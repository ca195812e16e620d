//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 `/api` 라우터를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `documents`: 문서 조회/편집/원문 저장/서버 측 추출, `AppState`
//! - `upload`: 파일 업로드와 한 번에 처리하는 스캔
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod documents;
pub mod health;
pub mod upload;

pub use documents::*;
pub use health::*;
pub use upload::*;

use crate::services::MAX_UPLOAD_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// `/api` 아래의 모든 라우트를 구성합니다.
///
/// 본문 크기 제한은 업로드 상한보다 조금 크게 둡니다. 상한을 조금 넘는 파일은
/// 접수 단계의 검증 에러(400)로, 훨씬 큰 본문은 multipart 읽기 단계에서 거부됩니다.
pub fn api_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/upload", post(upload_file))
        .route("/scan", post(scan_file))
        .route("/documents", get(list_documents))
        // axum 0.8부터 경로 파라미터는 `{id}` 문법을 씁니다.
        .route("/documents/{id}", get(get_document).put(update_document))
        .route("/documents/{id}/ocr", post(save_ocr_text))
        .route("/documents/{id}/extract", post(extract_document))
        .route("/documents/{id}/content", get(get_document_content))
        .route("/documents/{id}/status", get(get_document_status))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::AppState;
    use crate::db::MemoryDocumentStore;
    use crate::ocr::tests::{orchestrator, ScriptedEngine};
    use crate::services::ProcessingBoard;
    use std::path::Path;
    use std::sync::Arc;

    /// 메모리 저장소와 가짜 엔진 두 개로 구성한 상태
    pub fn test_state(
        primary: Arc<ScriptedEngine>,
        secondary: Arc<ScriptedEngine>,
        uploads: &Path,
    ) -> AppState {
        AppState {
            store: Arc::new(MemoryDocumentStore::new()),
            ocr: Arc::new(orchestrator(primary, secondary)),
            board: ProcessingBoard::new(),
            uploads_path: uploads.to_path_buf(),
        }
    }
}
