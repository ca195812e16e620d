//! # 문서(Document) 라우트 핸들러
//!
//! 문서 조회, 편집 저장, OCR 결과 저장, 서버 측 추출을 처리하는 HTTP 핸들러입니다.
//!
//! ## 엔드포인트
//! - `GET  /api/documents`              → 문서 목록 조회
//! - `GET  /api/documents/{id}`         → 단일 문서 조회
//! - `PUT  /api/documents/{id}`         → 편집본(`editedText`) 저장
//! - `POST /api/documents/{id}/ocr`     → 클라이언트가 받은 추출 결과를 원문(`originalText`)으로 저장
//! - `POST /api/documents/{id}/extract` → 스테이징된 원본으로 서버에서 추출 후 저장
//! - `GET  /api/documents/{id}/content` → 화면에 보여줄 내용과 단어/글자 수
//! - `GET  /api/documents/{id}/status`  → 처리 상태
//!
//! 반환 타입이 `Result<T, AppError>`이면, Axum이 자동으로:
//! - `Ok(T)` → T를 HTTP 응답으로 변환
//! - `Err(AppError)` → `{ "error": { "code", "message" } }` 응답으로 변환

use crate::{
    db::DocumentStore,
    error::AppError,
    models::*,
    ocr::OcrOrchestrator,
    services::{self, ProcessingBoard},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 필드가 모두 Arc이거나 Arc를 감싼 타입이라 clone해도 같은 자원을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// 문서 저장소 (SQLite 또는 메모리)
    pub store: Arc<dyn DocumentStore>,
    /// 1차/2차 OCR 엔진 체인
    pub ocr: Arc<OcrOrchestrator>,
    /// 문서별 처리 상태
    pub board: ProcessingBoard,
    /// 업로드 원본을 스테이징하는 디렉토리
    pub uploads_path: PathBuf,
}

/// `GET /documents` — 전체 문서 목록을 생성 순서대로 조회합니다.
///
/// 소유자 구분은 아직 없으므로 항상 `OwnerScope::All`로 조회합니다.
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let documents = state.store.list(OwnerScope::All).await?;
    Ok(Json(json!({ "documents": documents })))
}

/// `GET /documents/{id}` — 단일 문서를 조회합니다.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let document = state.store.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(json!({ "document": document })))
}

/// `PUT /documents/{id}` — 편집본을 저장합니다.
///
/// `editedText`가 없거나 빈 문자열이면 400입니다. 빈 편집본이 원문을 가리지 않도록 합니다.
/// 같은 문서의 추출이 진행 중이면 409를 반환합니다.
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<Value>, AppError> {
    let edited_text = req
        .edited_text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("editedText is required".to_string()))?;

    state.board.ensure_not_extracting(id)?;

    let document = state
        .store
        .update_text(id, &edited_text)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::debug!(document_id = id, chars = edited_text.chars().count(), "edited text saved");
    Ok(Json(json!({ "document": document })))
}

/// `POST /documents/{id}/ocr` — 클라이언트가 받은 추출 결과를 원문으로 저장합니다.
///
/// 원문은 한 번만 기록됩니다. 두 번째 저장은 409이고 편집본은 건드리지 않습니다.
pub async fn save_ocr_text(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SaveOcrTextRequest>,
) -> Result<Json<Value>, AppError> {
    let text = req
        .extracted_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("extractedText is required".to_string()))?;

    state.board.ensure_not_extracting(id)?;

    let document = state
        .store
        .attach_original_text(id, &text)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(document_id = id, "original text saved");
    Ok(Json(json!({ "document": document })))
}

/// `POST /documents/{id}/extract` — 업로드 때 받은 `filePath`로 서버에서 추출합니다.
pub async fn extract_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Value>, AppError> {
    let file_path = req
        .file_path
        .ok_or_else(|| AppError::BadRequest("filePath is required".to_string()))?;

    // 문서가 없으면 파일을 읽기 전에 404
    let document = state.store.get(id).await?.ok_or(AppError::NotFound)?;

    let (path, kind) = services::resolve_staged_path(&state.uploads_path, &document, &file_path)?;
    let payload = services::read_staged(&path).await?;

    let document = services::extract_and_persist(&state, id, payload, kind).await?;
    Ok(Json(json!({ "document": document })))
}

/// `GET /documents/{id}/content` — 편집본, 없으면 원문, 둘 다 없으면 빈 문자열
pub async fn get_document_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentContent>, AppError> {
    let document = state.store.get(id).await?.ok_or(AppError::NotFound)?;
    let content = document.displayed_content();

    Ok(Json(DocumentContent {
        word_count: services::count_words(content),
        char_count: services::count_chars(content),
        content: content.to_string(),
    }))
}

/// `GET /documents/{id}/status`
pub async fn get_document_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    state.store.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(json!({
        "documentId": id,
        "state": state.board.state(id),
    })))
}
